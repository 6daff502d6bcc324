//! Two-angle orientation of the viewed object.

use glam::{Mat4, Quat};

/// Rotation about X then Y, applied as `Rx(x) * Ry(y)`.
///
/// Autonomous animation and pointer drags both add to these angles, so the
/// two sources compose additively regardless of order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    /// Angle about the X axis in radians.
    pub x: f32,
    /// Angle about the Y axis in radians.
    pub y: f32,
}

impl Orientation {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Add `dx` to the X angle and `dy` to the Y angle.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_rotation_x(self.x) * Quat::from_rotation_y(self.y)
    }

    /// Model matrix for the object at the origin.
    pub fn model_matrix(self) -> Mat4 {
        Mat4::from_quat(self.to_quat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_rotate_is_additive() {
        let mut o = Orientation::new(1.0, 2.0);
        o.rotate(0.3, 0.5);
        o.rotate(0.001, 0.002);
        assert!((o.x - 1.301).abs() < 1e-6);
        assert!((o.y - 2.502).abs() < 1e-6);
    }

    #[test]
    fn test_identity_matrix_at_zero() {
        let m = Orientation::default().model_matrix();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_quarter_turn_about_x_maps_y_to_z() {
        let o = Orientation::new(std::f32::consts::FRAC_PI_2, 0.0);
        let v = o.to_quat() * Vec3::Y;
        assert!((v - Vec3::Z).length() < 1e-6, "got {v:?}");
    }
}
