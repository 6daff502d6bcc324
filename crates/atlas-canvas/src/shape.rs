//! Signed-distance shapes in local (untransformed) coordinates.

use glam::Vec2;

/// Something the canvas can rasterize.
///
/// Distances are negative inside, positive outside, and measured in local
/// units. `bounds` returns the local axis-aligned box `(min, max)`.
pub trait Shape {
    fn signed_distance(&self, p: Vec2) -> f32;
    fn bounds(&self) -> (Vec2, Vec2);
}

#[derive(Clone, Copy, Debug)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Shape for Rect {
    fn signed_distance(&self, p: Vec2) -> f32 {
        let center = (self.min + self.max) * 0.5;
        let half = (self.max - self.min) * 0.5;
        let q = (p - center).abs() - half;
        q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0)
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        (self.min, self.max)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Ellipse {
    pub center: Vec2,
    pub radii: Vec2,
}

impl Ellipse {
    pub fn new(center: Vec2, rx: f32, ry: f32) -> Self {
        Self {
            center,
            radii: Vec2::new(rx.abs(), ry.abs()),
        }
    }
}

impl Shape for Ellipse {
    // First-order approximation f / |grad f|, exact on the boundary.
    fn signed_distance(&self, p: Vec2) -> f32 {
        if self.radii.x <= 0.0 || self.radii.y <= 0.0 {
            return f32::INFINITY;
        }
        let d = p - self.center;
        let inv_sq = Vec2::ONE / (self.radii * self.radii);
        let f = (d * d * inv_sq).element_sum() - 1.0;
        let grad = 2.0 * d * inv_sq;
        let len = grad.length();
        if len <= f32::EPSILON {
            return -self.radii.min_element();
        }
        f / len
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        (self.center - self.radii, self.center + self.radii)
    }
}

/// Outline of an ellipse, `width` units wide and centered on its edge.
#[derive(Clone, Copy, Debug)]
pub struct EllipseStroke {
    pub ellipse: Ellipse,
    pub width: f32,
}

impl Shape for EllipseStroke {
    fn signed_distance(&self, p: Vec2) -> f32 {
        self.ellipse.signed_distance(p).abs() - self.width * 0.5
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        let (min, max) = self.ellipse.bounds();
        let pad = Vec2::splat(self.width * 0.5);
        (min - pad, max + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_distance_sign() {
        let r = Rect {
            min: Vec2::ZERO,
            max: Vec2::new(10.0, 4.0),
        };
        assert!(r.signed_distance(Vec2::new(5.0, 2.0)) < 0.0);
        assert!((r.signed_distance(Vec2::new(12.0, 2.0)) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ellipse_boundary_is_zero() {
        let e = Ellipse::new(Vec2::ZERO, 40.0, 120.0);
        assert!(e.signed_distance(Vec2::new(40.0, 0.0)).abs() < 1e-4);
        assert!(e.signed_distance(Vec2::new(0.0, -120.0)).abs() < 1e-4);
        assert!(e.signed_distance(Vec2::ZERO) < 0.0);
        assert!(e.signed_distance(Vec2::new(50.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_ellipse_distance_near_axis_is_euclidean() {
        let e = Ellipse::new(Vec2::ZERO, 40.0, 120.0);
        let d = e.signed_distance(Vec2::new(41.0, 0.0));
        assert!((d - 1.0).abs() < 0.05, "got {d}");
    }

    #[test]
    fn test_stroke_hollow_center() {
        let s = EllipseStroke {
            ellipse: Ellipse::new(Vec2::ZERO, 40.0, 120.0),
            width: 2.0,
        };
        assert!(s.signed_distance(Vec2::new(40.0, 0.0)) < 0.0);
        assert!(s.signed_distance(Vec2::ZERO) > 0.0);
        let (min, max) = s.bounds();
        assert_eq!(min, Vec2::new(-41.0, -121.0));
        assert_eq!(max, Vec2::new(41.0, 121.0));
    }
}
