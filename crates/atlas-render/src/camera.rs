//! Perspective camera for the viewer.

use glam::{Mat4, Vec3};

/// Vertical field of view used by the viewer, in degrees.
pub const DEFAULT_FOV_Y_DEGREES: f32 = 75.0;

/// Distance from the origin along +Z at which the camera sits.
pub const DEFAULT_DISTANCE: f32 = 3.0;

/// A perspective camera looking down -Z at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Viewer camera for a surface of the given size.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect_ratio(width as f32, height as f32);
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    /// Projection with reverse-Z: the near plane maps to 1.0 and the far plane to 0.0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio. A zero height leaves the previous ratio in place.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 && width > 0.0 {
            self.aspect_ratio = width / height;
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, DEFAULT_DISTANCE),
            fov_y: DEFAULT_FOV_Y_DEGREES.to_radians(),
            aspect_ratio: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_default_camera_parameters() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert!((camera.fov_y - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_aspect_from_viewport() {
        let camera = Camera::for_viewport(800, 600);
        assert!((camera.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_height_keeps_previous_aspect() {
        let mut camera = Camera::for_viewport(400, 300);
        camera.set_aspect_ratio(400.0, 0.0);
        assert!((camera.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::for_viewport(800, 600);
        let clip = camera.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6, "got {ndc:?}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "origin should lie inside the depth range");
    }

    #[test]
    fn test_reverse_z_near_is_one() {
        let camera = Camera::default();
        let near_point = Vec4::new(0.0, 0.0, camera.position.z - camera.near, 1.0);
        let clip = camera.view_projection_matrix() * near_point;
        assert!((clip.z / clip.w - 1.0).abs() < 1e-4, "near plane should map to 1.0");
    }
}
