//! CPU-side scene: camera, light rig, material, the viewed object and the stars.
//!
//! Everything here is plain data. [`crate::SceneRenderer`] turns it into GPU
//! uniforms each frame.

use atlas_mesh::ViewedObject;
use atlas_space::StarField;
use glam::Vec3;

use crate::camera::Camera;
use crate::pipeline::{GlobalsUniform, ObjectUniform, StarUniform};

/// Autonomous per-frame rotation of the object about X.
pub const OBJECT_ROTATION_STEP_X: f32 = 0.001;
/// Autonomous per-frame rotation of the object about Y.
pub const OBJECT_ROTATION_STEP_Y: f32 = 0.002;

/// Ambient fill plus a single point light.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub point_position: Vec3,
    pub point_color: Vec3,
    pub point_intensity: f32,
    /// Distance at which the point light's contribution reaches zero.
    pub point_range: f32,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.3,
            point_position: Vec3::splat(5.0),
            point_color: Vec3::ONE,
            point_intensity: 1.0,
            point_range: 100.0,
        }
    }
}

/// Metallic surface parameters for the viewed object.
#[derive(Clone, Debug, PartialEq)]
pub struct MetalMaterial {
    /// Base color in linear RGB.
    pub base_color: Vec3,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MetalMaterial {
    fn default() -> Self {
        Self {
            base_color: hex_to_linear(0xcccccc),
            metalness: 0.9,
            roughness: 0.2,
        }
    }
}

/// The complete accelerated scene. Owned by exactly one viewer.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    pub camera: Camera,
    pub lights: LightRig,
    pub material: MetalMaterial,
    pub object: ViewedObject,
    pub stars: StarField,
    /// Star color in linear RGB.
    pub star_color: Vec3,
}

impl SceneGraph {
    /// Compose a scene for a surface of `width` x `height` pixels.
    pub fn assemble(width: u32, height: u32, object: ViewedObject, stars: StarField) -> Self {
        Self {
            camera: Camera::for_viewport(width, height),
            lights: LightRig::default(),
            material: MetalMaterial::default(),
            object,
            stars,
            star_color: Vec3::ONE,
        }
    }

    /// Recompute the camera aspect for a new surface size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
    }

    /// Advance the autonomous animation by one frame.
    pub fn advance_frame(&mut self) {
        self.object
            .orientation
            .rotate(OBJECT_ROTATION_STEP_X, OBJECT_ROTATION_STEP_Y);
        self.stars.advance();
    }

    pub fn globals_uniform(&self) -> GlobalsUniform {
        let l = &self.lights;
        GlobalsUniform {
            view_proj: self.camera.view_projection_matrix().to_cols_array_2d(),
            camera_position: self.camera.position.extend(1.0).to_array(),
            ambient: (l.ambient_color * l.ambient_intensity).extend(0.0).to_array(),
            light_position_range: l.point_position.extend(l.point_range).to_array(),
            light_color_intensity: l.point_color.extend(l.point_intensity).to_array(),
        }
    }

    pub fn object_uniform(&self) -> ObjectUniform {
        let m = &self.material;
        ObjectUniform {
            model: self.object.orientation.model_matrix().to_cols_array_2d(),
            base_color_metalness: m.base_color.extend(m.metalness).to_array(),
            roughness_pad: [m.roughness, 0.0, 0.0, 0.0],
        }
    }

    pub fn star_uniform(&self) -> StarUniform {
        StarUniform {
            model: self.stars.model_matrix().to_cols_array_2d(),
            color: self.star_color.extend(1.0).to_array(),
        }
    }
}

/// Convert one sRGB channel in `[0, 1]` to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a `0xRRGGBB` sRGB color to linear RGB.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Linear falloff of the point light, 1.0 at the light and 0.0 at `range`.
///
/// A non-positive range means the light never fades. Mirrors
/// `range_falloff` in the object shader.
pub fn range_falloff(distance: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 1.0;
    }
    (1.0 - distance / range).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_mesh::ProceduralMeshBuilder;
    use rand::SeedableRng;

    fn test_scene(width: u32, height: u32) -> SceneGraph {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        let object = ProceduralMeshBuilder::default().build(&mut rng);
        SceneGraph::assemble(width, height, object, StarField::from_seed(8))
    }

    #[test]
    fn test_assemble_defaults() {
        let scene = test_scene(800, 600);
        assert!((scene.camera.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(scene.lights.point_position, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(scene.lights.ambient_intensity, 0.3);
        assert_eq!(scene.material.metalness, 0.9);
        assert_eq!(scene.material.roughness, 0.2);
        assert_eq!(scene.stars.len(), atlas_space::STAR_COUNT);
    }

    #[test]
    fn test_advance_frame_rotates_object_and_stars() {
        let mut scene = test_scene(100, 100);
        let before = scene.object.orientation;
        scene.advance_frame();
        let after = scene.object.orientation;
        assert!((after.x - before.x - 0.001).abs() < 1e-6);
        assert!((after.y - before.y - 0.002).abs() < 1e-6);
        assert!((scene.stars.rotation_y - 0.0001).abs() < 1e-9);
    }

    #[test]
    fn test_set_viewport_updates_aspect() {
        let mut scene = test_scene(800, 600);
        scene.set_viewport(400, 300);
        assert!((scene.camera.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
        scene.set_viewport(1000, 500);
        assert!((scene.camera.aspect_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniforms_carry_lights_and_material() {
        let scene = test_scene(640, 480);
        let globals = scene.globals_uniform();
        assert_eq!(globals.light_position_range, [5.0, 5.0, 5.0, 100.0]);
        assert_eq!(globals.ambient, [0.3, 0.3, 0.3, 0.0]);
        let object = scene.object_uniform();
        assert_eq!(object.base_color_metalness[3], 0.9);
        assert_eq!(object.roughness_pad[0], 0.2);
    }

    #[test]
    fn test_hex_to_linear() {
        assert_eq!(hex_to_linear(0x000000), Vec3::ZERO);
        assert!((hex_to_linear(0xffffff) - Vec3::ONE).length() < 1e-6);
        let grey = hex_to_linear(0xcccccc);
        assert!((grey.x - 0.6038).abs() < 1e-3, "0xcc should be ~0.604 linear, got {}", grey.x);
    }

    #[test]
    fn test_range_falloff() {
        assert_eq!(range_falloff(0.0, 100.0), 1.0);
        assert!((range_falloff(50.0, 100.0) - 0.5).abs() < 1e-6);
        assert_eq!(range_falloff(150.0, 100.0), 0.0);
        assert_eq!(range_falloff(1e6, 0.0), 1.0, "zero range never fades");
    }
}
