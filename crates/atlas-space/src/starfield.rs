//! Uniform point cloud around the viewed object.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of stars in the accelerated view.
pub const STAR_COUNT: usize = 5000;

/// Stars fill the cube `[-STAR_HALF_EXTENT, STAR_HALF_EXTENT]` on every axis.
pub const STAR_HALF_EXTENT: f32 = 100.0;

/// Per-frame rotation added about Y while the scene is animating.
pub const STAR_ROTATION_STEP: f32 = 0.0001;

/// Point vertex uploaded to the GPU.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct StarVertex {
    pub position: [f32; 3],
}

/// Static star positions plus the field's current rotation.
#[derive(Clone, Debug)]
pub struct StarField {
    points: Vec<StarVertex>,
    /// Rotation about Y in radians.
    pub rotation_y: f32,
}

impl StarField {
    /// Generate `count` points from `rng`, uniform in the star cube.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        let points = (0..count)
            .map(|_| StarVertex {
                position: [spread(rng), spread(rng), spread(rng)],
            })
            .collect();
        log::debug!("Generated star field with {count} points");
        Self {
            points,
            rotation_y: 0.0,
        }
    }

    /// Generate the default field deterministically from a seed.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::generate(&mut rng, STAR_COUNT)
    }

    pub fn points(&self) -> &[StarVertex] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    /// Advance the autonomous rotation by one frame.
    pub fn advance(&mut self) {
        self.rotation_y += STAR_ROTATION_STEP;
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    /// Axis-aligned bounds of the generated points.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = Vec3::from_array(self.points.first()?.position);
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            let p = Vec3::from_array(p.position);
            (lo.min(p), hi.max(p))
        }))
    }
}

/// Uniform sample in `[-STAR_HALF_EXTENT, STAR_HALF_EXTENT)`.
fn spread<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.random::<f32>() - 0.5) * STAR_HALF_EXTENT * 2.0
}
