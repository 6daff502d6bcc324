//! The viewed object: a perturbed capsule built from a cylinder and two caps.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use rand::Rng;

use crate::mesh_data::MeshData;
use crate::orientation::Orientation;
use crate::perturb::{compute_vertex_normals, perturb};
use crate::primitives::{cylinder, uv_sphere};

/// Shape parameters for the capsule body.
#[derive(Clone, Debug, PartialEq)]
pub struct CapsuleParams {
    pub radius: f32,
    /// Length of the cylindrical section; the caps sit at `±body_length / 2`.
    pub body_length: f32,
    pub radial_segments: u32,
    pub cap_width_segments: u32,
    pub cap_height_segments: u32,
    /// Full width of the per-axis noise interval, centred on zero.
    pub noise_factor: f32,
    /// Base rotation about X applied to the assembled object.
    pub base_rotation_x: f32,
}

impl Default for CapsuleParams {
    fn default() -> Self {
        Self {
            radius: 0.4,
            body_length: 1.8,
            radial_segments: 32,
            cap_width_segments: 16,
            cap_height_segments: 16,
            noise_factor: 0.15,
            base_rotation_x: FRAC_PI_2,
        }
    }
}

impl CapsuleParams {
    /// Largest per-axis displacement any vertex can receive.
    pub fn noise_bound(&self) -> f32 {
        self.noise_factor * 0.5
    }
}

/// Geometry plus mutable orientation of the single object on screen.
#[derive(Clone, Debug)]
pub struct ViewedObject {
    /// Perturbed geometry in object space. Never re-perturbed after build.
    pub mesh: MeshData,
    pub orientation: Orientation,
}

/// Builds [`ViewedObject`]s. Every call yields a fresh perturbation.
#[derive(Clone, Debug, Default)]
pub struct ProceduralMeshBuilder {
    params: CapsuleParams,
}

impl ProceduralMeshBuilder {
    pub fn new(params: CapsuleParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CapsuleParams {
        &self.params
    }

    /// Cylinder and both caps in place, before any noise.
    pub fn unperturbed(&self) -> MeshData {
        let p = &self.params;
        let cap_offset = p.body_length * 0.5;

        let mut mesh = cylinder(p.radius, p.body_length, p.radial_segments);
        for sign in [1.0, -1.0] {
            let mut cap = uv_sphere(p.radius, p.cap_width_segments, p.cap_height_segments);
            cap.translate(Vec3::new(0.0, cap_offset * sign, 0.0));
            mesh.append(&cap);
        }
        mesh
    }

    /// Build, perturb and re-shade a new object.
    ///
    /// The base rotation is carried in the returned orientation so that
    /// animation and drags rotate the assembled object as a whole.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> ViewedObject {
        let mut mesh = self.unperturbed();
        perturb(&mut mesh, rng, self.params.noise_factor);
        compute_vertex_normals(&mut mesh);

        log::debug!(
            "Built viewed object: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        ViewedObject {
            mesh,
            orientation: Orientation::new(self.params.base_rotation_x, 0.0),
        }
    }
}
