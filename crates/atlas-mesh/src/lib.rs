//! Procedural geometry for the viewed object.
//!
//! Builds a capsule-like body out of a cylinder and two sphere caps, jitters
//! every vertex by a small random offset, then recomputes smooth normals so
//! lighting follows the displaced surface.

mod capsule;
mod mesh_data;
mod orientation;
mod perturb;
mod primitives;

pub use capsule::{CapsuleParams, ProceduralMeshBuilder, ViewedObject};
pub use mesh_data::{MeshData, MeshVertex};
pub use orientation::Orientation;
pub use perturb::{compute_vertex_normals, perturb};
pub use primitives::{cylinder, uv_sphere};
