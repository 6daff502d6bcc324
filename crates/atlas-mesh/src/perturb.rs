//! Random vertex displacement and normal recomputation.

use glam::Vec3;
use rand::Rng;

use crate::mesh_data::MeshData;

/// Displace every vertex independently by `(r - 0.5) * noise_factor` per axis.
///
/// With `r` uniform in `[0, 1)` each offset lies in
/// `[-noise_factor / 2, noise_factor / 2]`. Normals are left untouched; call
/// [`compute_vertex_normals`] afterwards.
pub fn perturb<R: Rng + ?Sized>(mesh: &mut MeshData, rng: &mut R, noise_factor: f32) {
    for v in &mut mesh.vertices {
        let offset = Vec3::new(
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
        ) * noise_factor;
        v.position = (v.position() + offset).to_array();
    }
}

/// Recompute smooth vertex normals from the current positions.
///
/// Each triangle adds its unnormalized face normal (so larger faces weigh
/// more) to its three vertices, then the sums are normalized. A vertex that
/// no triangle references, or whose sum cancels out, keeps its previous
/// normal.
pub fn compute_vertex_normals(mesh: &mut MeshData) {
    let mut sums = vec![Vec3::ZERO; mesh.vertices.len()];

    for tri in mesh.indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let a = mesh.vertices[ia].position();
        let b = mesh.vertices[ib].position();
        let c = mesh.vertices[ic].position();
        let face = (c - b).cross(a - b);
        sums[ia] += face;
        sums[ib] += face;
        sums[ic] += face;
    }

    let mut kept = 0usize;
    for (v, sum) in mesh.vertices.iter_mut().zip(sums) {
        match sum.try_normalize() {
            Some(n) => v.normal = n.to_array(),
            None => {
                kept += 1;
                v.normal = v.normal().normalize_or(Vec3::Y).to_array();
            }
        }
    }

    if kept > 0 {
        log::trace!("{kept} vertices kept their previous normal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{cylinder, uv_sphere};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_perturb_stays_within_bound() {
        let original = uv_sphere(0.4, 16, 16);
        for seed in 0..20 {
            let mut mesh = original.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            perturb(&mut mesh, &mut rng, 0.15);
            for (before, after) in original.vertices.iter().zip(&mesh.vertices) {
                let delta = (after.position() - before.position()).abs();
                assert!(
                    delta.max_element() <= 0.075 + 1e-6,
                    "seed {seed}: offset {delta:?} exceeds 0.075"
                );
            }
        }
    }

    #[test]
    fn test_perturb_moves_vertices() {
        let original = cylinder(0.4, 1.8, 32);
        let mut mesh = original.clone();
        perturb(&mut mesh, &mut ChaCha8Rng::seed_from_u64(1), 0.15);
        let moved = original
            .vertices
            .iter()
            .zip(&mesh.vertices)
            .filter(|(a, b)| a.position != b.position)
            .count();
        assert_eq!(moved, original.vertex_count(), "every vertex should move");
    }

    #[test]
    fn test_zero_noise_is_identity() {
        let original = cylinder(0.4, 1.8, 8);
        let mut mesh = original.clone();
        perturb(&mut mesh, &mut ChaCha8Rng::seed_from_u64(3), 0.0);
        assert_eq!(mesh, original);
    }

    #[test]
    fn test_recomputed_normals_unit_length() {
        let mut mesh = uv_sphere(0.4, 16, 16);
        perturb(&mut mesh, &mut ChaCha8Rng::seed_from_u64(9), 0.15);
        compute_vertex_normals(&mut mesh);
        for (i, v) in mesh.vertices.iter().enumerate() {
            let len = v.normal().length();
            assert!((len - 1.0).abs() < 1e-4, "vertex {i} normal length {len}");
        }
    }

    #[test]
    fn test_recomputed_normals_match_undisplaced_sphere() {
        let mut mesh = uv_sphere(1.0, 32, 32);
        compute_vertex_normals(&mut mesh);
        for v in &mesh.vertices {
            let radial = v.position().normalize();
            assert!(
                v.normal().dot(radial) > 0.95,
                "smooth normal should follow the radial direction"
            );
        }
    }
}
