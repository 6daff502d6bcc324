//! Closed primitive shapes aligned to the Y axis.
//!
//! Both generators emit duplicated seam vertices (the first and last column of
//! each ring share a position) so every ring can be addressed as a regular
//! grid. Normals are the analytic surface normals.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::mesh_data::{MeshData, MeshVertex};

/// Closed cylinder centred on the origin, spanning `-height/2..height/2` in Y.
///
/// Side wall is a single band of `radial_segments` quads; each end is a fan of
/// `radial_segments` triangles around its own centre vertices.
pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let segments = radial_segments.max(3);
    let ring = segments + 1;
    let half = height * 0.5;

    let mut mesh = MeshData::with_capacity(
        (ring * 2 + (segments + ring) * 2) as usize,
        (segments * 6 + segments * 6) as usize,
    );

    // ── Side wall ──
    for row in 0..2u32 {
        let y = if row == 0 { half } else { -half };
        for x in 0..ring {
            let theta = x as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.vertices.push(MeshVertex::new(
                Vec3::new(radius * sin, y, radius * cos),
                Vec3::new(sin, 0.0, cos),
            ));
        }
    }
    for x in 0..segments {
        let a = x;
        let b = ring + x;
        let c = ring + x + 1;
        let d = x + 1;
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    // ── End caps ──
    for top in [true, false] {
        let sign = if top { 1.0 } else { -1.0 };
        let y = half * sign;
        let normal = Vec3::new(0.0, sign, 0.0);

        let center_start = mesh.vertices.len() as u32;
        for _ in 0..segments {
            mesh.vertices
                .push(MeshVertex::new(Vec3::new(0.0, y, 0.0), normal));
        }
        let rim_start = mesh.vertices.len() as u32;
        for x in 0..ring {
            let theta = x as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.vertices.push(MeshVertex::new(
                Vec3::new(radius * sin, y, radius * cos),
                normal,
            ));
        }
        for x in 0..segments {
            let c = center_start + x;
            let i = rim_start + x;
            if top {
                mesh.indices.extend_from_slice(&[i, i + 1, c]);
            } else {
                mesh.indices.extend_from_slice(&[i + 1, i, c]);
            }
        }
    }

    mesh
}

/// Latitude/longitude sphere centred on the origin with poles on the Y axis.
///
/// The pole rows are fans: the degenerate quad halves touching a pole are
/// skipped, which leaves one unused seam vertex per pole.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let cols = ws + 1;

    let mut mesh = MeshData::with_capacity(((hs + 1) * cols) as usize, (ws * hs * 6) as usize);

    for iy in 0..=hs {
        let theta = iy as f32 / hs as f32 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for ix in 0..=ws {
            let phi = ix as f32 / ws as f32 * TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = Vec3::new(-cos_p * sin_t, cos_t, sin_p * sin_t);
            mesh.vertices.push(MeshVertex::new(normal * radius, normal));
        }
    }

    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * cols + ix + 1;
            let b = iy * cols + ix;
            let c = (iy + 1) * cols + ix;
            let d = (iy + 1) * cols + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    mesh
}
