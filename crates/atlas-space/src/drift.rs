//! Closed-form star drift for the 2D fallback view.

use glam::Vec2;

/// Number of stars drawn by the fallback view.
pub const FALLBACK_STAR_COUNT: usize = 100;

/// Position of star `index` on a `width` x `height` surface for accumulator `rotation`.
///
/// Stars trace Lissajous-like paths around the surface centre; the result is
/// wrapped into `[0, width) x [0, height)`.
pub fn drift_position(index: usize, rotation: f32, width: f32, height: f32) -> Vec2 {
    let phase = rotation * 0.1;
    let i = index as f32;
    let cx = width * 0.5;
    let cy = height * 0.5;
    let x = (i * 0.5 + phase).sin() * cx + cx;
    let y = (i * 0.3 + phase).cos() * cy + cy;
    Vec2::new(wrap(x, width), wrap(y, height))
}

/// All fallback star positions for one frame.
pub fn drift_positions(rotation: f32, width: f32, height: f32) -> impl Iterator<Item = Vec2> {
    (0..FALLBACK_STAR_COUNT).map(move |i| drift_position(i, rotation, width, height))
}

fn wrap(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_inside_surface() {
        for rotation in [0.0, 1.0, 12.5, 400.0] {
            for p in drift_positions(rotation, 640.0, 480.0) {
                assert!((0.0..640.0).contains(&p.x), "x = {} outside surface", p.x);
                assert!((0.0..480.0).contains(&p.y), "y = {} outside surface", p.y);
            }
        }
    }

    #[test]
    fn test_first_star_at_rest() {
        // sin(0) * w/2 + w/2 = w/2 ; cos(0) * h/2 + h/2 = h wraps to 0
        let p = drift_position(0, 0.0, 200.0, 100.0);
        assert!((p.x - 100.0).abs() < 1e-4);
        assert!(p.y.abs() < 1e-4);
    }

    #[test]
    fn test_stars_drift_with_rotation() {
        let a: Vec<_> = drift_positions(0.0, 300.0, 300.0).collect();
        let b: Vec<_> = drift_positions(5.0, 300.0, 300.0).collect();
        assert_eq!(a.len(), FALLBACK_STAR_COUNT);
        assert!(a.iter().zip(&b).any(|(p, q)| p != q));
    }

    #[test]
    fn test_zero_surface_collapses_to_origin() {
        let p = drift_position(3, 1.0, 0.0, 0.0);
        assert_eq!(p, Vec2::ZERO);
    }
}
