//! Drawable area of the host window.

/// Logical size plus the device pixel ratio used for the backing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
        }
    }

    /// Build from a physical window size and scale factor, clamping the
    /// surface pixel ratio to `max_pixel_ratio`.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let logical_w = (width as f64 / scale).round() as u32;
        let logical_h = (height as f64 / scale).round() as u32;
        Self::new(logical_w, logical_h, clamp_pixel_ratio(scale, max_pixel_ratio))
    }

    /// Backing surface size in device pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width as f64 * self.pixel_ratio).round() as u32,
            (self.height as f64 * self.pixel_ratio).round() as u32,
        )
    }

    /// Width over height, or 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// `min(scale, max)`. A non-positive `max` disables the clamp.
pub fn clamp_pixel_ratio(scale: f64, max: f64) -> f64 {
    if max > 0.0 { scale.min(max) } else { scale }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_size_scales() {
        let v = Viewport::new(800, 600, 2.0);
        assert_eq!(v.physical_size(), (1600, 1200));
        assert!((v.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_ratio_clamped() {
        let v = Viewport::from_physical(3000, 1500, 3.0, 2.0);
        assert_eq!((v.width, v.height), (1000, 500));
        assert_eq!(v.pixel_ratio, 2.0);
        assert_eq!(v.physical_size(), (2000, 1000));
    }

    #[test]
    fn test_invalid_ratio_defaults_to_one() {
        assert_eq!(Viewport::new(10, 10, 0.0).pixel_ratio, 1.0);
        assert_eq!(Viewport::new(10, 10, f64::NAN).pixel_ratio, 1.0);
    }

    #[test]
    fn test_empty_viewport() {
        let v = Viewport::new(0, 600, 1.0);
        assert!(v.is_empty());
        assert_eq!(v.aspect(), 1.0);
    }
}
