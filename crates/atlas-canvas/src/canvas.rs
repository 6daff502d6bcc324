//! Software 2D canvas with a transform stack, gradients, and soft shadows.

use glam::{Affine2, Vec2};
use image::{Rgba, RgbaImage};

use crate::color::{Color, Paint};
use crate::font::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::shape::{Ellipse, EllipseStroke, Rect, Shape};

/// Blurred shadow drawn underneath every filled shape while set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Color,
    /// Blur radius in pixels. The Gaussian sigma is half of this.
    pub blur: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Affine2,
    shadow: Option<Shadow>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            shadow: None,
        }
    }
}

/// RGBA raster with immediate-mode drawing.
pub struct Canvas {
    image: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Reallocate the raster. Resets the drawing state, like a canvas
    /// element whose size attributes change.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width() && height == self.height() {
            return;
        }
        log::trace!("Canvas resized to {width}x{height}");
        self.image = RgbaImage::new(width, height);
        self.state = DrawState::default();
        self.stack.clear();
    }

    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the last saved state. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    /// Rotate subsequent drawing by `angle` radians (clockwise on screen).
    pub fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(angle);
    }

    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state.shadow = shadow;
    }

    /// Overwrite every pixel, ignoring transform and shadow.
    pub fn clear(&mut self, color: Color) {
        let px = to_rgba(color);
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: &Paint) {
        let rect = Rect {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        };
        self.fill_shape(&rect, paint);
    }

    pub fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, paint: &Paint) {
        self.fill_shape(&Ellipse::new(center, rx, ry), paint);
    }

    pub fn stroke_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, width: f32, color: Color) {
        let stroke = EllipseStroke {
            ellipse: Ellipse::new(center, rx, ry),
            width,
        };
        self.fill_shape(&stroke, &Paint::Solid(color));
    }

    /// Draw `text` with the built-in bitmap font. `px` is the cap height and
    /// `baseline` the y coordinate of the glyph bottoms.
    pub fn fill_text(&mut self, text: &str, x: f32, baseline: f32, px: f32, color: Color, align: TextAlign) {
        if px <= 0.0 {
            return;
        }
        let scale = px / GLYPH_HEIGHT as f32;
        let width = font::text_width(text, px);
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width * 0.5,
            TextAlign::Right => x - width,
        };
        let top = baseline - px;
        let paint = Paint::Solid(color);

        for (i, c) in text.chars().enumerate() {
            let origin_x = left + (i as u32 * GLYPH_ADVANCE) as f32 * scale;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if font::is_lit(c, col, row) {
                        self.fill_rect(
                            origin_x + col as f32 * scale,
                            top + row as f32 * scale,
                            scale,
                            scale,
                            &paint,
                        );
                    }
                }
            }
        }
    }

    /// Copy the raster into a `0x00RRGGBB` buffer of at least
    /// `width * height` entries.
    pub fn write_0rgb(&self, out: &mut [u32]) {
        for (dst, p) in out.iter_mut().zip(self.image.pixels()) {
            let [r, g, b, _] = p.0;
            *dst = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        }
    }

    pub fn fill_shape(&mut self, shape: &dyn Shape, paint: &Paint) {
        let transform = self.state.transform;
        let det = transform.matrix2.determinant();
        if det.abs() <= f32::EPSILON || self.image.width() == 0 || self.image.height() == 0 {
            return;
        }
        let inverse = transform.inverse();
        // Local distances are converted to pixels by the mean scale.
        let scale = det.abs().sqrt();

        if let Some(shadow) = self.state.shadow.filter(|s| s.color.a > 0.0) {
            let sigma = (shadow.blur * 0.5).max(0.0);
            let margin = 3.0 * sigma + 1.0;
            self.for_each_pixel(shape, margin, |canvas, x, y, device| {
                let d = shape.signed_distance(inverse.transform_point2(device)) * scale;
                let alpha = shadow.color.a * shadow_coverage(d, sigma);
                canvas.blend(x, y, shadow.color, alpha);
            });
        }

        self.for_each_pixel(shape, 1.0, |canvas, x, y, device| {
            let local = inverse.transform_point2(device);
            let d = shape.signed_distance(local) * scale;
            let coverage = (0.5 - d).clamp(0.0, 1.0);
            if coverage > 0.0 {
                let color = paint.color_at(local);
                canvas.blend(x, y, color, color.a * coverage);
            }
        });
    }

    /// Visit every pixel whose center may lie within `margin` pixels of the
    /// shape's transformed bounds.
    fn for_each_pixel(&mut self, shape: &dyn Shape, margin: f32, mut visit: impl FnMut(&mut Self, u32, u32, Vec2)) {
        let (min, max) = shape.bounds();
        let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        let mut lo = Vec2::splat(f32::INFINITY);
        let mut hi = Vec2::splat(f32::NEG_INFINITY);
        for c in corners {
            let p = self.state.transform.transform_point2(c);
            lo = lo.min(p);
            hi = hi.max(p);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return;
        }
        let x0 = (lo.x - margin).floor().max(0.0) as u32;
        let y0 = (lo.y - margin).floor().max(0.0) as u32;
        let x1 = ((hi.x + margin).ceil().max(0.0) as u32).min(self.image.width());
        let y1 = ((hi.y + margin).ceil().max(0.0) as u32).min(self.image.height());

        for y in y0..y1 {
            for x in x0..x1 {
                let device = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                visit(self, x, y, device);
            }
        }
    }

    /// Source-over composite of `color` at `alpha` onto pixel `(x, y)`.
    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let dst_a = dst.0[3] as f32 / 255.0;
        let out_a = a + dst_a * (1.0 - a);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for (channel, s) in dst.0.iter_mut().take(3).zip(src) {
            let value = (s as f32 * a + *channel as f32 * dst_a * (1.0 - a)) / out_a;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_a * 255.0).round() as u8;
    }
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, (color.a.clamp(0.0, 1.0) * 255.0).round() as u8])
}

/// Fraction of a Gaussian blur of the shape reaching a point `d` pixels
/// outside its edge.
fn shadow_coverage(d: f32, sigma: f32) -> f32 {
    if sigma <= f32::EPSILON {
        return (0.5 - d).clamp(0.0, 1.0);
    }
    0.5 * (1.0 - erf(d / (sigma * std::f32::consts::SQRT_2)))
}

// Abramowitz and Stegun 7.1.26, max error 1.5e-7.
fn erf(x: f32) -> f32 {
    let sign = x.signum();
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_6
            + t * (-0.284_496_74 + t * (1.421_413_7 + t * (-1.453_152 + t * 1.061_405_4))));
    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(canvas: &Canvas, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = canvas.image().get_pixel(x, y).0;
        [r, g, b]
    }

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear(Color::from_hex(0x18181b));
        assert!(canvas.image().pixels().all(|p| p.0 == [0x18, 0x18, 0x1b, 255]));
    }

    #[test]
    fn test_fill_rect_covers_pixel() {
        let mut canvas = Canvas::new(8, 8);
        canvas.clear(Color::BLACK);
        canvas.fill_rect(2.0, 3.0, 1.0, 1.0, &Paint::Solid(Color::WHITE));
        assert_eq!(rgb(&canvas, 2, 3), [255, 255, 255]);
        assert_eq!(rgb(&canvas, 3, 3), [0, 0, 0]);
        assert_eq!(rgb(&canvas, 2, 4), [0, 0, 0]);
    }

    #[test]
    fn test_translate_and_restore() {
        let mut canvas = Canvas::new(8, 8);
        canvas.clear(Color::BLACK);
        canvas.save();
        canvas.translate(4.0, 4.0);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, &Paint::Solid(Color::WHITE));
        canvas.restore();
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, &Paint::Solid(Color::WHITE));
        assert_eq!(rgb(&canvas, 4, 4), [255, 255, 255]);
        assert_eq!(rgb(&canvas, 0, 0), [255, 255, 255]);
        assert_eq!(rgb(&canvas, 5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let mut canvas = Canvas::new(2, 2);
        canvas.restore();
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, &Paint::Solid(Color::WHITE));
        assert_eq!(rgb(&canvas, 0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_rotated_ellipse_swaps_axes() {
        let mut canvas = Canvas::new(100, 100);
        canvas.clear(Color::BLACK);
        canvas.translate(50.0, 50.0);
        canvas.rotate(std::f32::consts::FRAC_PI_2);
        canvas.fill_ellipse(Vec2::ZERO, 5.0, 40.0, &Paint::Solid(Color::WHITE));
        assert_eq!(rgb(&canvas, 80, 50), [255, 255, 255], "long axis is horizontal");
        assert_eq!(rgb(&canvas, 50, 80), [0, 0, 0]);
    }

    #[test]
    fn test_stroke_leaves_interior() {
        let mut canvas = Canvas::new(100, 100);
        canvas.clear(Color::BLACK);
        canvas.stroke_ellipse(Vec2::new(50.0, 50.0), 20.0, 20.0, 4.0, Color::WHITE);
        assert_eq!(rgb(&canvas, 50, 50), [0, 0, 0]);
        assert_eq!(rgb(&canvas, 69, 50), [255, 255, 255]);
    }

    #[test]
    fn test_shadow_spills_outside_shape() {
        let mut canvas = Canvas::new(60, 60);
        canvas.clear(Color::BLACK);
        canvas.set_shadow(Some(Shadow {
            color: Color::rgba(59, 130, 246, 0.5),
            blur: 20.0,
        }));
        canvas.fill_ellipse(Vec2::new(30.0, 30.0), 10.0, 10.0, &Paint::Solid(Color::WHITE));
        let [r, g, b] = rgb(&canvas, 43, 30);
        assert!(b > 0 && b > r && g > r, "blue glow outside the edge, got {r},{g},{b}");
        assert_eq!(rgb(&canvas, 30, 30), [255, 255, 255], "fill covers the shadow");
    }

    #[test]
    fn test_fill_text_centered() {
        let mut canvas = Canvas::new(40, 20);
        canvas.clear(Color::BLACK);
        canvas.fill_text("I", 20.0, 14.0, 7.0, Color::WHITE, TextAlign::Center);
        // 'I' is centered in a 6 unit advance, its stem sits at column 2.
        assert_eq!(rgb(&canvas, 19, 10), [255, 255, 255]);
        assert_eq!(rgb(&canvas, 10, 10), [0, 0, 0]);
    }

    #[test]
    fn test_write_0rgb() {
        let mut canvas = Canvas::new(2, 1);
        canvas.clear(Color::from_hex(0x3b82f6));
        let mut out = vec![0u32; 2];
        canvas.write_0rgb(&mut out);
        assert_eq!(out, vec![0x3b82f6, 0x3b82f6]);
    }

    #[test]
    fn test_zero_size_canvas_draws_nothing() {
        let mut canvas = Canvas::new(0, 0);
        canvas.fill_ellipse(Vec2::ZERO, 10.0, 10.0, &Paint::Solid(Color::WHITE));
        canvas.fill_text("A", 0.0, 7.0, 7.0, Color::WHITE, TextAlign::Left);
        assert_eq!(canvas.width(), 0);
    }

    #[test]
    fn test_resize_resets_state() {
        let mut canvas = Canvas::new(4, 4);
        canvas.translate(100.0, 100.0);
        canvas.resize(8, 8);
        canvas.clear(Color::BLACK);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, &Paint::Solid(Color::WHITE));
        assert_eq!((canvas.width(), canvas.height()), (8, 8));
        assert_eq!(rgb(&canvas, 0, 0), [255, 255, 255]);
    }

    #[test]
    fn test_erf_reference_values() {
        assert!(erf(0.0).abs() < 1e-6);
        assert!((erf(1.0) - 0.842_700_8).abs() < 1e-5);
        assert!((erf(-1.0) + 0.842_700_8).abs() < 1e-5);
    }
}
