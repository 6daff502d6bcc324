//! Animated 2D stand-in for the 3D object.

use atlas_space::drift_positions;
use glam::Vec2;

use crate::canvas::{Canvas, Shadow, TextAlign};
use crate::color::{Color, LinearGradient, Paint};

pub const PRIMARY_CAPTION: &str = "Alternative visual representation of 3I/ATLAS";
pub const SECONDARY_CAPTION: &str = "(Accelerated rendering unavailable - 2D mode)";

/// Rotation added to the accumulator after each frame.
pub const FALLBACK_ROTATION_STEP: f32 = 0.01;

const BODY_RADII: Vec2 = Vec2::new(40.0, 120.0);
const DETAIL_RADII: Vec2 = Vec2::new(30.0, 15.0);
const ACCENT: Color = Color::from_hex(0x3b82f6);
const GLOW: Shadow = Shadow {
    color: Color::rgba(59, 130, 246, 0.5),
    blur: 20.0,
};
const DETAIL_FILL: Color = Color::rgba(100, 100, 100, 0.3);

/// Theme-dependent colors of the fallback view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackStyle {
    pub background: Color,
    pub caption: Color,
}

impl FallbackStyle {
    /// Dark themes get a white caption, light themes a black one.
    pub fn new(dark: bool, background: u32) -> Self {
        Self {
            background: Color::from_hex(background),
            caption: if dark { Color::WHITE } else { Color::BLACK },
        }
    }
}

impl Default for FallbackStyle {
    fn default() -> Self {
        Self::new(true, 0x18181b)
    }
}

pub struct FallbackRenderer {
    rotation: f32,
    style: FallbackStyle,
    body_paint: Paint,
}

impl FallbackRenderer {
    pub fn new(style: FallbackStyle) -> Self {
        let gradient = LinearGradient::new(Vec2::new(-80.0, -150.0), Vec2::new(80.0, 150.0))
            .add_stop(0.0, Color::from_hex(0xe0e0e0))
            .add_stop(0.5, Color::from_hex(0xffffff))
            .add_stop(1.0, Color::from_hex(0xb0b0b0));
        Self {
            rotation: 0.0,
            style,
            body_paint: Paint::Linear(gradient),
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn style(&self) -> FallbackStyle {
        self.style
    }

    /// Draw one frame and advance the rotation. An empty canvas is skipped
    /// without touching the accumulator.
    pub fn draw(&mut self, canvas: &mut Canvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        canvas.clear(self.style.background);

        let star = Paint::Solid(Color::WHITE);
        for p in drift_positions(self.rotation, w, h) {
            canvas.fill_rect(p.x, p.y, 1.0, 1.0, &star);
        }

        canvas.save();
        canvas.translate(w * 0.5, h * 0.5);
        canvas.rotate(self.rotation);
        canvas.set_shadow(Some(GLOW));

        canvas.fill_ellipse(Vec2::ZERO, BODY_RADII.x, BODY_RADII.y, &self.body_paint);
        canvas.stroke_ellipse(Vec2::ZERO, BODY_RADII.x, BODY_RADII.y, 2.0, ACCENT);

        let detail = Paint::Solid(DETAIL_FILL);
        for i in 0..5 {
            let offset = (i as f32 - 2.0) * 30.0;
            canvas.fill_ellipse(Vec2::new(offset * 0.3, offset), DETAIL_RADII.x, DETAIL_RADII.y, &detail);
        }
        canvas.restore();

        canvas.fill_text(PRIMARY_CAPTION, w * 0.5, h - 20.0, 14.0, self.style.caption, TextAlign::Center);
        canvas.fill_text(SECONDARY_CAPTION, w * 0.5, h - 5.0, 12.0, ACCENT, TextAlign::Center);

        self.rotation += FALLBACK_ROTATION_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(canvas: &Canvas, x: u32, y: u32) -> [u8; 3] {
        let [r, g, b, _] = canvas.image().get_pixel(x, y).0;
        [r, g, b]
    }

    #[test]
    fn test_draw_advances_rotation() {
        let mut renderer = FallbackRenderer::new(FallbackStyle::default());
        let mut canvas = Canvas::new(320, 320);
        renderer.draw(&mut canvas);
        renderer.draw(&mut canvas);
        assert!((renderer.rotation() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_empty_canvas_is_skipped() {
        let mut renderer = FallbackRenderer::new(FallbackStyle::default());
        let mut canvas = Canvas::new(0, 0);
        renderer.draw(&mut canvas);
        assert_eq!(renderer.rotation(), 0.0);
    }

    #[test]
    fn test_background_follows_style() {
        let mut renderer = FallbackRenderer::new(FallbackStyle::new(false, 0xf4f4f5));
        let mut canvas = Canvas::new(400, 400);
        renderer.draw(&mut canvas);
        let background = canvas
            .image()
            .pixels()
            .take(400)
            .filter(|p| p.0[..3] == [0xf4, 0xf4, 0xf5])
            .count();
        assert!(background > 350, "top row is mostly background, got {background}");
    }

    #[test]
    fn test_body_is_drawn_at_center() {
        let mut renderer = FallbackRenderer::new(FallbackStyle::default());
        let mut canvas = Canvas::new(400, 400);
        renderer.draw(&mut canvas);
        let [r, g, b] = rgb(&canvas, 200, 120);
        assert!(r > 150 && g > 150 && b > 150, "gradient body is light, got {r},{g},{b}");
    }

    #[test]
    fn test_caption_colors() {
        assert_eq!(FallbackStyle::new(true, 0).caption, Color::WHITE);
        assert_eq!(FallbackStyle::new(false, 0).caption, Color::BLACK);
    }
}
