//! Software 2D drawing for the fallback view.
//!
//! [`Canvas`] is a small immediate-mode rasterizer over an RGBA image with a
//! save/restore transform stack, gradient paints, soft shadows and a built-in
//! bitmap font. [`FallbackRenderer`] draws the animated stand-in for the 3D
//! object with it.

mod canvas;
mod color;
mod fallback;
mod font;
mod shape;

pub use canvas::{Canvas, Shadow, TextAlign};
pub use color::{Color, LinearGradient, Paint};
pub use fallback::{
    FALLBACK_ROTATION_STEP, FallbackRenderer, FallbackStyle, PRIMARY_CAPTION, SECONDARY_CAPTION,
};
