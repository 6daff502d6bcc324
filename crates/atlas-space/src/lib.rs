//! Background stars for both render paths.
//!
//! The accelerated path uses a [`StarField`] point cloud that rotates slowly
//! about Y. The 2D path uses [`drift_positions`], a closed-form layout that
//! only depends on the current rotation accumulator.

mod drift;
mod starfield;

pub use drift::{FALLBACK_STAR_COUNT, drift_position, drift_positions};
pub use starfield::{STAR_COUNT, STAR_HALF_EXTENT, STAR_ROTATION_STEP, StarField, StarVertex};
