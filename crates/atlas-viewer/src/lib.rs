//! Lifecycle coordination for the adaptive object viewer.
//!
//! [`Viewer`] decides between the accelerated scene and the 2D fallback,
//! drives frames through a cancellable [`FrameLoop`], applies pointer drags,
//! forwards resizes, and releases every resource on [`Viewer::dispose`].
//! Everything platform-specific sits behind the [`Host`] trait.

mod error;
mod frame_loop;
mod host;
mod interaction;
mod probe;
mod renderer;
mod resize;
mod viewer;
mod viewport;

pub use error::ViewerError;
pub use frame_loop::{FrameLoop, FrameTicket, LoopState};
pub use host::{CanvasPresenter, Host, SceneSurface};
pub use interaction::{DRAG_SENSITIVITY, InteractionController};
pub use probe::{CapabilityProbe, GpuProbe};
pub use renderer::{AcceleratedRenderer, ActiveRenderer, FallbackView, Renderer};
pub use resize::ResizeDebouncer;
pub use viewer::{LifecycleState, Viewer, ViewerOptions};
pub use viewport::Viewport;
