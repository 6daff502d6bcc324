//! Desktop shell for the Atlas viewer.
//!
//! Opens a winit window, implements the viewer's host seam on top of wgpu and
//! softbuffer, and runs the event loop.

pub mod host;
pub mod presenter;
pub mod window;
