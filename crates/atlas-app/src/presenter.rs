//! CPU presentation of the fallback canvas through softbuffer.

use std::num::NonZeroU32;
use std::sync::Arc;

use atlas_canvas::Canvas;
use atlas_viewer::{CanvasPresenter, Viewport};
use softbuffer::{Context, SoftBufferError, Surface};
use tracing::{debug, warn};
use winit::window::Window;

/// A display connection and the surface drawn through it. Both go away
/// together on [`detach`](Self::detach), surface first.
struct Attachment<C, S> {
    surface: Option<S>,
    context: Option<C>,
}

impl<C, S> Attachment<C, S> {
    fn new(context: C, surface: S) -> Self {
        Self {
            surface: Some(surface),
            context: Some(context),
        }
    }

    fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    fn detach(&mut self) {
        self.surface = None;
        self.context = None;
    }

    fn is_attached(&self) -> bool {
        self.surface.is_some() && self.context.is_some()
    }
}

type WindowAttachment = Attachment<Context<Arc<Window>>, Surface<Arc<Window>, Arc<Window>>>;

pub struct SoftPresenter {
    attachment: WindowAttachment,
    size: (u32, u32),
}

impl SoftPresenter {
    pub fn new(window: Arc<Window>, viewport: Viewport) -> Result<Self, SoftBufferError> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window)?;
        let mut presenter = Self {
            attachment: Attachment::new(context, surface),
            size: (0, 0),
        };
        presenter.resize(viewport);
        Ok(presenter)
    }

    /// Whether the surface and its display connection are still held.
    pub fn is_attached(&self) -> bool {
        self.attachment.is_attached()
    }

    fn ensure_size(&mut self, width: u32, height: u32) -> Result<bool, SoftBufferError> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Ok(false);
        };
        let Some(surface) = self.attachment.surface_mut() else {
            return Ok(false);
        };
        if self.size != (width, height) {
            surface.resize(w, h)?;
            self.size = (width, height);
        }
        Ok(true)
    }

    fn blit(&mut self, canvas: &Canvas) -> Result<(), SoftBufferError> {
        if !self.ensure_size(canvas.width(), canvas.height())? {
            return Ok(());
        }
        let Some(surface) = self.attachment.surface_mut() else {
            return Ok(());
        };
        let mut buffer = surface.buffer_mut()?;
        canvas.write_0rgb(&mut buffer);
        buffer.present()
    }
}

impl CanvasPresenter for SoftPresenter {
    fn present(&mut self, canvas: &Canvas) {
        if let Err(e) = self.blit(canvas) {
            warn!("Failed to present fallback frame: {e}");
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        if let Err(e) = self.ensure_size(width, height) {
            warn!("Failed to resize software surface: {e}");
        }
    }

    fn release(&mut self) {
        self.attachment.detach();
        self.size = (0, 0);
        debug!("Software surface released");
    }
}
