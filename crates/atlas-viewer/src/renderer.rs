//! The two rendering variants behind one interface.

use atlas_canvas::{Canvas, FallbackRenderer, FallbackStyle};
use atlas_mesh::Orientation;
use atlas_render::SceneGraph;
use tracing::{debug, warn};

use crate::frame_loop::FrameLoop;
use crate::host::{CanvasPresenter, SceneSurface};
use crate::viewport::Viewport;

/// Common control surface of the accelerated and fallback renderers.
///
/// Each renderer owns its frame loop, so pausing or disposing one cancels
/// its own pending frame.
pub trait Renderer {
    fn frame_loop(&mut self) -> &mut FrameLoop;

    /// Advance the animation one step and draw.
    fn draw(&mut self);

    fn resize(&mut self, viewport: Viewport);

    /// Free everything the renderer holds.
    fn release(&mut self);

    /// Whether hidden frames skip [`draw`](Self::draw).
    fn gated_by_visibility(&self) -> bool {
        true
    }

    /// Returns `true` when a first frame must be requested from the host.
    fn start(&mut self) -> bool {
        self.frame_loop().start().is_some()
    }

    fn pause(&mut self) {
        self.frame_loop().pause();
    }

    fn dispose(&mut self) {
        self.frame_loop().stop();
        self.release();
    }
}

pub struct AcceleratedRenderer<S: SceneSurface> {
    scene: SceneGraph,
    surface: S,
    frames: FrameLoop,
    released: bool,
}

impl<S: SceneSurface> AcceleratedRenderer<S> {
    pub fn new(scene: SceneGraph, surface: S) -> Self {
        Self {
            scene,
            surface,
            frames: FrameLoop::new(),
            released: false,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn orientation_mut(&mut self) -> &mut Orientation {
        &mut self.scene.object.orientation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: SceneSurface> Renderer for AcceleratedRenderer<S> {
    fn frame_loop(&mut self) -> &mut FrameLoop {
        &mut self.frames
    }

    fn draw(&mut self) {
        if self.released {
            return;
        }
        self.scene.advance_frame();
        if let Err(e) = self.surface.render(&self.scene) {
            warn!("Skipping frame: {e}");
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.released {
            return;
        }
        let (width, height) = viewport.physical_size();
        self.scene.set_viewport(width, height);
        self.surface.resize(viewport);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.surface.release();
        self.released = true;
        debug!("Accelerated renderer released");
    }
}

pub struct FallbackView<P: CanvasPresenter> {
    renderer: FallbackRenderer,
    canvas: Canvas,
    presenter: Option<P>,
    frames: FrameLoop,
}

impl<P: CanvasPresenter> FallbackView<P> {
    /// `presenter` may be `None`; frames then return early without drawing.
    pub fn new(style: FallbackStyle, viewport: Viewport, presenter: Option<P>) -> Self {
        let (width, height) = viewport.physical_size();
        Self {
            renderer: FallbackRenderer::new(style),
            canvas: Canvas::new(width, height),
            presenter,
            frames: FrameLoop::new(),
        }
    }

    pub fn rotation(&self) -> f32 {
        self.renderer.rotation()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn presenter(&self) -> Option<&P> {
        self.presenter.as_ref()
    }
}

impl<P: CanvasPresenter> Renderer for FallbackView<P> {
    fn frame_loop(&mut self) -> &mut FrameLoop {
        &mut self.frames
    }

    fn draw(&mut self) {
        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };
        self.renderer.draw(&mut self.canvas);
        presenter.present(&self.canvas);
    }

    fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.physical_size();
        self.canvas.resize(width, height);
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.resize(viewport);
        }
    }

    fn release(&mut self) {
        if let Some(mut presenter) = self.presenter.take() {
            presenter.release();
        }
        self.canvas.resize(0, 0);
        debug!("Fallback renderer released");
    }

    // The 2D loop keeps animating regardless of page visibility.
    fn gated_by_visibility(&self) -> bool {
        false
    }
}

/// Exactly one live renderer.
pub enum ActiveRenderer<S: SceneSurface, P: CanvasPresenter> {
    Accelerated(AcceleratedRenderer<S>),
    Fallback(FallbackView<P>),
}

impl<S: SceneSurface, P: CanvasPresenter> ActiveRenderer<S, P> {
    pub fn is_accelerated(&self) -> bool {
        matches!(self, ActiveRenderer::Accelerated(_))
    }

    fn inner(&mut self) -> &mut dyn Renderer {
        match self {
            ActiveRenderer::Accelerated(r) => r,
            ActiveRenderer::Fallback(r) => r,
        }
    }
}

impl<S: SceneSurface, P: CanvasPresenter> Renderer for ActiveRenderer<S, P> {
    fn frame_loop(&mut self) -> &mut FrameLoop {
        self.inner().frame_loop()
    }

    fn draw(&mut self) {
        self.inner().draw();
    }

    fn resize(&mut self, viewport: Viewport) {
        self.inner().resize(viewport);
    }

    fn release(&mut self) {
        self.inner().release();
    }

    fn gated_by_visibility(&self) -> bool {
        match self {
            ActiveRenderer::Accelerated(r) => r.gated_by_visibility(),
            ActiveRenderer::Fallback(r) => r.gated_by_visibility(),
        }
    }
}
