//! Platform seam between the viewer and a window system.

use atlas_canvas::Canvas;
use atlas_render::SceneGraph;

use crate::error::ViewerError;
use crate::viewport::Viewport;

/// Everything the viewer needs from the environment it runs in.
pub trait Host {
    type Surface: SceneSurface;
    type Presenter: CanvasPresenter;

    /// Current drawable area, or `None` when there is nowhere to draw.
    fn container_size(&self) -> Option<Viewport>;

    /// Whether the page (window) is currently shown at all.
    fn is_page_visible(&self) -> bool;

    /// Ask for one frame callback on the host's native per-frame primitive.
    fn request_frame(&mut self);

    /// Make the accelerated backend ready. May fail on machines where the
    /// probe succeeded but presentation does not.
    fn load_rendering_library(&mut self) -> Result<(), String>;

    /// Upload `scene` and return a surface that can draw it.
    fn create_scene_surface(
        &mut self,
        scene: &SceneGraph,
        viewport: Viewport,
    ) -> Result<Self::Surface, ViewerError>;

    /// Open a 2D presentation target, `None` if the host has none.
    fn create_fallback_canvas(&mut self, viewport: Viewport) -> Option<Self::Presenter>;
}

/// GPU-backed drawing target owned by the accelerated renderer.
pub trait SceneSurface {
    fn render(&mut self, scene: &SceneGraph) -> Result<(), ViewerError>;

    /// Resize to the viewport's exact physical size.
    fn resize(&mut self, viewport: Viewport);

    /// Current size in device pixels.
    fn size(&self) -> (u32, u32);

    /// Free every GPU resource. Must tolerate repeated calls.
    fn release(&mut self);
}

/// Shows a finished software canvas.
pub trait CanvasPresenter {
    fn present(&mut self, canvas: &Canvas);

    fn resize(&mut self, viewport: Viewport);

    fn release(&mut self);
}
