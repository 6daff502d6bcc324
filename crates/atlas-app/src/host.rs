//! [`Host`] implementation backed by a winit window.

use std::sync::Arc;

use atlas_config::Config;
use atlas_render::{
    GpuOptions, RenderContext, SceneGraph, SceneRenderer, init_render_context_blocking,
};
use atlas_viewer::{Host, SceneSurface, ViewerError, Viewport};
use tracing::{debug, info, warn};
use winit::window::Window;

use crate::presenter::SoftPresenter;

pub struct WindowHost {
    window: Arc<Window>,
    gpu_options: GpuOptions,
    clear_color: wgpu::Color,
    max_pixel_ratio: f64,
    visible: bool,
    /// Context created by `load_rendering_library`, handed to the scene
    /// surface on assembly.
    context: Option<RenderContext>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>, config: &Config) -> Self {
        let [r, g, b] = config.render.clear_color;
        Self {
            window,
            gpu_options: gpu_options(config),
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            max_pixel_ratio: config.render.max_pixel_ratio,
            visible: true,
            context: None,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Current window area as a viewport, regardless of whether it is empty.
    pub fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::from_physical(
            size.width,
            size.height,
            self.window.scale_factor(),
            self.max_pixel_ratio,
        )
    }

    fn drop_context(&mut self) {
        if let Some(ctx) = self.context.take() {
            ctx.destroy();
        }
    }
}

pub fn gpu_options(config: &Config) -> GpuOptions {
    GpuOptions {
        vsync: config.window.vsync,
        high_performance: config.render.high_performance,
    }
}

impl Host for WindowHost {
    type Surface = GpuSurface;
    type Presenter = SoftPresenter;

    fn container_size(&self) -> Option<Viewport> {
        let viewport = self.viewport();
        (!viewport.is_empty()).then_some(viewport)
    }

    fn is_page_visible(&self) -> bool {
        self.visible
    }

    fn request_frame(&mut self) {
        self.window.request_redraw();
    }

    fn load_rendering_library(&mut self) -> Result<(), String> {
        if self.context.is_some() {
            return Ok(());
        }
        let (width, height) = self.viewport().physical_size();
        let ctx = init_render_context_blocking(self.window.clone(), width, height, self.gpu_options)
            .map_err(|e| e.to_string())?;
        self.context = Some(ctx);
        Ok(())
    }

    fn create_scene_surface(
        &mut self,
        scene: &SceneGraph,
        _viewport: Viewport,
    ) -> Result<GpuSurface, ViewerError> {
        let ctx = self
            .context
            .take()
            .ok_or(ViewerError::ResourceMissing("render context"))?;
        match SceneRenderer::new(&ctx, scene, self.clear_color) {
            Ok(renderer) => Ok(GpuSurface {
                ctx: Some(ctx),
                renderer,
            }),
            Err(e) => {
                ctx.destroy();
                Err(ViewerError::AssemblyFailure(e.to_string()))
            }
        }
    }

    fn create_fallback_canvas(&mut self, viewport: Viewport) -> Option<SoftPresenter> {
        // A window carries one presentation surface; give up the GPU one first.
        self.drop_context();
        match SoftPresenter::new(self.window.clone(), viewport) {
            Ok(presenter) => {
                info!("Software presenter ready");
                Some(presenter)
            }
            Err(e) => {
                warn!("Software presenter unavailable: {e}");
                None
            }
        }
    }
}

/// wgpu context plus the uploaded scene.
pub struct GpuSurface {
    ctx: Option<RenderContext>,
    renderer: SceneRenderer,
}

impl SceneSurface for GpuSurface {
    fn render(&mut self, scene: &SceneGraph) -> Result<(), ViewerError> {
        let ctx = self
            .ctx
            .as_ref()
            .ok_or(ViewerError::ResourceMissing("render context"))?;
        self.renderer
            .render(ctx, scene)
            .map_err(|e| ViewerError::FrameFailure(e.to_string()))
    }

    fn resize(&mut self, viewport: Viewport) {
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        let (width, height) = viewport.physical_size();
        ctx.resize(width, height);
        self.renderer.resize(ctx);
        debug!("GPU surface resized to {width}x{height}");
    }

    fn size(&self) -> (u32, u32) {
        self.ctx.as_ref().map_or((0, 0), RenderContext::size)
    }

    fn release(&mut self) {
        self.renderer.release();
        if let Some(ctx) = self.ctx.take() {
            ctx.destroy();
        }
    }
}
