//! GPU side of the scene: pipelines, buffers and bind groups for one
//! [`SceneGraph`], plus the per-frame draw.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::buffer::{BufferAllocator, MeshBuffer, PointBuffer};
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pipeline::{
    MetallicPipeline, OBJECT_SHADER_SOURCE, STAR_SHADER_SOURCE, StarPipeline,
    globals_bind_group_layout,
};
use crate::scene::SceneGraph;

/// Errors from building or drawing the accelerated scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Resource creation aborted inside the graphics backend.
    #[error("scene assembly failed: {0}")]
    Assembly(String),

    /// The frame could not be acquired or presented.
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Drawing was requested after [`SceneRenderer::release`].
    #[error("scene renderer has been released")]
    Released,
}

struct UniformBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    fn new<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::BindGroupLayout,
        value: &T,
    ) -> Self {
        let buffer = BufferAllocator::new(device).create_uniform(label, value);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write<T: bytemuck::Pod>(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

/// Everything the GPU needs to draw one scene.
pub struct SceneRenderer {
    metallic: MetallicPipeline,
    stars: StarPipeline,
    globals: UniformBinding,
    object: UniformBinding,
    star_uniform: UniformBinding,
    object_mesh: MeshBuffer,
    star_points: PointBuffer,
    depth: DepthBuffer,
    clear_color: wgpu::Color,
    released: bool,
}

impl SceneRenderer {
    /// Upload `scene` and build both pipelines.
    ///
    /// A panic inside the backend is caught and reported as
    /// [`SceneError::Assembly`] so the caller can fall back cleanly.
    pub fn new(
        ctx: &RenderContext,
        scene: &SceneGraph,
        clear_color: wgpu::Color,
    ) -> Result<Self, SceneError> {
        let (width, height) = ctx.size();
        catch_unwind(AssertUnwindSafe(|| {
            Self::build(
                &ctx.device,
                ctx.surface_format,
                width,
                height,
                scene,
                clear_color,
            )
        }))
        .map_err(|payload| SceneError::Assembly(panic_message(payload.as_ref())))
    }

    fn build(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &SceneGraph,
        clear_color: wgpu::Color,
    ) -> Self {
        let globals_layout = globals_bind_group_layout(device);

        let object_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("object-shader"),
            source: wgpu::ShaderSource::Wgsl(OBJECT_SHADER_SOURCE.into()),
        });
        let star_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star-shader"),
            source: wgpu::ShaderSource::Wgsl(STAR_SHADER_SOURCE.into()),
        });

        let metallic =
            MetallicPipeline::new(device, &object_shader, surface_format, &globals_layout);
        let stars = StarPipeline::new(device, &star_shader, surface_format, &globals_layout);

        let globals =
            UniformBinding::new(device, "globals", &globals_layout, &scene.globals_uniform());
        let object = UniformBinding::new(
            device,
            "object",
            &metallic.object_bind_group_layout,
            &scene.object_uniform(),
        );
        let star_uniform = UniformBinding::new(
            device,
            "stars",
            &stars.star_bind_group_layout,
            &scene.star_uniform(),
        );

        let allocator = BufferAllocator::new(device);
        let object_mesh = allocator.create_mesh("viewed-object", &scene.object.mesh);
        let star_points = allocator.create_points("star-field", scene.stars.points());

        log::info!(
            "Scene uploaded: {} object triangles, {} stars, {}x{}",
            scene.object.mesh.triangle_count(),
            scene.stars.len(),
            width,
            height
        );

        Self {
            metallic,
            stars,
            globals,
            object,
            star_uniform,
            object_mesh,
            star_points,
            depth: DepthBuffer::new(device, width, height),
            clear_color,
            released: false,
        }
    }

    /// Match the depth attachment to the context's current surface size.
    pub fn resize(&mut self, ctx: &RenderContext) {
        if self.released {
            return;
        }
        let (width, height) = ctx.size();
        self.depth.resize(&ctx.device, width, height);
    }

    /// Size of the depth attachment, which always tracks the surface.
    pub fn size(&self) -> (u32, u32) {
        self.depth.size()
    }

    /// Upload this frame's uniforms and draw stars then the object.
    pub fn render(&mut self, ctx: &RenderContext, scene: &SceneGraph) -> Result<(), SceneError> {
        if self.released {
            return Err(SceneError::Released);
        }

        self.globals.write(&ctx.queue, &scene.globals_uniform());
        self.object.write(&ctx.queue, &scene.object_uniform());
        self.star_uniform.write(&ctx.queue, &scene.star_uniform());

        let frame = ctx.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(self.depth.cleared_attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.stars.pipeline);
            pass.set_bind_group(0, &self.globals.bind_group, &[]);
            pass.set_bind_group(1, &self.star_uniform.bind_group, &[]);
            self.star_points.draw(&mut pass);

            pass.set_pipeline(&self.metallic.pipeline);
            pass.set_bind_group(1, &self.object.bind_group, &[]);
            self.object_mesh.bind(&mut pass);
            self.object_mesh.draw(&mut pass);
        }

        ctx.queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Destroy every buffer and texture. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.object_mesh.destroy();
        self.star_points.destroy();
        self.globals.buffer.destroy();
        self.object.buffer.destroy();
        self.star_uniform.buffer.destroy();
        self.depth.destroy();
        self.released = true;
        log::debug!("Scene GPU resources released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
