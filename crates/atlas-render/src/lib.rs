//! wgpu rendering for the viewer: capability probing, device and surface
//! management, the lit metallic pipeline, the star point pipeline, and the
//! CPU-side scene description they draw.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pipeline;
pub mod probe;
pub mod scene;
pub mod scene_renderer;

pub use buffer::{BufferAllocator, MeshBuffer, PointBuffer};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{
    GpuOptions, RenderContext, RenderContextError, SurfaceError, init_render_context_blocking,
};
pub use pipeline::{
    GlobalsUniform, MetallicPipeline, OBJECT_SHADER_SOURCE, ObjectUniform, STAR_SHADER_SOURCE,
    StarPipeline, StarUniform,
};
pub use probe::{AdapterSummary, Capability, probe, probe_adapter, probe_with};
pub use scene::{
    LightRig, MetalMaterial, OBJECT_ROTATION_STEP_X, OBJECT_ROTATION_STEP_Y, SceneGraph,
    hex_to_linear, range_falloff, srgb_to_linear,
};
pub use scene_renderer::{SceneError, SceneRenderer};
