//! Render pipelines for the viewed object and the star points.
//!
//! Both pipelines share the globals bind group at `@group(0)` (camera and
//! lights). Per-draw data sits at `@group(1)`.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};

use crate::buffer::{mesh_vertex_layout, star_vertex_layout};
use crate::depth::DepthBuffer;

/// Camera and light rig, 128 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb = ambient color x intensity.
    pub ambient: [f32; 4],
    /// xyz = point light position, w = range.
    pub light_position_range: [f32; 4],
    /// rgb = point light color, a = intensity.
    pub light_color_intensity: [f32; 4],
}

/// Object transform and material, 96 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// rgb = linear base color, a = metalness.
    pub base_color_metalness: [f32; 4],
    /// x = roughness.
    pub roughness_pad: [f32; 4],
}

/// Star field transform and color, 80 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StarUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}

/// Globals layout shared by every pipeline at `@group(0)`.
pub fn globals_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(
        device,
        "globals-bgl",
        wgpu::ShaderStages::VERTEX_FRAGMENT,
        std::mem::size_of::<GlobalsUniform>(),
    )
}

fn opaque_target(format: wgpu::TextureFormat) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

/// Cook-Torrance shaded triangles: globals at group 0, object at group 1.
pub struct MetallicPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub object_bind_group_layout: wgpu::BindGroupLayout,
}

impl MetallicPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let object_bind_group_layout = uniform_layout(
            device,
            "object-bgl",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<ObjectUniform>(),
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("metallic-pipeline-layout"),
            bind_group_layouts: &[globals_layout, &object_bind_group_layout],
            immediate_size: 0,
        });

        let targets = opaque_target(surface_format);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("metallic-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[mesh_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthBuffer::stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            object_bind_group_layout,
        }
    }
}

/// Unlit point list: globals at group 0, star uniform at group 1.
pub struct StarPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub star_bind_group_layout: wgpu::BindGroupLayout,
}

impl StarPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let star_bind_group_layout = uniform_layout(
            device,
            "star-bgl",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<StarUniform>(),
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("star-pipeline-layout"),
            bind_group_layouts: &[globals_layout, &star_bind_group_layout],
            immediate_size: 0,
        });

        let targets = opaque_target(surface_format);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[star_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(false)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            star_bind_group_layout,
        }
    }
}

/// WGSL for the viewed object.
///
/// Cook-Torrance BRDF (GGX distribution, Schlick Fresnel, Smith geometry)
/// for the point light, scaled by a linear range falloff, plus an ambient
/// term on the base color.
pub const OBJECT_SHADER_SOURCE: &str = r#"
const PI: f32 = 3.14159265359;

struct Globals {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_position_range: vec4<f32>,
    light_color_intensity: vec4<f32>,
};

struct ObjectData {
    model: mat4x4<f32>,
    base_color_metalness: vec4<f32>,
    roughness_pad: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> object_data: ObjectData;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = object_data.model * vec4<f32>(in.position, 1.0);
    out.clip_position = globals.view_proj * world;
    out.world_position = world.xyz;
    // Rotation-only model matrix, so it transforms normals directly
    out.world_normal = (object_data.model * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * denom * denom);
}

fn geometry_schlick_ggx(n_dot: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = (r * r) / 8.0;
    return n_dot / (n_dot * (1.0 - k) + k);
}

fn fresnel_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (1.0 - f0) * pow(clamp(1.0 - cos_theta, 0.0, 1.0), 5.0);
}

fn range_falloff(dist: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 1.0;
    }
    return clamp(1.0 - dist / range, 0.0, 1.0);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = object_data.base_color_metalness.rgb;
    let metallic = object_data.base_color_metalness.a;
    let roughness = max(object_data.roughness_pad.x, 0.04);

    let n = normalize(in.world_normal);
    let v = normalize(globals.camera_position.xyz - in.world_position);
    let to_light = globals.light_position_range.xyz - in.world_position;
    let dist = length(to_light);
    let l = to_light / max(dist, 0.0001);
    let h = normalize(v + l);

    let n_dot_l = max(dot(n, l), 0.0);
    let n_dot_v = max(dot(n, v), 0.0);
    let n_dot_h = max(dot(n, h), 0.0);
    let h_dot_v = max(dot(h, v), 0.0);

    let f0 = mix(vec3<f32>(0.04), albedo, metallic);
    let d = distribution_ggx(n_dot_h, roughness);
    let g = geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness);
    let f = fresnel_schlick(h_dot_v, f0);

    let specular = d * g * f / (4.0 * n_dot_v * n_dot_l + 0.0001);
    let k_d = (vec3<f32>(1.0) - f) * (1.0 - metallic);
    let diffuse = k_d * albedo / PI;

    let light = globals.light_color_intensity;
    let radiance = light.rgb * light.a * range_falloff(dist, globals.light_position_range.w) * PI;
    let direct = (diffuse + specular) * radiance * n_dot_l;
    let ambient = globals.ambient.rgb * albedo;

    return vec4<f32>(direct + ambient, 1.0);
}
"#;

/// WGSL for the star points.
pub const STAR_SHADER_SOURCE: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    ambient: vec4<f32>,
    light_position_range: vec4<f32>,
    light_color_intensity: vec4<f32>,
};

struct StarData {
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> star_data: StarData;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.view_proj * star_data.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return star_data.color;
}
"#;
