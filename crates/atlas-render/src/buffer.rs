//! Vertex and index buffers for the viewed object and the star points.

use atlas_mesh::{MeshData, MeshVertex};
use atlas_space::StarVertex;
use wgpu::util::DeviceExt;

/// Indexed triangle mesh on the GPU.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Release both buffers immediately.
    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Non-indexed point list on the GPU.
pub struct PointBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub point_count: u32,
}

impl PointBuffer {
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.point_count, 0..1);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
    }
}

/// Creates static GPU buffers from CPU geometry.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    pub fn create_mesh(&self, label: &str, mesh: &MeshData) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self.create_buffer(
                &format!("{label}-vertices"),
                mesh.vertex_bytes(),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: self.create_buffer(
                &format!("{label}-indices"),
                mesh.index_bytes(),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn create_points(&self, label: &str, points: &[StarVertex]) -> PointBuffer {
        PointBuffer {
            vertex_buffer: self.create_buffer(
                &format!("{label}-points"),
                bytemuck::cast_slice(points),
                wgpu::BufferUsages::VERTEX,
            ),
            point_count: points.len() as u32,
        }
    }

    /// Uniform buffer initialised from a `Pod` value and writable every frame.
    pub fn create_uniform<T: bytemuck::Pod>(&self, label: &str, value: &T) -> wgpu::Buffer {
        self.create_buffer(
            label,
            bytemuck::bytes_of(value),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        )
    }

    fn create_buffer(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
    }
}

/// Layout of [`MeshVertex`]: position at location 0, normal at location 1.
pub fn mesh_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Layout of [`StarVertex`]: position at location 0.
pub fn star_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<StarVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_mesh::ProceduralMeshBuilder;
    use atlas_space::StarField;
    use rand::SeedableRng;

    #[test]
    fn test_mesh_vertex_layout() {
        let layout = mesh_vertex_layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn test_star_vertex_layout() {
        let layout = star_vertex_layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
    }

    #[test]
    fn test_buffers_match_geometry() {
        let Some(device) = crate::gpu::test_device() else {
            return;
        };
        let allocator = BufferAllocator::new(&device);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(4);
        let object = ProceduralMeshBuilder::default().build(&mut rng);
        let mesh = allocator.create_mesh("object", &object.mesh);
        assert_eq!(mesh.index_count as usize, object.mesh.indices.len());
        assert_eq!(mesh.vertex_buffer.size() as usize, object.mesh.vertex_bytes().len());

        let stars = StarField::from_seed(1);
        let points = allocator.create_points("stars", stars.points());
        assert_eq!(points.point_count as usize, stars.len());

        mesh.destroy();
        points.destroy();
    }
}
