//! CPU side mesh data and its GPU upload.

use wgpu::util::DeviceExt;

use crate::data_structures::{bounds::Aabb, vertex::HasPosition};

/// Vertices plus a `u32` index list, as produced by [`crate::geometry`].
///
/// The CPU copy is kept after upload so objects can be picked against it.
#[derive(Clone, Debug, Default)]
pub struct MeshData<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> MeshData<V> {
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn map_vertices<W>(self, f: impl FnMut(V) -> W) -> MeshData<W> {
        MeshData {
            vertices: self.vertices.into_iter().map(f).collect(),
            indices: self.indices,
        }
    }
}

impl<V: HasPosition> MeshData<V> {
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.vertices.iter().map(HasPosition::position).collect()
    }

    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(HasPosition::position))
    }
}

/// Vertex and index buffers of one mesh.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl GpuMesh {
    pub fn new<V: bytemuck::Pod>(device: &wgpu::Device, name: &str, mesh: &MeshData<V>) -> Self {
        if mesh.indices.is_empty() {
            log::warn!("uploading mesh '{name}' without indices, nothing will be drawn");
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: mesh.indices.len() as u32,
        }
    }
}

pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &GpuMesh);
    fn draw_mesh_range(&mut self, mesh: &GpuMesh, indices: std::ops::Range<u32>);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &GpuMesh) {
        self.draw_mesh_range(mesh, 0..mesh.num_elements);
    }

    /// Draws a sub range of the index buffer, e.g. a single picked triangle.
    fn draw_mesh_range(&mut self, mesh: &GpuMesh, indices: std::ops::Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(indices, 0, 0..1);
    }
}
