use wgpu::util::DeviceExt;

use super::Mesh;

/// GPU-resident vertex + index buffers for one mesh.
///
/// Both buffers are released when the shape is dropped.
pub struct Shape {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

impl Shape {
    /// Uploads `mesh` into new vertex and index buffers.
    pub fn new(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "shape `{label}` uploaded: {} vertices, {} indices",
            mesh.vertices().len(),
            mesh.indices().len()
        );

        Self {
            vbo,
            ibo,
            index_count: mesh.indices().len() as u32,
        }
    }

    /// Binds the buffers and issues one indexed triangle-list draw.
    ///
    /// Pipeline and bind groups must already be set on `rpass`.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
