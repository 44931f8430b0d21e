use glam::Mat4;

use crate::error::{ResourceError, ResourceResult};

use super::{UniformKind, UniformLocation};

/// Uniform buffer backing one `mat4x4<f32>` uniform.
pub struct MatrixUniform {
    buffer: wgpu::Buffer,
    location: UniformLocation,
}

impl MatrixUniform {
    pub const SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

    pub fn new(device: &wgpu::Device, location: UniformLocation, label: &str) -> ResourceResult<Self> {
        if location.kind != UniformKind::Matrix4 {
            return Err(ResourceError::UniformKind {
                name: label.to_string(),
                expected: UniformKind::Matrix4.name(),
                found: location.kind.name(),
            });
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: Self::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self { buffer, location })
    }

    pub fn location(&self) -> UniformLocation {
        self.location
    }

    /// Queues an upload of `matrix` (column-major). Takes effect at the next
    /// queue submission, ahead of that submission's command buffers.
    pub fn write(&self, queue: &wgpu::Queue, matrix: Mat4) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&matrix.to_cols_array()));
    }

    pub fn bind_group_entry(&self) -> wgpu::BindGroupEntry<'_> {
        wgpu::BindGroupEntry {
            binding: self.location.binding,
            resource: self.buffer.as_entire_binding(),
        }
    }
}
