use wgpu::util::DeviceExt;

/// A uniform value, the buffer it lives in and a bind group pointing at it.
///
/// The CPU copy is the source of truth: change it through [`write`](Self::write)
/// which also schedules the upload.
#[derive(Debug)]
pub struct UniformBinding<T> {
    pub uniform: T,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl<T: bytemuck::Pod> UniformBinding<T> {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, uniform: T, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} Bind Group")),
        });
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, uniform: T) {
        self.uniform = uniform;
        self.flush(queue);
    }

    /// Uploads the current CPU copy.
    pub fn flush(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
