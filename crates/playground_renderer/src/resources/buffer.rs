/// Thin wrappers over `wgpu::Buffer` creation for attribute streams.
use std::sync::Arc;

use playground_core::AttributeStream;
use wgpu::util::DeviceExt;

/// Bytes per vertex in every attribute stream (`vec3<f32>`).
pub const STREAM_STRIDE: u64 = 12;

/// Creates a vertex buffer holding one attribute stream.
///
/// `COPY_DST` is included so the buffer can be refilled in place when a
/// mesh is re-uploaded with the same vertex count.
pub fn create_stream(
    device: &wgpu::Device,
    stream: AttributeStream,
    data: &[[f32; 3]],
) -> Arc<wgpu::Buffer> {
    Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(stream_label(stream)),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    }))
}

/// Overwrites `buffer` with `data` when the sizes match.  Returns `false`
/// when the buffer must be reallocated instead.
pub fn refill_stream(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &[[f32; 3]]) -> bool {
    if buffer.size() != stream_size(data.len()) {
        return false;
    }
    queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
    true
}

#[inline]
pub fn stream_size(vertices: usize) -> u64 {
    vertices as u64 * STREAM_STRIDE
}

fn stream_label(stream: AttributeStream) -> &'static str {
    match stream {
        AttributeStream::Position => "Position Stream",
        AttributeStream::Color => "Color Stream",
        AttributeStream::Normal => "Normal Stream",
    }
}
