/// Dynamic uniform buffer holding one [`GpuDrawUniforms`] block per draw.
///
/// Every draw of a frame gets its own slot; the render pass binds the single
/// bind group once per draw with a different dynamic offset:
///
/// ```text
/// rpass.set_bind_group(0, &ring.bind_group, &[ring.offset(slot)]);
/// ```
///
/// ## Alignment
///
/// Dynamic offsets must be multiples of `min_uniform_buffer_offset_alignment`
/// (256 bytes on most desktop hardware), so each slot is
/// `align_up(208, alignment)` bytes even though the shader only sees 208.
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use playground_core::DrawUniforms;

/// Size of the block every playground shader declares at `@group(0) @binding(0)`.
pub const UNIFORM_BLOCK_SIZE: u64 = std::mem::size_of::<GpuDrawUniforms>() as u64;

/// std140-compatible mirror of [`DrawUniforms`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuDrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// xyz = world-space light position, w unused.
    pub light_position: [f32; 4],
}

impl From<&DrawUniforms> for GpuDrawUniforms {
    fn from(u: &DrawUniforms) -> Self {
        Self {
            mvp: u.mvp.to_cols_array_2d(),
            model: u.model.to_cols_array_2d(),
            view: u.view.to_cols_array_2d(),
            light_position: u.light_position.extend(1.0).to_array(),
        }
    }
}

pub struct UniformRing {
    pub buffer: wgpu::Buffer,
    /// References the whole buffer; the visible window is one slot.
    pub bind_group: Arc<wgpu::BindGroup>,
    /// Byte distance between consecutive slots.
    pub stride: u32,
    capacity: usize,
}

impl UniformRing {
    /// `layout` must be the draw-uniform layout with `has_dynamic_offset: true`.
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        initial_capacity: usize,
    ) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let stride = align_up(UNIFORM_BLOCK_SIZE as u32, alignment);

        let capacity = initial_capacity.max(1);
        let buffer = Self::create_buffer(device, capacity, stride);
        let bind_group = Self::create_bind_group(device, layout, &buffer);

        Self {
            buffer,
            bind_group: Arc::new(bind_group),
            stride,
            capacity,
        }
    }

    #[inline]
    pub fn offset(&self, slot: usize) -> u32 {
        (slot as u32).wrapping_mul(self.stride)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Grows the ring (doubling) so it holds at least `needed` slots.  The
    /// bind group is recreated on growth.
    pub fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        needed: usize,
    ) {
        if needed <= self.capacity {
            return;
        }
        let new_capacity = grown_capacity(self.capacity, needed);
        log::debug!("uniform ring: {} -> {new_capacity} slots", self.capacity);
        self.buffer = Self::create_buffer(device, new_capacity, self.stride);
        self.bind_group = Arc::new(Self::create_bind_group(device, layout, &self.buffer));
        self.capacity = new_capacity;
    }

    /// Packs `blocks` at stride intervals and uploads them in one write.
    pub fn write_all(&self, queue: &wgpu::Queue, blocks: &[GpuDrawUniforms]) {
        if blocks.is_empty() {
            return;
        }
        debug_assert!(blocks.len() <= self.capacity, "uniform ring overflow");
        queue.write_buffer(&self.buffer, 0, &pack(blocks, self.stride));
    }

    // ── Private helpers ──────────────────────────────────────────────────────

    fn create_buffer(device: &wgpu::Device, capacity: usize, stride: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Ring"),
            size: capacity as u64 * stride as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniform BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE),
                }),
            }],
        })
    }
}

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub(crate) fn align_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}

fn pack(blocks: &[GpuDrawUniforms], stride: u32) -> Vec<u8> {
    let stride = stride as usize;
    let mut data = vec![0u8; blocks.len() * stride];
    for (i, block) in blocks.iter().enumerate() {
        let start = i * stride;
        data[start..start + UNIFORM_BLOCK_SIZE as usize].copy_from_slice(bytemuck::bytes_of(block));
    }
    data
}
