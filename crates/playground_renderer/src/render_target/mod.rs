/// Per-surface attachments: the optional MSAA color buffer and the depth
/// buffer.  The swapchain texture itself is acquired every frame and is the
/// resolve target when MSAA is on.
mod color;
mod depth;

pub use color::ColorTarget;
pub use depth::DepthTarget;

pub struct RenderTarget {
    pub color: ColorTarget,
    pub depth: DepthTarget,
    width: u32,
    height: u32,
}

impl RenderTarget {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            color: ColorTarget::new(device, width, height, format, sample_count),
            depth: DepthTarget::new(device, width, height, sample_count),
            width,
            height,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.color.resize(device, width, height);
        self.depth.resize(device, width, height);
    }

    pub fn sample_count(&self) -> u32 {
        self.color.sample_count
    }
}

/// Clamps a requested sample count to what every wgpu backend renders to:
/// 1 (off) or 4.
pub fn normalize_samples(requested: u32) -> u32 {
    if requested > 1 {
        4
    } else {
        1
    }
}

pub(crate) fn attachment_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
