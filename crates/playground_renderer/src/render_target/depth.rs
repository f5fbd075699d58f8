/// Depth buffer, cleared to 1.0 every frame.
///
/// The sample count must match the color attachment's.
use super::attachment_texture;

pub struct DepthTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sample_count: u32,
}

impl DepthTarget {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, width: u32, height: u32, sample_count: u32) -> Self {
        let (texture, view) =
            attachment_texture(device, "Depth Texture", width, height, Self::FORMAT, sample_count);
        Self { texture, view, sample_count }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height, self.sample_count);
    }
}
