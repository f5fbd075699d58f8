/// Multisampled color buffer that resolves into the swapchain texture.
///
/// With `sample_count == 1` nothing is allocated and the pass renders
/// straight into the swapchain view.
use super::attachment_texture;

pub struct ColorTarget {
    pub msaa_texture: Option<wgpu::Texture>,
    pub msaa_view: Option<wgpu::TextureView>,
    pub format: wgpu::TextureFormat,
    pub sample_count: u32,
}

impl ColorTarget {
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let (msaa_texture, msaa_view) = Self::make_msaa(device, width, height, format, sample_count);
        Self { msaa_texture, msaa_view, format, sample_count }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (texture, view) = Self::make_msaa(device, width, height, self.format, self.sample_count);
        self.msaa_texture = texture;
        self.msaa_view = view;
    }

    /// `(render_view, resolve_target)` for a color attachment drawing into
    /// `surface_view`.
    pub fn attachment_views<'a>(
        &'a self,
        surface_view: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa_view {
            Some(msaa) => (msaa, Some(surface_view)),
            None => (surface_view, None),
        }
    }

    fn make_msaa(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> (Option<wgpu::Texture>, Option<wgpu::TextureView>) {
        if sample_count <= 1 {
            return (None, None);
        }
        let (texture, view) =
            attachment_texture(device, "Color MSAA Texture", width, height, format, sample_count);
        (Some(texture), Some(view))
    }
}
