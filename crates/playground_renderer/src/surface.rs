/// The window surface and its configuration.
use playground_core::{DriverError, DriverErrorKind};

pub struct SurfaceState {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl SurfaceState {
    /// Configures `surface` for the adapter, preferring an sRGB format.
    pub fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self, crate::ContextError> {
        let caps = surface.get_capabilities(adapter);
        let format = preferred_format(&caps.formats).ok_or_else(|| {
            crate::ContextError::Surface("surface reports no supported formats".into())
        })?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(device, &config);
        log::info!(
            "surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self { surface, config })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(device, &self.config);
        }
    }

    /// Acquires the next swapchain texture.  A lost or outdated surface is
    /// reconfigured and acquisition retried once.
    pub fn acquire(&self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture, DriverError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(surface_error)
            }
            Err(e) => Err(surface_error(e)),
        }
    }
}

fn surface_error(e: wgpu::SurfaceError) -> DriverError {
    let kind = match e {
        wgpu::SurfaceError::OutOfMemory => DriverErrorKind::OutOfMemory,
        _ => DriverErrorKind::Surface,
    };
    DriverError::new(kind, e.to_string())
}

pub fn preferred_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_formats_win() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(preferred_format(&formats), Some(wgpu::TextureFormat::Bgra8UnormSrgb));
        assert_eq!(
            preferred_format(&[wgpu::TextureFormat::Rgba8Unorm]),
            Some(wgpu::TextureFormat::Rgba8Unorm)
        );
        assert_eq!(preferred_format(&[]), None);
    }

    #[test]
    fn vsync_selects_fifo() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }

    #[test]
    fn timeouts_are_surface_errors() {
        assert_eq!(surface_error(wgpu::SurfaceError::Timeout).kind, DriverErrorKind::Surface);
        assert_eq!(
            surface_error(wgpu::SurfaceError::OutOfMemory).kind,
            DriverErrorKind::OutOfMemory
        );
    }
}
