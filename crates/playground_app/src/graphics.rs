use std::sync::Arc;

use anyhow::Context as _;
use playground_core::{
    AttributeStream, BufferHandle, Color, DrawCall, DriverError, RenderBackend,
};
use playground_renderer::{ContextError, EngineContext, Renderer, RendererOptions};
use winit::window::Window;

use crate::builder::WindowConfig;
use crate::error::InitError;
use crate::host::ResizeSignal;

/// The renderer bound to the host window.  Applies window resizes before a
/// frame starts and otherwise forwards to [`Renderer`].
pub struct GraphicsState {
    pub renderer: Renderer,
    resized: ResizeSignal,
}

impl GraphicsState {
    pub async fn new(
        window: Arc<Window>,
        config: &WindowConfig,
        resized: ResizeSignal,
    ) -> Result<Self, InitError> {
        let size = window.inner_size();
        let instance = EngineContext::new_instance();
        let surface = instance
            .create_surface(window)
            .map_err(|e| ContextError::Surface(e.to_string()))
            .context("creating the window surface")
            .map_err(InitError::Graphics)?;
        let context = EngineContext::new_with_instance(instance, Some(&surface))
            .await
            .map_err(InitError::Graphics)?;

        let renderer = Renderer::new(
            context,
            surface,
            RendererOptions {
                width: size.width,
                height: size.height,
                samples: config.samples,
                vsync: config.vsync,
            },
        )
        .map_err(|e| InitError::Graphics(e.into()))?;

        Ok(Self { renderer, resized })
    }
}

impl RenderBackend for GraphicsState {
    fn upload_stream(
        &mut self,
        stream: AttributeStream,
        data: &[[f32; 3]],
        reuse: Option<BufferHandle>,
    ) -> Result<BufferHandle, DriverError> {
        self.renderer.upload_stream(stream, data, reuse)
    }

    fn begin_frame(&mut self, clear: Color) -> Result<(), DriverError> {
        if let Some((width, height)) = self.resized.take() {
            log::debug!("window resized to {width}x{height}");
            self.renderer.resize(width, height);
        }
        self.renderer.begin_frame(clear)
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), DriverError> {
        self.renderer.draw(call)
    }

    fn present(&mut self) -> Result<(), DriverError> {
        self.renderer.present()
    }

    fn release_buffers(&mut self, handles: &[BufferHandle]) {
        self.renderer.release_buffers(handles)
    }

    fn take_driver_error(&mut self) -> Option<DriverError> {
        self.renderer.take_driver_error()
    }
}
