/// `playground_renderer`: the wgpu render backend for the frame loop.
///
/// # Module layout
///
/// | Module          | Responsibility                                         |
/// |-----------------|--------------------------------------------------------|
/// | `context`       | `EngineContext`: instance, adapter, device, queue      |
/// | `shader`        | `ShaderProgram` loading + uniform locations            |
/// | `resources`     | Stream buffers, handle registry, draw uniform ring     |
/// | `pipeline`      | Shared layouts + pipelines compiled on first use       |
/// | `render_target` | MSAA color + depth attachments                         |
/// | `surface`       | Swapchain configuration and frame acquisition          |
///
/// Draws are queued between `begin_frame` and `present` and encoded into a
/// single render pass when the frame is presented.
pub mod context;
pub mod pipeline;
pub mod render_target;
pub mod resources;
pub mod shader;
pub mod surface;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use context::{ContextError, EngineContext};
pub use render_target::RenderTarget;
pub use shader::{ShaderError, ShaderProgram};
pub use surface::SurfaceState;

// ── Internal imports ──────────────────────────────────────────────────────────

use std::sync::Arc;

use playground_core::{
    AttributeStream, BufferHandle, Color, DrawCall, DriverError, DriverErrorKind, RenderBackend,
    StreamSet,
};

use pipeline::{PipelineCache, PipelineKey, PipelineLayouts};
use render_target::normalize_samples;
use resources::buffer::{self, STREAM_STRIDE};
use resources::{GpuDrawUniforms, HandleRegistry, UniformRing};

/// Uniform slots allocated up front; the ring doubles past this.
const INITIAL_DRAW_SLOTS: usize = 8;

/// Surface parameters fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererOptions {
    pub width: u32,
    pub height: u32,
    /// Requested MSAA level; anything above 1 becomes 4.
    pub samples: u32,
    pub vsync: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            samples: 4,
            vsync: true,
        }
    }
}

struct FrameState {
    texture: wgpu::SurfaceTexture,
    clear: Color,
}

struct QueuedDraw {
    pipeline: Arc<wgpu::RenderPipeline>,
    /// In slot order.
    vertex_buffers: Vec<Arc<wgpu::Buffer>>,
    first_vertex: u32,
    vertex_count: u32,
    uniforms: GpuDrawUniforms,
}

// ── Renderer ──────────────────────────────────────────────────────────────────

pub struct Renderer {
    pub context: EngineContext,
    surface: SurfaceState,
    target: RenderTarget,
    layouts: PipelineLayouts,
    pipelines: PipelineCache,
    program: Option<ShaderProgram>,
    buffers: HandleRegistry<Arc<wgpu::Buffer>>,
    uniforms: UniformRing,
    frame: Option<FrameState>,
    queued: Vec<QueuedDraw>,
    /// Errors detected on the CPU side (stale handles), reported through
    /// `take_driver_error` like device errors.
    pending_error: Option<DriverError>,
}

impl Renderer {
    pub fn new(
        context: EngineContext,
        surface: wgpu::Surface<'static>,
        options: RendererOptions,
    ) -> Result<Self, ContextError> {
        let device = &context.device;
        let surface = SurfaceState::new(
            surface,
            &context.adapter,
            device,
            options.width,
            options.height,
            options.vsync,
        )?;

        let samples = normalize_samples(options.samples);
        if samples != options.samples {
            log::info!("MSAA x{} requested, using x{samples}", options.samples);
        }
        let target = RenderTarget::new(
            device,
            surface.config.width,
            surface.config.height,
            surface.config.format,
            samples,
        );
        let layouts = PipelineLayouts::new(device);
        let uniforms = UniformRing::new(device, &layouts.uniforms, INITIAL_DRAW_SLOTS);
        let pipelines = PipelineCache::new(surface.config.format, samples);

        Ok(Self {
            context,
            surface,
            target,
            layouts,
            pipelines,
            program: None,
            buffers: HandleRegistry::new(),
            uniforms,
            frame: None,
            queued: Vec::new(),
            pending_error: None,
        })
    }

    /// Binds `program` for every following draw.
    pub fn use_program(&mut self, program: ShaderProgram) {
        self.pipelines.clear();
        self.program = Some(program);
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface.config.format
    }

    pub fn sample_count(&self) -> u32 {
        self.target.sample_count()
    }

    /// Buffers uploaded and not yet released.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(&self.context.device, width, height);
        self.target.resize(&self.context.device, width, height);
    }

    fn record_error(&mut self, error: DriverError) {
        log::warn!("{error}");
        self.pending_error.get_or_insert(error);
    }
}

impl RenderBackend for Renderer {
    fn upload_stream(
        &mut self,
        stream: AttributeStream,
        data: &[[f32; 3]],
        reuse: Option<BufferHandle>,
    ) -> Result<BufferHandle, DriverError> {
        let device = &self.context.device;
        let Some(handle) = reuse else {
            return Ok(self.buffers.insert(buffer::create_stream(device, stream, data)));
        };

        let existing = self
            .buffers
            .get(handle)
            .ok_or_else(|| unknown_buffer(handle))?;
        if !buffer::refill_stream(&self.context.queue, existing, data) {
            // Vertex count changed: the handle now names a new allocation.
            self.buffers
                .replace(handle, buffer::create_stream(device, stream, data));
        }
        Ok(handle)
    }

    fn begin_frame(&mut self, clear: Color) -> Result<(), DriverError> {
        if self.frame.take().is_some() {
            log::debug!("previous frame was never presented; discarding it");
        }
        self.queued.clear();
        let texture = self.surface.acquire(&self.context.device)?;
        self.frame = Some(FrameState { texture, clear });
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), DriverError> {
        let program = self.program.as_ref().ok_or_else(|| {
            DriverError::new(DriverErrorKind::Validation, "draw with no shader program bound")
        })?;
        if call.buffers.get(AttributeStream::Position).is_none() {
            return Err(DriverError::new(
                DriverErrorKind::Validation,
                "draw without a position stream",
            ));
        }

        let mut vertex_buffers = Vec::new();
        for (_, handle) in call.buffers.iter() {
            let buffer = self.buffers.get(handle).ok_or_else(|| unknown_buffer(handle))?;
            vertex_buffers.push(Arc::clone(buffer));
        }
        let available = vertex_buffers
            .iter()
            .map(|b| b.size() / STREAM_STRIDE)
            .min()
            .unwrap_or(0);
        let end = u64::from(call.first_vertex) + u64::from(call.vertex_count);
        if end > available {
            return Err(DriverError::new(
                DriverErrorKind::Validation,
                format!(
                    "draw range {}..{end} exceeds the {available} vertices bound",
                    call.first_vertex
                ),
            ));
        }

        let key = PipelineKey {
            primitive: call.primitive,
            streams: StreamSet {
                color: call.buffers.get(AttributeStream::Color).is_some(),
                normal: call.buffers.get(AttributeStream::Normal).is_some(),
            },
            depth_test: call.depth_test,
        };
        let pipeline =
            self.pipelines
                .get_or_create(&self.context.device, &self.layouts, program, key)?;

        self.queued.push(QueuedDraw {
            pipeline,
            vertex_buffers,
            first_vertex: call.first_vertex,
            vertex_count: call.vertex_count,
            uniforms: GpuDrawUniforms::from(&call.uniforms),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), DriverError> {
        let draws = std::mem::take(&mut self.queued);
        let frame = self.frame.take().ok_or_else(|| {
            DriverError::new(DriverErrorKind::Surface, "present without an acquired frame")
        })?;

        let device = &self.context.device;
        self.uniforms
            .ensure_capacity(device, &self.layouts.uniforms, draws.len());
        let blocks: Vec<GpuDrawUniforms> = draws.iter().map(|d| d.uniforms).collect();
        self.uniforms.write_all(&self.context.queue, &blocks);

        let surface_view = frame
            .texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (view, resolve_target) = self.target.color.attachment_views(&surface_view);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Playground Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(frame.clear)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, draw) in draws.iter().enumerate() {
                rpass.set_pipeline(&draw.pipeline);
                rpass.set_bind_group(0, &*self.uniforms.bind_group, &[self.uniforms.offset(slot)]);
                for (i, vb) in draw.vertex_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(i as u32, vb.slice(..));
                }
                rpass.draw(draw.first_vertex..draw.first_vertex + draw.vertex_count, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.texture.present();
        Ok(())
    }

    fn release_buffers(&mut self, handles: &[BufferHandle]) {
        for &handle in handles {
            if self.buffers.remove(handle).is_none() {
                self.record_error(unknown_buffer(handle));
            }
        }
    }

    fn take_driver_error(&mut self) -> Option<DriverError> {
        self.pending_error
            .take()
            .or_else(|| self.context.take_driver_error())
    }
}

fn unknown_buffer(handle: BufferHandle) -> DriverError {
    DriverError::new(
        DriverErrorKind::UnknownBuffer,
        format!("buffer {} is not live", handle.0),
    )
}

fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_converts_losslessly() {
        let c = to_wgpu_color(Color::DARK_BLUE);
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 0.0, 0.4f32 as f64, 0.0));
    }

    #[test]
    fn unknown_buffer_names_the_handle() {
        let err = unknown_buffer(BufferHandle(42));
        assert_eq!(err.kind, DriverErrorKind::UnknownBuffer);
        assert!(err.message.contains("42"));
    }

    #[test]
    fn default_options_match_the_tutorial_window() {
        let o = RendererOptions::default();
        assert_eq!((o.width, o.height, o.samples, o.vsync), (1024, 768, 4, true));
    }
}
