/// Render pipelines compiled on first use.
///
/// A pipeline is fully determined by the bound program, the surface format
/// and sample count (fixed per cache), plus the per-draw state in
/// [`PipelineKey`].  Switching programs clears the cache.
use std::collections::HashMap;
use std::sync::Arc;

use playground_core::{DriverError, PrimitiveKind, StreamSet};

use crate::context::driver_error_from;
use crate::pipeline::layout::{stream_layouts, PipelineLayouts};
use crate::render_target::DepthTarget;
use crate::shader::{ShaderProgram, FRAGMENT_ENTRY, VERTEX_ENTRY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub primitive: PrimitiveKind,
    pub streams: StreamSet,
    pub depth_test: bool,
}

pub struct PipelineCache {
    format: wgpu::TextureFormat,
    sample_count: u32,
    pipelines: HashMap<PipelineKey, Arc<wgpu::RenderPipeline>>,
}

impl PipelineCache {
    pub fn new(format: wgpu::TextureFormat, sample_count: u32) -> Self {
        Self {
            format,
            sample_count,
            pipelines: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.pipelines.clear();
    }

    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        program: &ShaderProgram,
        key: PipelineKey,
    ) -> Result<Arc<wgpu::RenderPipeline>, DriverError> {
        if let Some(pipeline) = self.pipelines.get(&key) {
            return Ok(Arc::clone(pipeline));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self.build(device, layouts, program, key);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(driver_error_from(&err));
        }

        log::debug!("compiled pipeline {key:?}");
        let pipeline = Arc::new(pipeline);
        self.pipelines.insert(key, Arc::clone(&pipeline));
        Ok(pipeline)
    }

    fn build(
        &self,
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        program: &ShaderProgram,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        let buffers = stream_layouts(key.streams);
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Playground Render Pipeline"),
            layout: Some(&layouts.pipeline),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology(key.primitive),
                front_face: wgpu::FrontFace::Ccw,
                // The tutorial meshes mix windings; GL's default is no culling.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(key.depth_test)),
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }
}

pub fn topology(kind: PrimitiveKind) -> wgpu::PrimitiveTopology {
    match kind {
        PrimitiveKind::Triangles => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveKind::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        PrimitiveKind::Lines => wgpu::PrimitiveTopology::LineList,
        PrimitiveKind::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveKind::Points => wgpu::PrimitiveTopology::PointList,
    }
}

/// The depth attachment is always present; without depth testing every
/// fragment passes and nothing is written.
pub fn depth_state(depth_test: bool) -> wgpu::DepthStencilState {
    let (depth_write_enabled, depth_compare) = if depth_test {
        (true, wgpu::CompareFunction::Less)
    } else {
        (false, wgpu::CompareFunction::Always)
    };
    wgpu::DepthStencilState {
        format: DepthTarget::FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_kinds_map_to_topologies() {
        assert_eq!(topology(PrimitiveKind::Triangles), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(topology(PrimitiveKind::Lines), wgpu::PrimitiveTopology::LineList);
        assert_eq!(topology(PrimitiveKind::LineStrip), wgpu::PrimitiveTopology::LineStrip);
        assert_eq!(topology(PrimitiveKind::TriangleStrip), wgpu::PrimitiveTopology::TriangleStrip);
        assert_eq!(topology(PrimitiveKind::Points), wgpu::PrimitiveTopology::PointList);
    }

    #[test]
    fn depth_test_uses_less_and_writes() {
        let on = depth_state(true);
        assert!(on.depth_write_enabled);
        assert_eq!(on.depth_compare, wgpu::CompareFunction::Less);

        let off = depth_state(false);
        assert!(!off.depth_write_enabled);
        assert_eq!(off.depth_compare, wgpu::CompareFunction::Always);
    }
}
