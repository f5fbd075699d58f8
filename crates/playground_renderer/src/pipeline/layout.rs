/// Bind-group and vertex-buffer layouts shared by every playground pipeline.
use std::sync::Arc;

use playground_core::{AttributeStream, StreamSet};

use crate::resources::buffer::STREAM_STRIDE;
use crate::resources::UNIFORM_BLOCK_SIZE;

#[derive(Clone)]
pub struct PipelineLayouts {
    /// group(0): the draw uniform block, bound with a dynamic offset per draw.
    pub uniforms: Arc<wgpu::BindGroupLayout>,
    pub pipeline: Arc<wgpu::PipelineLayout>,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniforms = Arc::new(device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Layout: Draw Uniforms (dynamic)"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    // The lit shaders read M, V and the light in the fragment stage.
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(UNIFORM_BLOCK_SIZE),
                    },
                    count: None,
                }],
            },
        ));

        let pipeline = Arc::new(device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Playground Pipeline Layout"),
                bind_group_layouts: &[&uniforms],
                push_constant_ranges: &[],
            },
        ));

        Self { uniforms, pipeline }
    }
}

const POSITION_ATTR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const NORMAL_ATTR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// One buffer layout per attribute stream: tightly packed `vec3<f32>` at the
/// stream's shader location.
pub fn stream_layout(stream: AttributeStream) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match stream {
        AttributeStream::Position => &POSITION_ATTR,
        AttributeStream::Color => &COLOR_ATTR,
        AttributeStream::Normal => &NORMAL_ATTR,
    };
    wgpu::VertexBufferLayout {
        array_stride: STREAM_STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

/// Buffer layouts for `streams`, in slot order.  Slot `i` is the `i`-th
/// present stream in location order.
pub fn stream_layouts(streams: StreamSet) -> Vec<wgpu::VertexBufferLayout<'static>> {
    streams.iter().map(stream_layout).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_follow_location_order() {
        let set = StreamSet { color: false, normal: true };
        let layouts = stream_layouts(set);
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].attributes[0].shader_location, 0);
        assert_eq!(layouts[1].attributes[0].shader_location, 2);
        assert!(layouts.iter().all(|l| l.array_stride == 12));
    }

    #[test]
    fn every_stream_is_a_float3() {
        for stream in AttributeStream::ALL {
            let layout = stream_layout(stream);
            assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
            assert_eq!(layout.attributes[0].offset, 0);
            assert_eq!(layout.attributes[0].shader_location, stream.location());
        }
    }
}
