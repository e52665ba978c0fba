use std::borrow::Cow;
use std::mem;

use anyhow::Result;
use wgpu::naga::ShaderStage;

use crate::compile::{ValidatedShader, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};

use super::uniforms::scratch_layout_entries;

/// Four clip-space corners drawn as a triangle strip covering the viewport.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 4] =
    [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

pub(crate) const QUAD_VERTEX_COUNT: u32 = QUAD_VERTICES.len() as u32;

/// Layouts shared by every pipeline the surface ever builds.
pub(crate) struct PipelineLayouts {
    pub uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scratch uniform layout"),
            entries: &scratch_layout_entries(),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        Self {
            uniform_layout,
            pipeline_layout,
        }
    }
}

/// Immutable render pipeline drawing the full-screen quad with a user
/// shader module.
pub(crate) struct QuadPipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl QuadPipeline {
    /// Resolves the fixed entry points in `shader` and builds the pipeline.
    ///
    /// A module without both entry points is a content-authoring mistake and
    /// is reported as a fatal configuration error rather than recovered.
    pub fn new(
        device: &wgpu::Device,
        layouts: &PipelineLayouts,
        surface_format: wgpu::TextureFormat,
        shader: &ValidatedShader,
    ) -> Result<Self> {
        if !shader.has_entry_point(ShaderStage::Vertex, VERTEX_ENTRY_POINT) {
            anyhow::bail!("shader does not define the vertex entry point `{VERTEX_ENTRY_POINT}`");
        }
        if !shader.has_entry_point(ShaderStage::Fragment, FRAGMENT_ENTRY_POINT) {
            anyhow::bail!(
                "shader does not define the fragment entry point `{FRAGMENT_ENTRY_POINT}`"
            );
        }

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("playground shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(shader.source())),
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad pipeline"),
            layout: Some(&layouts.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some(VERTEX_ENTRY_POINT),
                buffers: &[vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some(FRAGMENT_ENTRY_POINT),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self { pipeline })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space_corners() {
        assert_eq!(QUAD_VERTEX_COUNT, 4);
        for corner in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(QUAD_VERTICES.contains(&corner));
        }
    }

    #[test]
    fn strip_order_forms_two_triangles_sharing_an_edge() {
        // Triangle strip (v0 v1 v2, v1 v2 v3) must not be degenerate: the
        // shared edge is v1-v2, the bottom-right to top-left diagonal.
        assert_eq!(QUAD_VERTICES[1], [1.0, -1.0]);
        assert_eq!(QUAD_VERTICES[2], [-1.0, 1.0]);
    }
}
