use std::time::Instant;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::compile::ValidatedShader;
use crate::runtime::SignalSample;

use super::context::GpuContext;
use super::pipeline::{PipelineLayouts, QuadPipeline, QUAD_VERTEX_COUNT, QUAD_VERTICES};
use super::uniforms::ScratchBuffers;

/// Owns every GPU resource for the render surface and runs the per-frame
/// uniform-update/draw loop.
///
/// All resources are created once here and live for the surface's lifetime;
/// the only mutation after construction is the scratch-buffer writes each
/// frame, the surface reconfigure on resize, and the pipeline swap on a
/// successful shader reload.
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    scratch: ScratchBuffers,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    pipeline: QuadPipeline,
    start_time: Instant,
    frame_count: u64,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        shader: &ValidatedShader,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size)?;
        let layouts = PipelineLayouts::new(&context.device);

        let scratch = ScratchBuffers::new(&context.device);
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("scratch uniform bind group"),
                layout: &layouts.uniform_layout,
                entries: &scratch.bind_group_entries(),
            });

        let vertex_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("quad vertices"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let pipeline = QuadPipeline::new(
            &context.device,
            &layouts,
            context.surface_format,
            shader,
        )?;

        scratch.write_resolution(
            &context.queue,
            context.size.width as f32,
            context.size.height as f32,
        );

        Ok(Self {
            context,
            layouts,
            scratch,
            uniform_bind_group,
            vertex_buffer,
            pipeline,
            start_time: Instant::now(),
            frame_count: 0,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    /// Reconfigures the surface and refreshes the resolution scratch buffer.
    ///
    /// This can land between two draws; the stale value costs one frame of
    /// visual scaling, never correctness.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.scratch.write_resolution(
            &self.context.queue,
            new_size.width as f32,
            new_size.height as f32,
        );
    }

    /// Swaps in a new shader, keeping the current pipeline if the build
    /// fails.
    pub(crate) fn set_shader(&mut self, shader: &ValidatedShader) -> Result<()> {
        let pipeline = QuadPipeline::new(
            &self.context.device,
            &self.layouts,
            self.context.surface_format,
            shader,
        )?;
        self.pipeline = pipeline;
        Ok(())
    }

    /// Renders one frame: overwrite the time/volume/gravity scratch buffers
    /// with the latest samples, draw the quad, submit, present.
    pub(crate) fn render(&mut self, signals: SignalSample) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;

        // The session clock starts at the first presented frame, not at
        // surface construction, so shaders see time 0.0 on frame one.
        if self.frame_count == 0 {
            self.start_time = Instant::now();
        }
        self.frame_count = self.frame_count.saturating_add(1);

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let queue = &self.context.queue;
        self.scratch.write_time(queue, elapsed);
        self.scratch.write_volume(queue, signals.volume);
        self.scratch.write_gravity(queue, signals.gravity);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
