use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::compile::ValidatedShader;
use crate::gpu::GpuState;
use crate::runtime::{BoxedSignalSource, FramePacer};
use crate::RendererConfig;

/// Aggregates the GPU state and live signal source for the render window.
pub(crate) struct WindowState {
    window: Arc<Window>,
    gpu: GpuState,
    signals: BoxedSignalSource,
}

impl WindowState {
    pub(crate) fn new(
        window: Arc<Window>,
        shader: &ValidatedShader,
        signals: BoxedSignalSource,
    ) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, shader)?;
        Ok(Self {
            window,
            gpu,
            signals,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    pub(crate) fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let sample = self.signals.sample();
        self.gpu.render(sample)
    }

    /// Recompiles the shader file and swaps the pipeline on success.
    ///
    /// Any failure leaves the running shader (and the file) untouched so the
    /// user can edit and retry.
    pub(crate) fn reload_shader(&mut self, config: &RendererConfig) {
        let source = match fs::read_to_string(&config.shader_path) {
            Ok(source) => source,
            Err(err) => {
                warn!(
                    path = %config.shader_path.display(),
                    error = %err,
                    "failed to re-read shader source; keeping current shader"
                );
                return;
            }
        };

        let shader = match ValidatedShader::compile(&source) {
            Ok(shader) => shader,
            Err(err) => {
                error!("shader reload failed; keeping current shader\n{err}");
                return;
            }
        };

        match self.gpu.set_shader(&shader) {
            Ok(()) => info!(path = %config.shader_path.display(), "shader reloaded"),
            Err(err) => error!("failed to rebuild pipeline; keeping current shader: {err:?}"),
        }
    }
}

/// Runs the render window on the calling thread until the user closes it.
pub(crate) fn run(
    config: RendererConfig,
    shader: &ValidatedShader,
    signals: BoxedSignalSource,
) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(&config.window_title)
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create render window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, shader, signals)?;
    let mut pacer = FramePacer::new(config.target_fps, Instant::now());
    state.window().request_redraw();

    let mut result = Ok(());
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    handle_key(&event, &mut state, &config, elwt);
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(state.size());
                }
                WindowEvent::RedrawRequested => match state.render_frame() {
                    Ok(()) => {
                        pacer.mark_rendered(Instant::now());
                    }
                    Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                        state.resize(state.size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; closing render window");
                        elwt.exit();
                    }
                    Err(err) => {
                        // Dropped frame; the next refresh retries.
                        tracing::trace!(error = ?err, "skipping frame");
                    }
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if pacer.ready_for_frame(now) {
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Poll);
            } else if let Some(deadline) = pacer.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    if let Err(err) = run_result {
        result = Err(anyhow!("window event loop error: {err}"));
    }

    result
}

fn handle_key(
    event: &KeyEvent,
    state: &mut WindowState,
    config: &RendererConfig,
    elwt: &winit::event_loop::EventLoopWindowTarget<()>,
) {
    if event.state != ElementState::Pressed || event.repeat {
        return;
    }

    match &event.logical_key {
        Key::Named(NamedKey::Escape) => elwt.exit(),
        Key::Character(value) => match value.as_str() {
            "q" => elwt.exit(),
            "r" => state.reload_shader(config),
            _ => {}
        },
        _ => {}
    }
}
