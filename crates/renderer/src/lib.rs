//! Renderer crate for shaderdeck.
//!
//! The module glues the preview window, the `wgpu` quad pipeline, and the
//! runtime WGSL compile step together. The overall flow is:
//!
//! ```text
//!   CLI / editor gate
//!          │ RendererConfig + ValidatedShader + SignalSource
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          ▲                                      │
//!          │                                      └─▶ scratch buffers ─▶ GPU
//! ```
//!
//! `GpuState` owns all GPU resources (surface, device, pipeline, the four
//! uniform scratch buffers), while `Renderer` is the thin entry point that
//! wires the compiled shader and the live signal source into the window
//! loop. User shaders are WGSL modules exporting the two fixed entry points
//! and reading the fragment-stage bindings 0-3 (resolution, time, volume,
//! gravity).

mod compile;
mod gpu;
mod runtime;
mod window;

use std::path::PathBuf;

use anyhow::Result;

pub use compile::{CompileError, ValidatedShader, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};
pub use runtime::{BoxedSignalSource, ConstantSignals, SignalSample, SignalSource};

/// Immutable configuration passed to the renderer at start-up.
#[derive(Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Path the reload key recompiles the shader from.
    pub shader_path: PathBuf,
    /// Title of the render window.
    pub window_title: String,
    /// Optional FPS cap; None = render every refresh.
    pub target_fps: Option<f32>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            shader_path: PathBuf::new(),
            window_title: "shaderdeck".to_string(),
            target_fps: None,
        }
    }
}

/// High-level entry point that owns the configuration, the compiled shader,
/// and the signal source bound at setup.
pub struct Renderer {
    config: RendererConfig,
    shader: ValidatedShader,
    signals: BoxedSignalSource,
}

impl Renderer {
    /// Builds a renderer for a successfully compiled shader.
    pub fn new(
        config: RendererConfig,
        shader: ValidatedShader,
        signals: BoxedSignalSource,
    ) -> Self {
        Self {
            config,
            shader,
            signals,
        }
    }

    /// Opens the render window and blocks until it is closed.
    pub fn run(self) -> Result<()> {
        window::run(self.config, &self.shader, self.signals)
    }
}
