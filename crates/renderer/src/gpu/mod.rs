//! GPU orchestration for the render surface.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `uniforms` materialises the four uniform scratch buffers of the
//!   playground binding contract and writes values through the queue.
//! - `pipeline` resolves the fixed entry points of a validated shader and
//!   builds the triangle-strip quad pipeline.
//! - `state` glues everything together and exposes the `GpuState` API used
//!   by `window`.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
