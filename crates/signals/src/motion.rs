//! Gravity vector sampling.
//!
//! Desktop machines rarely expose an accelerometer, so the gravity signal
//! comes from a pluggable [`GravitySource`] sampled at a fixed rate by a
//! background thread. The sampler only ever writes the shared hub; GPU
//! buffers are updated exclusively inside the draw loop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::SignalHub;

/// Nominal sample rate for motion updates, mirroring typical device-motion
/// delivery intervals.
pub const MOTION_SAMPLE_RATE_HZ: f32 = 60.0;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("failed to spawn the gravity sampler thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Produces gravity vectors for the sampler thread.
///
/// Implementations are registered once at setup and polled at a fixed rate;
/// a unit-magnitude vector corresponds to the device resting under 1g.
pub trait GravitySource: Send {
    /// Returns the gravity vector `elapsed` after sampling started.
    fn sample(&mut self, elapsed: Duration) -> [f32; 3];
}

/// Constant gravity vector, the stand-in for a stationary device.
#[derive(Debug, Clone, Copy)]
pub struct FixedGravity {
    vector: [f32; 3],
}

impl FixedGravity {
    pub fn new(vector: [f32; 3]) -> Self {
        Self { vector }
    }
}

impl Default for FixedGravity {
    /// Device flat on its back: gravity points down the z axis.
    fn default() -> Self {
        Self {
            vector: [0.0, 0.0, -1.0],
        }
    }
}

impl GravitySource for FixedGravity {
    fn sample(&mut self, _elapsed: Duration) -> [f32; 3] {
        self.vector
    }
}

/// Simulated slow tilt: a unit vector precessing around the resting axis,
/// for demoing gravity-reactive shaders on sensorless machines.
#[derive(Debug, Clone, Copy)]
pub struct TiltSweep {
    period: Duration,
    tilt_radians: f32,
}

impl TiltSweep {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            tilt_radians: 0.35,
        }
    }
}

impl Default for TiltSweep {
    fn default() -> Self {
        Self::new(Duration::from_secs(8))
    }
}

impl GravitySource for TiltSweep {
    fn sample(&mut self, elapsed: Duration) -> [f32; 3] {
        let period = self.period.as_secs_f32().max(f32::EPSILON);
        let azimuth = elapsed.as_secs_f32() / period * std::f32::consts::TAU;
        let (tilt_sin, tilt_cos) = self.tilt_radians.sin_cos();
        [
            tilt_sin * azimuth.cos(),
            tilt_sin * azimuth.sin(),
            -tilt_cos,
        ]
    }
}

/// Background thread that copies source samples into the hub at a fixed
/// rate. Sampling stops and the thread is joined when this is dropped.
pub struct GravitySampler {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GravitySampler {
    pub fn spawn(
        mut source: Box<dyn GravitySource>,
        hub: Arc<SignalHub>,
        rate_hz: f32,
    ) -> Result<Self, MotionError> {
        let interval = Duration::from_secs_f32(1.0 / rate_hz.max(1.0));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let handle = thread::Builder::new()
            .name("shaderdeck-gravity".into())
            .spawn(move || {
                let origin = Instant::now();
                debug!(interval_ms = interval.as_millis(), "gravity sampler running");
                while !stop_flag.load(Ordering::Relaxed) {
                    hub.set_gravity(source.sample(origin.elapsed()));
                    thread::sleep(interval);
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for GravitySampler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
