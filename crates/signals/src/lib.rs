//! Live signal state shared between sensor callbacks and the frame loop.
//!
//! Two asynchronous producers feed the renderer: the microphone level
//! callback (cpal's audio thread, [`audio`]) and the gravity sampler thread
//! ([`motion`]). Both publish through [`SignalHub`], a pair of lock-free
//! atomic cells, and the frame loop reads a snapshot once per draw. A read
//! that races a write observes either the previous or the next sample;
//! both are at most one frame stale, which is invisible on screen.

pub mod audio;
pub mod motion;

use std::sync::atomic::{AtomicU32, Ordering};

pub use audio::{power_level_db, volume_from_power_db, AudioError, VolumeCapture};
pub use motion::{
    FixedGravity, GravitySampler, GravitySource, MotionError, TiltSweep, MOTION_SAMPLE_RATE_HZ,
};

/// Lock-free `f32` cell built on bit-cast atomic stores.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Latest-value store for the live signals feeding the shader uniforms.
///
/// Single writer per field, single reader; relaxed ordering is sufficient
/// because each field is an independent last-write-wins sample and no other
/// memory is published through it.
pub struct SignalHub {
    volume: AtomicF32,
    gravity: [AtomicF32; 3],
}

impl SignalHub {
    /// Creates a hub with silence and a resting gravity vector.
    pub fn new() -> Self {
        Self {
            volume: AtomicF32::new(0.0),
            gravity: [
                AtomicF32::new(0.0),
                AtomicF32::new(0.0),
                AtomicF32::new(-1.0),
            ],
        }
    }

    /// Overwrites the microphone volume level (linear, roughly 0..1).
    pub fn set_volume(&self, level: f32) {
        self.volume.store(level);
    }

    /// Returns the most recently published volume level.
    pub fn volume(&self) -> f32 {
        self.volume.load()
    }

    /// Overwrites the gravity vector.
    pub fn set_gravity(&self, vector: [f32; 3]) {
        for (cell, component) in self.gravity.iter().zip(vector) {
            cell.store(component);
        }
    }

    /// Returns the most recently published gravity vector.
    ///
    /// Components are read individually, so a read racing a write may mix
    /// two adjacent samples; successive gravity samples differ by well under
    /// a frame's worth of motion.
    pub fn gravity(&self) -> [f32; 3] {
        [
            self.gravity[0].load(),
            self.gravity[1].load(),
            self.gravity[2].load(),
        ]
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_f32_roundtrips_exact_bits() {
        let cell = AtomicF32::new(0.0);
        for value in [0.0_f32, -0.0, 1.0, -1.0, 0.3679, f32::MIN_POSITIVE] {
            cell.store(value);
            assert_eq!(cell.load().to_bits(), value.to_bits());
        }
    }

    #[test]
    fn hub_starts_silent_and_resting() {
        let hub = SignalHub::new();
        assert_eq!(hub.volume(), 0.0);
        assert_eq!(hub.gravity(), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn hub_returns_last_write() {
        let hub = SignalHub::new();
        hub.set_volume(0.25);
        hub.set_volume(0.75);
        assert_eq!(hub.volume(), 0.75);

        hub.set_gravity([0.1, -0.2, 0.97]);
        assert_eq!(hub.gravity(), [0.1, -0.2, 0.97]);
    }
}
