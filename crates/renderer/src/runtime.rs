use std::time::{Duration, Instant};

/// Snapshot of the live signals read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSample {
    /// Microphone volume level, roughly 0..1.
    pub volume: f32,
    /// Gravity vector; unit magnitude corresponds to a device at rest.
    pub gravity: [f32; 3],
}

impl SignalSample {
    /// Silence under resting gravity.
    pub fn quiet() -> Self {
        Self {
            volume: 0.0,
            gravity: [0.0, 0.0, -1.0],
        }
    }
}

/// Abstraction over where the per-frame signal values originate from.
///
/// An implementation is bound once at renderer construction and sampled by
/// the frame loop; producers behind it update asynchronously and the latest
/// value wins.
pub trait SignalSource: Send {
    /// Produces the signal values for the next frame.
    fn sample(&mut self) -> SignalSample;
}

/// Signal source that always reports the same values, for tests and for
/// running shaders without any live input.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSignals {
    sample: SignalSample,
}

impl ConstantSignals {
    pub fn new(volume: f32, gravity: [f32; 3]) -> Self {
        Self {
            sample: SignalSample { volume, gravity },
        }
    }
}

impl Default for ConstantSignals {
    fn default() -> Self {
        Self {
            sample: SignalSample::quiet(),
        }
    }
}

impl SignalSource for ConstantSignals {
    fn sample(&mut self) -> SignalSample {
        self.sample
    }
}

/// Convenient alias for owning signal sources behind trait objects.
pub type BoxedSignalSource = Box<dyn SignalSource>;

/// Schedules redraws against an optional FPS cap.
///
/// Without a cap every `AboutToWait` turn requests another redraw; with one
/// the pacer reports the deadline the event loop should sleep until.
pub(crate) struct FramePacer {
    interval: Option<Duration>,
    next_frame: Instant,
}

impl FramePacer {
    pub fn new(target_fps: Option<f32>, now: Instant) -> Self {
        let interval = target_fps
            .filter(|fps| *fps > 0.0)
            .map(|fps| Duration::from_secs_f32(1.0 / fps));
        Self {
            interval,
            next_frame: now,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.interval {
            Some(_) => now >= self.next_frame,
            None => true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.interval.map(|_| self.next_frame)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        if let Some(interval) = self.interval {
            self.next_frame = now + interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_pacer_is_always_ready() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(None, now);
        assert!(pacer.ready_for_frame(now));
        pacer.mark_rendered(now);
        assert!(pacer.ready_for_frame(now));
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn capped_pacer_waits_out_the_interval() {
        let now = Instant::now();
        let mut pacer = FramePacer::new(Some(10.0), now);
        assert!(pacer.ready_for_frame(now));

        pacer.mark_rendered(now);
        assert!(!pacer.ready_for_frame(now + Duration::from_millis(50)));
        assert!(pacer.ready_for_frame(now + Duration::from_millis(100)));

        let deadline = pacer.next_deadline().expect("deadline when capped");
        assert_eq!(deadline, now + Duration::from_millis(100));
    }

    #[test]
    fn zero_fps_cap_means_uncapped() {
        let now = Instant::now();
        let pacer = FramePacer::new(Some(0.0), now);
        assert!(pacer.ready_for_frame(now));
        assert!(pacer.next_deadline().is_none());
    }

    #[test]
    fn constant_signals_report_fixed_values() {
        let mut source = ConstantSignals::new(0.5, [0.0, 1.0, 0.0]);
        let sample = source.sample();
        assert_eq!(sample.volume, 0.5);
        assert_eq!(sample.gravity, [0.0, 1.0, 0.0]);
    }
}
