//! Microphone level capture.
//!
//! A single cpal input stream is opened at startup; its data callback runs
//! on cpal's dedicated audio thread and overwrites the shared volume cell on
//! every delivered buffer. Buffers arrive faster than frames are drawn, so
//! intermediate values are simply discarded without smoothing or
//! back-pressure.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use thiserror::Error;
use tracing::{debug, warn};

use crate::SignalHub;

/// Power level reported for an empty or all-zero buffer, matching the floor
/// that capture hardware reports for silence.
pub const SILENCE_FLOOR_DB: f32 = -160.0;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no default audio input device is available")]
    NoDefaultDevice,
    #[error("audio input device '{0}' was not found")]
    DeviceNotFound(String),
    #[error("failed to enumerate audio input devices: {0}")]
    Devices(#[from] cpal::DevicesError),
    #[error("failed to query the input stream configuration: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported input sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to build the audio input stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start the audio input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Owns the running input stream; capture stops when this is dropped.
pub struct VolumeCapture {
    _stream: cpal::Stream,
}

impl VolumeCapture {
    /// Opens the default (or named) input device and starts publishing
    /// volume levels into `hub`.
    pub fn start(hub: Arc<SignalHub>, device_name: Option<&str>) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => host
                .input_devices()?
                .find(|device| device.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()))?,
            None => host
                .default_input_device()
                .ok_or(AudioError::NoDefaultDevice)?,
        };

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        debug!(
            device = %device.name().unwrap_or_else(|_| "<unnamed>".into()),
            ?sample_format,
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "opening audio input stream"
        );

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, hub)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, hub)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, hub)?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;

        Ok(Self { _stream: stream })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    hub: Arc<SignalHub>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let db = power_level_db(data.iter().map(|sample| f32::from_sample(*sample)));
            hub.set_volume(volume_from_power_db(db));
        },
        |err| warn!(error = %err, "audio input stream error"),
        None,
    )
}

/// Computes the average power level of a buffer in decibels relative to
/// full scale, floored at [`SILENCE_FLOOR_DB`].
pub fn power_level_db(samples: impl Iterator<Item = f32>) -> f32 {
    let mut sum_squares = 0.0_f64;
    let mut count = 0_usize;
    for sample in samples {
        sum_squares += f64::from(sample) * f64::from(sample);
        count += 1;
    }
    if count == 0 {
        return SILENCE_FLOOR_DB;
    }

    let rms = (sum_squares / count as f64).sqrt() as f32;
    if rms <= 0.0 {
        SILENCE_FLOOR_DB
    } else {
        (20.0 * rms.log10()).max(SILENCE_FLOOR_DB)
    }
}

/// Maps a decibel power reading to the roughly linear 0..1 amplitude proxy
/// fed to shaders: `exp(db / 20)`.
///
/// The natural exponent (rather than `10^(db/20)`) compresses the usable
/// microphone range into values shaders can use directly: 0 dB maps to 1.0
/// and -20 dB to `1/e`.
pub fn volume_from_power_db(db: f32) -> f32 {
    (db / 20.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_maps_to_unity() {
        assert!((volume_from_power_db(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn minus_twenty_db_maps_to_inverse_e() {
        assert!((volume_from_power_db(-20.0) - 0.367_879_4).abs() < 1e-6);
    }

    #[test]
    fn silence_floor_maps_to_near_zero() {
        assert!(volume_from_power_db(SILENCE_FLOOR_DB) < 1e-3);
    }

    #[test]
    fn power_level_of_full_scale_square_is_zero_db() {
        let db = power_level_db([1.0_f32, -1.0, 1.0, -1.0].into_iter());
        assert!(db.abs() < 1e-4);
    }

    #[test]
    fn power_level_of_half_scale_sine_is_about_minus_nine_db() {
        let samples: Vec<f32> = (0..48_000)
            .map(|i| 0.5 * (i as f32 * 0.05).sin())
            .collect();
        let db = power_level_db(samples.into_iter());
        // RMS of a 0.5 amplitude sine is 0.5 / sqrt(2) ~= -9.03 dB.
        assert!((db + 9.03).abs() < 0.1);
    }

    #[test]
    fn power_level_of_silence_hits_the_floor() {
        assert_eq!(power_level_db(std::iter::empty()), SILENCE_FLOOR_DB);
        assert_eq!(power_level_db([0.0_f32; 64].into_iter()), SILENCE_FLOOR_DB);
    }
}
