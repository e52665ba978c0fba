use std::sync::Arc;

use anyhow::Result;
use renderer::{Renderer, RendererConfig, SignalSample, SignalSource};
use signals::{
    FixedGravity, GravitySampler, GravitySource, SignalHub, TiltSweep, VolumeCapture,
    MOTION_SAMPLE_RATE_HZ,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::config::{AppConfig, Settings};
use crate::defaults::install_default_shader;
use crate::editor;
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Adapts the shared signal hub to the renderer's per-frame sampling trait.
struct HubSignals {
    hub: Arc<SignalHub>,
}

impl SignalSource for HubSignals {
    fn sample(&mut self) -> SignalSample {
        SignalSample {
            volume: self.hub.volume(),
            gravity: self.hub.gravity(),
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config = AppConfig::load_or_default(&paths.config_file())?;
    let settings = Settings::resolve(&args, &config)?;
    tracing::debug!(
        config = %paths.config_dir().display(),
        data = %paths.data_dir().display(),
        ?settings,
        "resolved shaderdeck paths and settings"
    );

    let shader_path = match &args.shader {
        Some(path) => path.clone(),
        None => match install_default_shader(&paths) {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "could not install the bundled shader; continuing anyway");
                paths.default_shader_path()
            }
        },
    };
    info!(path = %shader_path.display(), "using shader source");

    let shader = editor::compile_gate(&shader_path, args.edit)?;

    let hub = Arc::new(SignalHub::new());
    let _capture = if settings.audio_enabled {
        match VolumeCapture::start(hub.clone(), settings.audio_device.as_deref()) {
            Ok(capture) => Some(capture),
            Err(err) => {
                warn!(error = %err, "microphone capture unavailable; volume stays at 0");
                None
            }
        }
    } else {
        info!("microphone capture disabled");
        None
    };

    let gravity_source: Box<dyn GravitySource> = if settings.tilt {
        Box::new(TiltSweep::default())
    } else {
        Box::new(FixedGravity::new(settings.gravity))
    };
    let _sampler = GravitySampler::spawn(gravity_source, hub.clone(), MOTION_SAMPLE_RATE_HZ)?;

    let renderer_config = RendererConfig {
        surface_size: settings.surface_size,
        shader_path,
        window_title: "shaderdeck".to_string(),
        target_fps: settings.target_fps,
    };
    Renderer::new(renderer_config, shader, Box::new(HubSignals { hub })).run()
}
