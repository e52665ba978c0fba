use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::RunArgs;

const DEFAULT_SURFACE_SIZE: (u32, u32) = (1280, 720);
const DEFAULT_GRAVITY: [f32; 3] = [0.0, 0.0, -1.0];

/// Optional `config.toml` supplying defaults that CLI flags override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub size: Option<String>,
    pub fps: Option<f32>,
    pub gravity: Option<[f32; 3]>,
    pub audio_device: Option<String>,
}

impl AppConfig {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file at {}", path.display()))?;
            let config: Self = toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file at {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

/// Fully resolved run settings: CLI flags win over the config file, which
/// wins over built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub surface_size: (u32, u32),
    pub target_fps: Option<f32>,
    pub gravity: [f32; 3],
    pub tilt: bool,
    pub audio_enabled: bool,
    pub audio_device: Option<String>,
}

impl Settings {
    pub fn resolve(args: &RunArgs, config: &AppConfig) -> Result<Self> {
        let surface_size = args
            .size
            .as_deref()
            .or(config.size.as_deref())
            .map(parse_surface_size)
            .transpose()?
            .unwrap_or(DEFAULT_SURFACE_SIZE);

        let target_fps = args.fps.or(config.fps).filter(|fps| *fps > 0.0);
        let gravity = args.gravity.or(config.gravity).unwrap_or(DEFAULT_GRAVITY);
        let audio_device = args.audio_device.clone().or_else(|| config.audio_device.clone());

        Ok(Self {
            surface_size,
            target_fps,
            gravity,
            tilt: args.tilt,
            audio_enabled: !args.no_audio,
            audio_device,
        })
    }
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32)> {
    let (width_text, height_text) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width_text
        .trim()
        .parse()
        .with_context(|| format!("invalid width in '{value}'"))?;
    let height: u32 = height_text
        .trim()
        .parse()
        .with_context(|| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["shaderdeck"];
        full.extend_from_slice(argv);
        RunArgs::parse_from(full)
    }

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size("640X480").unwrap(), (640, 480));
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("0x720").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let root = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&root.path().join("absent.toml")).unwrap();
        assert!(config.size.is_none());
        assert!(config.fps.is_none());
    }

    #[test]
    fn config_file_is_parsed() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("config.toml");
        std::fs::write(
            &path,
            "size = \"1920x1080\"\nfps = 30.0\ngravity = [0.0, 1.0, 0.0]\naudio_device = \"pipe\"\n",
        )
        .unwrap();

        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config.size.as_deref(), Some("1920x1080"));
        assert_eq!(config.fps, Some(30.0));
        assert_eq!(config.gravity, Some([0.0, 1.0, 0.0]));
        assert_eq!(config.audio_device.as_deref(), Some("pipe"));
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("config.toml");
        std::fs::write(&path, "size = [not toml").unwrap();
        assert!(AppConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn cli_flags_override_config_values() {
        let config = AppConfig {
            size: Some("800x600".to_string()),
            fps: Some(24.0),
            gravity: Some([1.0, 0.0, 0.0]),
            audio_device: Some("configured".to_string()),
        };
        let settings =
            Settings::resolve(&args(&["--size", "1920x1080", "--gravity", "0,0,-1"]), &config)
                .unwrap();

        assert_eq!(settings.surface_size, (1920, 1080));
        assert_eq!(settings.target_fps, Some(24.0));
        assert_eq!(settings.gravity, [0.0, 0.0, -1.0]);
        assert_eq!(settings.audio_device.as_deref(), Some("configured"));
        assert!(settings.audio_enabled);
    }

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let settings = Settings::resolve(&args(&[]), &AppConfig::default()).unwrap();
        assert_eq!(settings.surface_size, (1280, 720));
        assert_eq!(settings.target_fps, None);
        assert_eq!(settings.gravity, [0.0, 0.0, -1.0]);
        assert!(settings.audio_enabled);
        assert!(!settings.tilt);
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let settings = Settings::resolve(&args(&["--fps", "0"]), &AppConfig::default()).unwrap();
        assert_eq!(settings.target_fps, None);
    }
}
