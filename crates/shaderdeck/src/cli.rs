use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "shaderdeck",
    author,
    version,
    about = "Live WGSL shader playground reactive to microphone volume and gravity",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the WGSL shader to run (defaults to the installed playground shader).
    #[arg(value_name = "SHADER")]
    pub shader: Option<PathBuf>,

    /// Open $EDITOR on the shader before the first compile.
    #[arg(long)]
    pub edit: bool,

    /// Override the window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap (0 = render every refresh).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Fixed gravity vector fed to the shader (default `0,0,-1`).
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_gravity)]
    pub gravity: Option<[f32; 3]>,

    /// Animate a simulated slow tilt instead of a fixed gravity vector.
    #[arg(long)]
    pub tilt: bool,

    /// Capture from a specific audio input device instead of the default.
    #[arg(long, value_name = "NAME")]
    pub audio_device: Option<String>,

    /// Disable microphone capture; the volume uniform stays at 0.
    #[arg(long)]
    pub no_audio: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect the resolved defaults (paths, bundled shader).
    Defaults(DefaultsCommand),
}

#[derive(Parser, Debug)]
pub struct DefaultsCommand {
    #[command(subcommand)]
    pub action: DefaultsAction,
}

#[derive(Subcommand, Debug)]
pub enum DefaultsAction {
    /// Print resolved directories for config and data roots.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_gravity(value: &str) -> Result<[f32; 3], String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("gravity vector must not be empty".to_string());
    }

    let components: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if components.len() != 3 {
        return Err(format!(
            "expected three comma-separated components, got {} in '{trimmed}'",
            components.len()
        ));
    }

    let mut vector = [0.0_f32; 3];
    for (slot, text) in vector.iter_mut().zip(&components) {
        *slot = text
            .parse::<f32>()
            .map_err(|_| format!("invalid gravity component '{text}'"))?;
        if !slot.is_finite() {
            return Err(format!("gravity component '{text}' must be finite"));
        }
    }
    Ok(vector)
}
