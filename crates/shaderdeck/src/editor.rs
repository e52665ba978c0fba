use std::env;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use renderer::ValidatedShader;
use tracing::{info, warn};

/// Reads the shader source, degrading to an empty module if the file is
/// missing or unreadable; the compile step reports what is actually there.
pub fn load_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "shader source unavailable; starting from an empty module"
            );
            String::new()
        }
    }
}

/// Opens the user's editor on the shader file and waits for it to exit.
pub fn open_editor(path: &Path) -> Result<()> {
    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let status = process::Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch editor '{editor}'"))?;
    if !status.success() {
        anyhow::bail!("editor '{editor}' exited with {status}");
    }
    Ok(())
}

/// Edit/compile gate in front of the render surface.
///
/// Loops until the file compiles: failures print the full diagnostic, leave
/// the file untouched, and (when a terminal is attached) re-open the editor
/// for another attempt. Non-interactive runs fail on the first error.
pub fn compile_gate(path: &Path, edit_first: bool) -> Result<ValidatedShader> {
    let mut edit_requested = edit_first;
    loop {
        if edit_requested {
            open_editor(path)?;
        }

        let source = load_source(path);
        match ValidatedShader::compile(&source) {
            Ok(shader) => {
                info!(path = %path.display(), "shader compiled");
                return Ok(shader);
            }
            Err(err) => {
                eprintln!("{err}");
                if !io::stdin().is_terminal() {
                    return Err(err).context("shader failed to compile");
                }
                eprint!(
                    "press Enter to edit {} again, Ctrl-C to abort: ",
                    path.display()
                );
                io::stderr().flush().ok();
                let mut line = String::new();
                io::stdin()
                    .read_line(&mut line)
                    .context("failed to read from the terminal")?;
                edit_requested = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_source_degrades_to_empty() {
        let root = TempDir::new().unwrap();
        assert_eq!(load_source(&root.path().join("absent.wgsl")), "");
    }

    #[test]
    fn failing_source_never_passes_the_gate_and_stays_unchanged() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("broken.wgsl");
        let broken = "fn vs_main( {";
        fs::write(&path, broken).unwrap();

        // Test processes have no terminal attached, so the gate fails fast.
        assert!(compile_gate(&path, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn valid_source_passes_the_gate() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("ok.wgsl");
        fs::write(
            &path,
            r#"
            @vertex
            fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(position, 0.0, 1.0);
            }

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(0.0, 0.0, 0.0, 1.0);
            }
            "#,
        )
        .unwrap();

        assert!(compile_gate(&path, false).is_ok());
    }
}
