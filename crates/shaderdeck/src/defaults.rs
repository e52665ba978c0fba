use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::paths::AppPaths;

/// The playground shader shipped with the binary.
pub const BUNDLED_SHADER: &str = include_str!("../assets/default.wgsl");

/// Installs the bundled shader into the user data directory on first run.
///
/// An existing file is never overwritten, so user edits survive upgrades.
pub fn install_default_shader(paths: &AppPaths) -> Result<PathBuf> {
    let target = paths.default_shader_path();
    if target.exists() {
        debug!(path = %target.display(), "default shader already installed");
        return Ok(target);
    }

    let dir = paths.shader_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create shader directory at {}", dir.display()))?;
    fs::write(&target, BUNDLED_SHADER)
        .with_context(|| format!("failed to install default shader at {}", target.display()))?;
    info!(path = %target.display(), "installed bundled playground shader");

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_paths(root: &std::path::Path) -> AppPaths {
        AppPaths::from_raw(root.join("config"), root.join("data"))
    }

    #[test]
    fn installs_the_bundled_shader_when_missing() {
        let root = TempDir::new().unwrap();
        let paths = build_paths(root.path());

        let installed = install_default_shader(&paths).unwrap();

        assert_eq!(installed, paths.default_shader_path());
        let contents = fs::read_to_string(installed).unwrap();
        assert_eq!(contents, BUNDLED_SHADER);
    }

    #[test]
    fn install_preserves_user_edits() {
        let root = TempDir::new().unwrap();
        let paths = build_paths(root.path());
        fs::create_dir_all(paths.shader_dir()).unwrap();
        fs::write(paths.default_shader_path(), "// my shader").unwrap();

        let installed = install_default_shader(&paths).unwrap();

        assert_eq!(fs::read_to_string(installed).unwrap(), "// my shader");
    }

    #[test]
    fn bundled_shader_exports_the_contract_entry_points() {
        assert!(BUNDLED_SHADER.contains("fn vs_main"));
        assert!(BUNDLED_SHADER.contains("fn fs_main"));
        for binding in 0..4 {
            assert!(BUNDLED_SHADER.contains(&format!("@binding({binding})")));
        }
    }
}
