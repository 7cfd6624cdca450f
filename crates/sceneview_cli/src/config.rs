//! Configuration discovery for the CLI

use anyhow::{Context, Result};
use sceneview_manipulation::ManipulationConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Looked up in the working directory when no `--config` is given
pub const CONFIG_FILE: &str = "sceneview.toml";

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one, `sceneview.toml` in `dir` is
/// used when present and the built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<ManipulationConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.exists() {
                debug!("No {} in {}, using defaults", CONFIG_FILE, dir.display());
                return Ok(ManipulationConfig::default());
            }
            candidate
        }
    };

    let config = ManipulationConfig::load(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
