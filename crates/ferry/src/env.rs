use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ferry_transfer::TransferConfig;
use home::home_dir;

const CONFIG_ENV: &str = "FERRY_CONFIG";

/// Which config file to read: `--config`, else `$FERRY_CONFIG`, else
/// `~/.ferry/config.toml` if it exists.
fn config_path(
    explicit: Option<&Path>,
    from_env: Option<String>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = from_env.filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    home.map(|h| h.join(".ferry").join("config.toml"))
        .filter(|p| p.is_file())
}

pub fn load_config(explicit: Option<&Path>) -> Result<TransferConfig> {
    let path = config_path(explicit, env::var(CONFIG_ENV).ok(), home_dir());

    let Some(path) = path else {
        tracing::debug!("no config file, using defaults");
        return Ok(TransferConfig::default());
    };

    let config = TransferConfig::load(&path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}
