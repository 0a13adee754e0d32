use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::error::{Result, TelemetryError};
use crate::models::overlay_model::OverlayConfig;

/// Reads and parses an overlay config from `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<OverlayConfig> {
    let path = path.as_ref();

    let data = fs::read_to_string(path)?;
    let config: OverlayConfig = serde_json::from_str(&data)?;

    if config.series.is_empty() {
        return Err(TelemetryError::InvalidConfig(format!(
            "{} lists no series",
            path.display()
        )));
    }

    info!(
        "Config '{}' loaded from {}: {} series, {} readouts",
        config.name,
        path.display(),
        config.series.len(),
        config.readouts.len()
    );

    Ok(config)
}

/// Directory series paths are resolved against.
pub fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
