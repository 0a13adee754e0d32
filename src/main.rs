use anyhow::Context;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};

use telemetry_overlay::core::constants::DEFAULT_CONFIG_PATH;
use telemetry_overlay::utils::conf_helper::{base_dir, load_config};
use telemetry_overlay::{load_all, OverlayEngine};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = load_config(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let series = load_all(&config.series, &base_dir(&config_path)).context("loading series")?;

    let mut engine = OverlayEngine::new(&config, &series).context("building overlay engine")?;

    // One JSON snapshot per line
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = engine.run(|frame| -> anyhow::Result<()> {
        serde_json::to_writer(&mut out, &frame)?;
        out.write_all(b"\n")?;
        Ok(())
    })?;
    out.flush()?;

    info!("Done: {} frames for '{}'", frames, config.name);
    Ok(())
}
