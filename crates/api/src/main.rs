//! Gaze Assist - Main Entry Point

use std::path::Path;

use anyhow::Context;
use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_from(Path::new(&path)),
        None => Settings::load(),
    }
    .context("failed to load settings")?;

    init_logging(&settings.log_level, settings.log_json)?;

    info!("=== Gaze Assist v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Screen {}x{}, backend {}",
        settings.gaze.screen.width, settings.gaze.screen.height, settings.backend.base_url
    );

    run_server(settings).await
}
