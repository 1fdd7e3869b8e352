//! dashboard - Crowd Monitor web dashboard
//!
//! This daemon:
//! 1. Loads configuration (DASHBOARD_CONFIG file + DASHBOARD_* env)
//! 2. Serves the pages, frame and heatmap images over HTTP
//! 3. Runs until Ctrl-C

use anyhow::Result;
use std::sync::mpsc;

use crowd_monitor::{api::DashboardServer, config::DashboardConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::load()?;
    log::info!(
        "video source {} (max {} frames, {:?} playback)",
        config.video.path,
        config.video.max_frames,
        config.video.policy
    );
    if !config.assets_dir.is_dir() {
        log::warn!(
            "assets directory {} does not exist; images and downloads will 404",
            config.assets_dir.display()
        );
    }

    let handle = DashboardServer::from_config(&config).spawn()?;
    log::info!("dashboard listening on http://{}", handle.addr);

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    log::info!("dashboard waiting for shutdown signal (Ctrl-C)...");
    let _ = rx.recv();
    log::info!("shutdown signal received, stopping dashboard...");
    handle.stop()?;

    Ok(())
}
