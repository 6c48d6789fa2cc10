//! Run command implementation
//!
//! Starts the monitoring daemon and blocks until SIGINT or SIGTERM.

use crate::alerts::build_enabled_senders;
use crate::cli::args::RunArgs;
use crate::commands::load_config;
use crate::error::{AppError, Result};
use crate::metrics::SysinfoProvider;
use crate::services::Manager;

use std::sync::{mpsc, Arc};

/// Execute the run command
pub fn run_monitor(args: &RunArgs, config_path: Option<&str>) -> Result<()> {
    let (config, _) = load_config(config_path, args.server_name.clone())?;

    let senders = build_enabled_senders(&config.alert);
    let provider = Arc::new(SysinfoProvider::new());
    let mut manager = Manager::new(config.monitor, provider, senders)?;

    // Set up signal handler before any sampler runs
    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| AppError::Signal(e.to_string()))?;

    manager.start()?;
    log::info!(
        "Monitoring {} started. Press Ctrl+C to stop.",
        manager.server_name()
    );

    // Wait for SIGINT/SIGTERM; a closed channel also means shutdown
    let _ = shutdown_rx.recv();
    log::info!("Received shutdown signal");

    manager.stop();
    Ok(())
}
