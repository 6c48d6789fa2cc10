//! Check command implementation
//!
//! Validates the configuration and prints the effective values.

use crate::alerts::build_enabled_senders;
use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, ConfigReport};
use crate::commands::load_config;
use crate::error::Result;

/// Execute the check command
pub fn run_check(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let (config, source) = load_config(config_path, None)?;

    let channels = build_enabled_senders(&config.alert)
        .iter()
        .map(|s| s.name().to_string())
        .collect();

    let report = ConfigReport {
        source: source.map(|p| p.display().to_string()),
        config: config.masked(),
        channels,
    };

    print_output(&report, format)?;
    Ok(())
}
