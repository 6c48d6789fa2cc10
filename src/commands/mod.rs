//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod check;
pub mod disks;
pub mod run;
pub mod test_alert;

pub use check::run_check;
pub use disks::run_disks;
pub use run::run_monitor;
pub use test_alert::run_test_alert;

use crate::config::{Config, ConfigBuilder};
use crate::error::Result;

use std::path::PathBuf;

/// Load, merge and validate the configuration for a command
pub(crate) fn load_config(
    path: Option<&str>,
    server_name: Option<String>,
) -> Result<(Config, Option<PathBuf>)> {
    let builder = ConfigBuilder::new()
        .with_file(path)?
        .with_server_name(server_name);
    let source = builder.source().cloned();
    let config = builder.build()?;

    log::debug!("Effective configuration: {:?}", config.masked());
    Ok((config, source))
}
