//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Host resource monitor
///
/// Samples CPU, memory and disk usage and sends alerts through DingTalk
/// and e-mail when thresholds are violated.
#[derive(Parser, Debug)]
#[command(name = "sysmon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SYSMON_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitoring daemon (blocks until SIGINT/SIGTERM)
    Run(RunArgs),

    /// Validate and print the effective configuration
    Check,

    /// Show detected partitions and the disks that would be monitored
    Disks,

    /// Send a test alert through every enabled channel
    TestAlert,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Server name shown in alert titles (overrides the config file)
    #[arg(long)]
    pub server_name: Option<String>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let args = Cli::try_parse_from(["sysmon", "run"]).unwrap();
        match args.command {
            Commands::Run(run) => assert!(run.server_name.is_none()),
            other => panic!("Expected Run command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_server_name() {
        let args = Cli::try_parse_from(["sysmon", "run", "--server-name", "web-01"]).unwrap();
        if let Commands::Run(run) = args.command {
            assert_eq!(run.server_name.as_deref(), Some("web-01"));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["sysmon", "-v", "check"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Check));
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let args =
            Cli::try_parse_from(["sysmon", "disks", "--format", "json", "-c", "/tmp/s.toml"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.config.as_deref(), Some("/tmp/s.toml"));
        assert!(matches!(args.command, Commands::Disks));
    }

    #[test]
    fn test_cli_parse_test_alert() {
        let args = Cli::try_parse_from(["sysmon", "test-alert"]).unwrap();
        assert!(matches!(args.command, Commands::TestAlert));
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["sysmon", "--format", "xml", "check"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
