//! sysmon - host resource monitoring daemon
//!
//! Samples CPU, memory and disk usage and sends threshold alerts.

use clap::Parser;
use sysmon::cli::args::{generate_completions, Cli, Commands};
use sysmon::commands::{run_check, run_disks, run_monitor, run_test_alert};
use sysmon::error::{AppError, ConfigError, NotifyError};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the verbose flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_monitor(args, config),

        Commands::Check => run_check(cli.format, config),

        Commands::Disks => run_disks(cli.format, config),

        Commands::TestAlert => run_test_alert(cli.format, config),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Pass an existing file with --config or set SYSMON_CONFIG.");
            eprintln!("      Without either, /etc/sysmon/config.toml and ./sysmon.toml are tried.");
        }
        AppError::Config(ConfigError::Validation(errors)) => {
            eprintln!();
            for e in errors {
                eprintln!("  - {}", e);
            }
            eprintln!();
            eprintln!("Hint: Run 'sysmon check' after fixing the configuration.");
        }
        AppError::Notify(NotifyError::Disabled(_)) => {
            eprintln!();
            eprintln!("Hint: Configure [alert.dingtalk] token and secret, or a complete");
            eprintln!("      [alert.email] section (from, smtp_host, smtp_port, to).");
        }
        _ => {}
    }
}
