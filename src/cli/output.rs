//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::domain::{bytes_to_gb, DiskUsage, Partition};
use crate::services::{DeliveryOutcome, Resolution, Selection};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;
}

/// Effective configuration, secrets masked
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    /// File the configuration came from, `None` when defaults are used
    pub source: Option<String>,
    pub config: Config,
    /// Channels that would receive alerts
    pub channels: Vec<String>,
}

impl TableDisplay for ConfigReport {
    fn to_table(&self) -> String {
        let monitor = &self.config.monitor;
        let mut output = format!(
            "Config: {}\n",
            self.source.as_deref().unwrap_or("(defaults)")
        );
        output.push_str(&format!("Server: {}\n\n", monitor.server_name));
        output.push_str(&format!(
            "  CPU     every {:>4}s  alert above {:.2}%\n",
            monitor.cpu.interval_seconds, monitor.cpu.threshold
        ));
        output.push_str(&format!(
            "  Memory  every {:>4}s  alert below {:.2}GB available\n",
            monitor.memory.interval_seconds, monitor.memory.available_threshold_gb
        ));
        let targets = if monitor.disk.targets.is_empty() {
            "all detected".to_string()
        } else {
            monitor.disk.targets.join(", ")
        };
        output.push_str(&format!(
            "  Disk    every {:>4}s  alert above {:.2}%  ({})\n\n",
            monitor.disk.interval_seconds, monitor.disk.usage_threshold, targets
        ));

        let channels = if self.channels.is_empty() {
            "none (alerts are only logged)".to_string()
        } else {
            self.channels.join(", ")
        };
        output.push_str(&format!("Channels: {}\n", channels));

        let dingtalk = &self.config.alert.dingtalk;
        if !dingtalk.token.is_empty() {
            output.push_str(&format!("  DingTalk token: {}\n", dingtalk.token));
        }
        let email = &self.config.alert.email;
        if !email.from.is_empty() {
            output.push_str(&format!(
                "  Email: {} via {}:{} to {}\n",
                email.from,
                email.smtp_host,
                email.smtp_port,
                email.to.join(", ")
            ));
        }

        output
    }
}

/// One detected partition
#[derive(Debug, Clone, Serialize)]
pub struct PartitionEntry {
    #[serde(flatten)]
    pub partition: Partition,
    /// Whether the partition is in the resolved target set
    pub monitored: bool,
    /// Current usage, when it could be read
    pub usage: Option<DiskUsage>,
}

impl TableDisplay for PartitionEntry {
    fn to_table(&self) -> String {
        let usage = match &self.usage {
            Some(u) => format!(
                "{:>6.2}% of {:>8.2}GB",
                u.used_percent,
                bytes_to_gb(u.total_bytes)
            ),
            None => "-".to_string(),
        };
        format!(
            "{} {:<24} {:<12} {:<20} {}",
            if self.monitored { "*" } else { " " },
            self.partition.mount_point,
            self.partition.fs_type,
            self.partition.device,
            usage
        )
    }
}

/// Partition list and disk target resolution
#[derive(Debug, Clone, Serialize)]
pub struct DiskReport {
    pub platform: String,
    pub partitions: Vec<PartitionEntry>,
    pub resolution: Resolution,
}

impl TableDisplay for DiskReport {
    fn to_table(&self) -> String {
        let mut output = format!(
            "Platform: {}\nPartitions Found: {}\n\n",
            self.platform,
            self.partitions.len()
        );

        for entry in &self.partitions {
            output.push_str(&entry.to_table());
            output.push('\n');
        }

        let selection = match self.resolution.selection {
            Selection::Configured => "configured targets",
            Selection::AllDetected => "all detected (none configured)",
            Selection::FallbackAll => "all detected (configured targets invalid)",
            Selection::NoneDetected => "disabled (nothing to monitor)",
        };
        output.push_str(&format!("\nMonitoring: {}\n", selection));

        let targets: Vec<&str> = self.resolution.targets.iter().map(|t| t.as_str()).collect();
        if !targets.is_empty() {
            output.push_str(&format!("  Targets: {}\n", targets.join(", ")));
        }
        if !self.resolution.invalid.is_empty() {
            let invalid: Vec<&str> = self.resolution.invalid.iter().map(|t| t.as_str()).collect();
            output.push_str(&format!("  Ignored: {}\n", invalid.join(", ")));
        }

        output
    }
}

/// Delivery result for one channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelResult {
    pub channel: String,
    pub delivered: bool,
    pub error: Option<String>,
}

impl From<DeliveryOutcome> for ChannelResult {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Delivered { channel } => Self {
                channel,
                delivered: true,
                error: None,
            },
            DeliveryOutcome::Failed { channel, error }
            | DeliveryOutcome::Faulted { channel, error } => Self {
                channel,
                delivered: false,
                error: Some(error),
            },
        }
    }
}

impl TableDisplay for ChannelResult {
    fn to_table(&self) -> String {
        match &self.error {
            None => format!("✓ {}: delivered", self.channel),
            Some(e) => format!("✗ {}: {}", self.channel, e),
        }
    }
}

/// Results of a test alert
#[derive(Debug, Clone, Serialize)]
pub struct AlertTestReport {
    pub server_name: String,
    pub results: Vec<ChannelResult>,
}

impl AlertTestReport {
    pub fn all_delivered(&self) -> bool {
        self.results.iter().all(|r| r.delivered)
    }
}

impl TableDisplay for AlertTestReport {
    fn to_table(&self) -> String {
        if self.results.is_empty() {
            return "✗ No alert channels enabled".to_string();
        }

        let mut output = format!("Test alert for {}\n", self.server_name);
        for result in &self.results {
            output.push_str(&format!("  {}\n", result.to_table()));
        }
        output
    }
}
