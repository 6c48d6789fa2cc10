//! Configuration system
//!
//! Handles TOML config file parsing, validation and CLI argument merging.

pub mod builder;
pub mod file;
pub mod mask;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::domain::{os_name, ResourceKind};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum sampling interval accepted by validation, in seconds
pub const MIN_INTERVAL_SECONDS: u64 = 5;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sampling settings
    pub monitor: MonitorConfig,
    /// Notification channel settings
    pub alert: AlertConfig,
}

impl Config {
    /// Check every rule and report all violations at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        let monitor = &self.monitor;

        if !(0.0..=100.0).contains(&monitor.cpu.threshold) {
            errors.push("monitor.cpu.threshold must be between 0 and 100".to_string());
        }
        if monitor.memory.available_threshold_gb < 0.0 {
            errors.push("monitor.memory.available_threshold_gb must not be negative".to_string());
        }
        if !(0.0..=100.0).contains(&monitor.disk.usage_threshold) {
            errors.push("monitor.disk.usage_threshold must be between 0 and 100".to_string());
        }
        for (kind, interval) in monitor.intervals() {
            if interval.as_secs() < MIN_INTERVAL_SECONDS {
                errors.push(format!(
                    "monitor.{}.interval_seconds must be at least {}",
                    kind.slug(),
                    MIN_INTERVAL_SECONDS
                ));
            }
        }

        let dingtalk = &self.alert.dingtalk;
        if !dingtalk.token.is_empty() && dingtalk.secret.is_empty() {
            errors.push("alert.dingtalk.token is set but alert.dingtalk.secret is missing".to_string());
        }

        let email = &self.alert.email;
        if !email.from.is_empty() {
            if email.smtp_host.is_empty() {
                errors.push("alert.email.from is set but alert.email.smtp_host is missing".to_string());
            }
            if email.smtp_port == 0 {
                errors.push("alert.email.from is set but alert.email.smtp_port is missing".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Copy with every secret masked, safe to print or log
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        let dingtalk = &mut masked.alert.dingtalk;
        dingtalk.token = mask::mask_secret(&dingtalk.token);
        dingtalk.secret = mask::mask_secret(&dingtalk.secret);

        let email = &mut masked.alert.email;
        email.password = mask::mask_secret(&email.password);
        email.from = mask::mask_email(&email.from);
        email.to = email.to.iter().map(|to| mask::mask_email(to)).collect();
        masked
    }
}

/// Sampling configuration for all resource kinds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Server display name used in alert titles
    pub server_name: String,
    pub cpu: CpuConfig,
    pub memory: MemoryConfig,
    pub disk: DiskConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            cpu: CpuConfig::default(),
            memory: MemoryConfig::default(),
            disk: DiskConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Sampling interval of every resource kind
    pub fn intervals(&self) -> [(ResourceKind, Duration); 3] {
        [
            (ResourceKind::Cpu, self.cpu.interval()),
            (ResourceKind::Memory, self.memory.interval()),
            (ResourceKind::Disk, self.disk.interval()),
        ]
    }
}

/// Default server name, derived from the host OS
pub fn default_server_name() -> String {
    format!("sys-monitor-{}", os_name())
}

/// CPU sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CpuConfig {
    /// Sampling interval in seconds
    pub interval_seconds: u64,
    /// Alert when usage percent is above this value
    pub threshold: f64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            threshold: 80.0,
        }
    }
}

impl CpuConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Memory sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Sampling interval in seconds
    pub interval_seconds: u64,
    /// Alert when available memory in GB is below this value
    pub available_threshold_gb: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            available_threshold_gb: 2.0,
        }
    }
}

impl MemoryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Disk sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiskConfig {
    /// Sampling interval in seconds
    pub interval_seconds: u64,
    /// Alert when used percent of a target is above this value
    pub usage_threshold: f64,
    /// Mount points or drives to watch; empty watches every detected disk
    pub targets: Vec<String>,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            usage_threshold: 85.0,
            targets: Vec::new(),
        }
    }
}

impl DiskConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    pub dingtalk: DingTalkConfig,
    pub email: EmailConfig,
}

/// DingTalk robot webhook settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DingTalkConfig {
    /// Robot access token
    pub token: String,
    /// Robot signing secret
    pub secret: String,
}

/// SMTP e-mail settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    /// Sender address
    pub from: String,
    /// SMTP password or authorization code
    pub password: String,
    pub smtp_host: String,
    /// 465 for implicit TLS, 587 for STARTTLS, others use STARTTLS when offered
    pub smtp_port: u16,
    /// Recipient addresses
    pub to: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.monitor.cpu.interval(), Duration::from_secs(30));
        assert_eq!(config.monitor.cpu.threshold, 80.0);
        assert_eq!(config.monitor.memory.available_threshold_gb, 2.0);
        assert_eq!(config.monitor.disk.interval(), Duration::from_secs(60));
        assert_eq!(config.monitor.disk.usage_threshold, 85.0);
        assert!(config.monitor.disk.targets.is_empty());
        assert!(config.monitor.server_name.starts_with("sys-monitor-"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.monitor.cpu.threshold = 120.0;
        config.monitor.disk.interval_seconds = 2;
        config.monitor.memory.available_threshold_gb = -1.0;
        config.alert.dingtalk.token = "abc".to_string();

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.iter().any(|e| e.contains("monitor.disk.interval_seconds")));
                assert!(errors.iter().any(|e| e.contains("dingtalk.secret")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_email_requires_smtp() {
        let mut config = Config::default();
        config.alert.email.from = "ops@example.com".to_string();

        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_masked_hides_secrets() {
        let mut config = Config::default();
        config.alert.dingtalk.token = "ae8042c730b88ce55acced5dde21e9bd".to_string();
        config.alert.email.password = "hunter22".to_string();
        config.alert.email.to = vec!["test123@qq.com".to_string()];

        let masked = config.masked();
        assert!(!masked.alert.dingtalk.token.contains("c730b88"));
        assert_eq!(masked.alert.email.to, vec!["te*****@qq.com"]);
        assert_ne!(masked.alert.email.password, "hunter22");
        // Source config untouched
        assert_eq!(config.alert.email.password, "hunter22");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [monitor]
            server_name = "db-02"

            [monitor.disk]
            targets = ["/", "/data"]

            [alert.dingtalk]
            token = "t"
            secret = "s"
            "#,
        )
        .unwrap();

        assert_eq!(config.monitor.server_name, "db-02");
        assert_eq!(config.monitor.disk.targets, vec!["/", "/data"]);
        assert_eq!(config.monitor.disk.usage_threshold, 85.0);
        assert_eq!(config.monitor.cpu, CpuConfig::default());
        assert_eq!(config.alert.dingtalk.secret, "s");
    }
}
