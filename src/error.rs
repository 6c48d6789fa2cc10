//! Unified error types for sysmon
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::time::Duration;
use thiserror::Error;

use crate::domain::ResourceKind;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the metrics provider
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Error from a notification channel
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Error from the monitor manager lifecycle
    #[error("Monitor error: {0}")]
    Manager(#[from] ManagerError),

    /// Signal handler could not be installed
    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    /// IO error (file operations, terminal output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// One or more validation rules failed
    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors from OS metric queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The underlying OS query failed
    #[error("Metric query failed: {0}")]
    Unavailable(String),

    /// The query succeeded but returned nothing usable
    #[error("No data returned for {0}")]
    NoData(String),

    /// No mounted filesystem matches the target
    #[error("Disk target not found: {0}")]
    TargetNotFound(String),
}

/// Errors from notification channels
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Channel configuration is incomplete
    #[error("{0} channel is not enabled (configuration incomplete)")]
    Disabled(String),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Remote service answered with an error code
    #[error("Rejected by remote service: {message} (code {code})")]
    Rejected { code: i64, message: String },

    /// Malformed e-mail address
    #[error("Invalid e-mail address '{0}'")]
    InvalidAddress(String),

    /// SMTP transport failure
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    /// Message could not be built
    #[error("Failed to build message: {0}")]
    Build(String),

    /// One or more channels failed to deliver
    #[error("Alert not delivered by: {}", .0.join(", "))]
    Undelivered(Vec<String>),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Http(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for NotifyError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        NotifyError::Smtp(err.to_string())
    }
}

/// Errors from monitor manager misuse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    /// Start called on a manager that is not in the Created state
    #[error("Monitor manager already started")]
    AlreadyStarted,

    /// Sampling interval below the supported minimum
    #[error("{kind} sampling interval {interval:?} is below the minimum of {minimum:?}")]
    IntervalTooShort {
        kind: ResourceKind,
        interval: Duration,
        minimum: Duration,
    },

    /// OS refused to spawn a sampler thread
    #[error("Failed to spawn sampler thread: {0}")]
    Spawn(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::Validation(vec![
            "cpu.threshold must be between 0 and 100".to_string(),
            "disk.interval_seconds must be at least 5".to_string(),
        ]);
        let text = err.to_string();
        assert!(text.contains("cpu.threshold"));
        assert!(text.contains("; disk.interval_seconds"));
    }

    #[test]
    fn test_interval_error_display() {
        let err = ManagerError::IntervalTooShort {
            kind: ResourceKind::Cpu,
            interval: Duration::from_secs(1),
            minimum: Duration::from_secs(5),
        };
        assert!(err.to_string().starts_with("CPU sampling interval 1s"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_rejected_display() {
        let err = NotifyError::Rejected {
            code: 310000,
            message: "sign not match".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Rejected by remote service: sign not match (code 310000)"
        );
    }

    #[test]
    fn test_undelivered_display() {
        let err = NotifyError::Undelivered(vec!["DingTalk".to_string(), "Email".to_string()]);
        assert_eq!(err.to_string(), "Alert not delivered by: DingTalk, Email");
    }

    #[test]
    fn test_error_conversion() {
        let err: AppError = ManagerError::AlreadyStarted.into();
        assert!(matches!(err, AppError::Manager(_)));

        let err: AppError = MetricsError::NoData("cpu".to_string()).into();
        assert!(matches!(err, AppError::Metrics(_)));
    }
}
