//! Resource kinds and threshold policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitored resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Global CPU utilization
    Cpu,
    /// Virtual memory availability
    Memory,
    /// Per-target disk usage
    Disk,
}

impl ResourceKind {
    /// Lowercase identifier used in thread names and config keys
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Disk => "disk",
        }
    }

    /// Title used for alerts of this kind
    pub fn alert_title(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU Alert",
            Self::Memory => "Memory Alert",
            Self::Disk => "Disk Alert",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Memory => write!(f, "Memory"),
            Self::Disk => write!(f, "Disk"),
        }
    }
}

/// Threshold with an explicit comparison direction
///
/// CPU and disk alert when usage rises above the limit, memory alerts when
/// available capacity falls below it. The two directions are kept as
/// separate variants so a sampler can never silently use the wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// Violated when the value is strictly greater than the limit
    Above(f64),
    /// Violated when the value is strictly less than the limit
    Below(f64),
}

impl Threshold {
    /// Check whether a reading violates this threshold
    pub fn is_violated(&self, value: f64) -> bool {
        match self {
            Self::Above(limit) => value > *limit,
            Self::Below(limit) => value < *limit,
        }
    }

    /// The configured limit
    pub fn limit(&self) -> f64 {
        match self {
            Self::Above(limit) | Self::Below(limit) => *limit,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above(v) => write!(f, "> {:.2}", v),
            Self::Below(v) => write!(f, "< {:.2}", v),
        }
    }
}
