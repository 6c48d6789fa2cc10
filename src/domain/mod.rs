//! Domain models for sysmon
//!
//! Resource kinds, thresholds, metric readings, disk targets and alert
//! events. All types are plain values shared between the samplers, the
//! metrics provider and the notification channels.

pub mod alert;
pub mod disk;
pub mod resource;
pub mod sample;

pub use alert::AlertEvent;
pub use disk::{clean_path, os_name, DiskTarget, Platform};
pub use resource::{ResourceKind, Threshold};
pub use sample::{bytes_to_gb, CpuSample, DiskUsage, MemorySample, Partition, ResourceSample};
