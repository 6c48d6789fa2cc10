//! Trait definitions for OS metric queries
//!
//! These traits abstract over the OS so samplers can be tested with mocks.

use crate::domain::{CpuSample, DiskTarget, DiskUsage, MemorySample, Partition};
use crate::error::MetricsError;

/// Source of host resource readings
///
/// Every call may fail independently; callers treat failures as a skipped
/// reading, never as fatal. Implementations synchronize internally because
/// one provider is shared by all samplers.
pub trait MetricsProvider: Send + Sync {
    /// Current global CPU utilization
    fn cpu_usage(&self) -> Result<CpuSample, MetricsError>;

    /// Current virtual memory totals
    fn memory(&self) -> Result<MemorySample, MetricsError>;

    /// Current usage of the filesystem mounted at `target`
    fn disk_usage(&self, target: &DiskTarget) -> Result<DiskUsage, MetricsError>;

    /// All partitions known to the OS, unfiltered
    fn partitions(&self) -> Result<Vec<Partition>, MetricsError>;
}
