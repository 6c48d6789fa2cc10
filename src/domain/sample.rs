//! Metric readings produced by the metrics provider

use super::disk::DiskTarget;
use super::resource::{ResourceKind, Threshold};
use serde::{Deserialize, Serialize};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Convert a byte count to binary gigabytes
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Global CPU utilization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuSample {
    /// Usage across all cores, 0-100
    pub usage_percent: f64,
}

impl CpuSample {
    pub fn new(usage_percent: f64) -> Self {
        Self { usage_percent }
    }
}

/// Virtual memory totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemorySample {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_percent: f64,
}

impl MemorySample {
    pub fn new(total_bytes: u64, available_bytes: u64, used_percent: f64) -> Self {
        Self {
            total_bytes,
            available_bytes,
            used_percent,
        }
    }

    pub fn total_gb(&self) -> f64 {
        bytes_to_gb(self.total_bytes)
    }

    pub fn available_gb(&self) -> f64 {
        bytes_to_gb(self.available_bytes)
    }
}

/// Usage of a single mounted filesystem
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
}

impl DiskUsage {
    /// Build usage from total and free space, deriving used bytes and percent
    pub fn from_totals(total_bytes: u64, free_bytes: u64) -> Self {
        let used_bytes = total_bytes.saturating_sub(free_bytes);
        let used_percent = if total_bytes > 0 {
            used_bytes as f64 / total_bytes as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_bytes,
            used_bytes,
            free_bytes,
            used_percent,
        }
    }
}

/// A partition as reported by the OS, before any filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Device name (e.g. `/dev/sda1`)
    pub device: String,
    /// Mount point or drive (e.g. `/`, `C:`)
    pub mount_point: String,
    /// Filesystem kind (e.g. `ext4`, `NTFS`)
    pub fs_type: String,
}

impl Partition {
    pub fn new(
        device: impl Into<String>,
        mount_point: impl Into<String>,
        fs_type: impl Into<String>,
    ) -> Self {
        Self {
            device: device.into(),
            mount_point: mount_point.into(),
            fs_type: fs_type.into(),
        }
    }
}

/// One reading taken by a sampler on a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSample {
    Cpu(CpuSample),
    Memory(MemorySample),
    Disk { target: DiskTarget, usage: DiskUsage },
}

impl ResourceSample {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Cpu(_) => ResourceKind::Cpu,
            Self::Memory(_) => ResourceKind::Memory,
            Self::Disk { .. } => ResourceKind::Disk,
        }
    }

    /// The value compared against the threshold
    ///
    /// Usage percent for CPU and disk, available GB for memory.
    pub fn reading(&self) -> f64 {
        match self {
            Self::Cpu(cpu) => cpu.usage_percent,
            Self::Memory(mem) => mem.available_gb(),
            Self::Disk { usage, .. } => usage.used_percent,
        }
    }

    /// One-line status for the sampler log
    pub fn status_line(&self, threshold: Threshold) -> String {
        match self {
            Self::Cpu(cpu) => format!(
                "CPU status | usage: {:.2}% | threshold: {:.2}%",
                cpu.usage_percent,
                threshold.limit()
            ),
            Self::Memory(mem) => format!(
                "Memory status | total: {:.2}GB | available: {:.2}GB | usage: {:.2}% | available threshold: {:.2}GB",
                mem.total_gb(),
                mem.available_gb(),
                mem.used_percent,
                threshold.limit()
            ),
            Self::Disk { target, usage } => format!(
                "Disk status | target: {} | total: {:.2}GB | used: {:.2}GB | free: {:.2}GB | usage: {:.2}% | threshold: {:.2}%",
                target,
                bytes_to_gb(usage.total_bytes),
                bytes_to_gb(usage.used_bytes),
                bytes_to_gb(usage.free_bytes),
                usage.used_percent,
                threshold.limit()
            ),
        }
    }

    /// Human-readable alert body describing a violation
    pub fn alert_content(&self, threshold: Threshold) -> String {
        match self {
            Self::Cpu(cpu) => format!(
                "CPU usage above threshold!\nCurrent usage: {:.2}%\nThreshold: {:.2}%",
                cpu.usage_percent,
                threshold.limit()
            ),
            Self::Memory(mem) => format!(
                "Available memory below threshold!\nTotal memory: {:.2}GB\nAvailable: {:.2}GB\nMemory usage: {:.2}%\nThreshold: {:.2}GB",
                mem.total_gb(),
                mem.available_gb(),
                mem.used_percent,
                threshold.limit()
            ),
            Self::Disk { target, usage } => format!(
                "Disk [{}] usage above threshold!\nTotal: {:.2}GB\nUsed: {:.2}GB\nFree: {:.2}GB\nCurrent usage: {:.2}%\nThreshold: {:.2}%",
                target,
                bytes_to_gb(usage.total_bytes),
                bytes_to_gb(usage.used_bytes),
                bytes_to_gb(usage.free_bytes),
                usage.used_percent,
                threshold.limit()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB: u64 = 1024 * 1024 * 1024;

    #[test]
    fn test_bytes_to_gb() {
        assert_eq!(bytes_to_gb(2 * GB), 2.0);
        assert_eq!(bytes_to_gb(GB / 2), 0.5);
    }

    #[test]
    fn test_disk_usage_from_totals() {
        let usage = DiskUsage::from_totals(100 * GB, 25 * GB);
        assert_eq!(usage.used_bytes, 75 * GB);
        assert!((usage.used_percent - 75.0).abs() < 1e-9);

        let empty = DiskUsage::from_totals(0, 0);
        assert_eq!(empty.used_percent, 0.0);
    }

    #[test]
    fn test_memory_reading_is_available_gb() {
        let sample = ResourceSample::Memory(MemorySample::new(16 * GB, 3 * GB / 2, 90.6));
        assert_eq!(sample.kind(), ResourceKind::Memory);
        assert!((sample.reading() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_disk_alert_content_names_target() {
        let sample = ResourceSample::Disk {
            target: DiskTarget::from_normalized("/data"),
            usage: DiskUsage::from_totals(100 * GB, 5 * GB),
        };
        let content = sample.alert_content(Threshold::Above(85.0));
        assert!(content.starts_with("Disk [/data] usage above threshold!"));
        assert!(content.contains("Current usage: 95.00%"));
        assert!(content.contains("Threshold: 85.00%"));
    }

    #[test]
    fn test_cpu_status_line() {
        let sample = ResourceSample::Cpu(CpuSample::new(42.5));
        assert_eq!(
            sample.status_line(Threshold::Above(80.0)),
            "CPU status | usage: 42.50% | threshold: 80.00%"
        );
    }
}
