//! sysinfo-backed metrics provider

use crate::domain::{CpuSample, DiskTarget, DiskUsage, MemorySample, Partition, Platform};
use crate::error::MetricsError;
use crate::metrics::traits::MetricsProvider;

use std::sync::{Mutex, MutexGuard, PoisonError};
use sysinfo::{Disks, System};

/// Metrics provider reading from the running host
pub struct SysinfoProvider {
    system: Mutex<System>,
    platform: Platform,
}

impl SysinfoProvider {
    /// Create a provider and take the CPU baseline
    ///
    /// CPU usage is computed between two refreshes, so the first reading
    /// after construction covers the time since this call.
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();

        Self {
            system: Mutex::new(system),
            platform: Platform::current(),
        }
    }

    fn system(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn cpu_usage(&self) -> Result<CpuSample, MetricsError> {
        let mut system = self.system();
        system.refresh_cpu_usage();

        if system.cpus().is_empty() {
            return Err(MetricsError::NoData("CPU usage".to_string()));
        }

        Ok(CpuSample::new(f64::from(system.global_cpu_usage())))
    }

    fn memory(&self) -> Result<MemorySample, MetricsError> {
        let mut system = self.system();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(MetricsError::NoData("virtual memory".to_string()));
        }

        let used_percent = system.used_memory() as f64 / total as f64 * 100.0;
        Ok(MemorySample::new(total, system.available_memory(), used_percent))
    }

    fn disk_usage(&self, target: &DiskTarget) -> Result<DiskUsage, MetricsError> {
        let disks = Disks::new_with_refreshed_list();

        disks
            .list()
            .iter()
            .find(|disk| {
                DiskTarget::parse(self.platform, &disk.mount_point().to_string_lossy()).as_ref()
                    == Some(target)
            })
            .map(|disk| DiskUsage::from_totals(disk.total_space(), disk.available_space()))
            .ok_or_else(|| MetricsError::TargetNotFound(target.to_string()))
    }

    fn partitions(&self) -> Result<Vec<Partition>, MetricsError> {
        let disks = Disks::new_with_refreshed_list();

        Ok(disks
            .list()
            .iter()
            .map(|disk| {
                Partition::new(
                    disk.name().to_string_lossy(),
                    disk.mount_point().to_string_lossy(),
                    disk.file_system().to_string_lossy(),
                )
            })
            .collect())
    }
}
