//! Disks command implementation
//!
//! Lists detected partitions and the targets the disk sampler would watch.

use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, DiskReport, PartitionEntry};
use crate::commands::load_config;
use crate::domain::{DiskTarget, Partition, Platform};
use crate::error::Result;
use crate::metrics::{MetricsProvider, SysinfoProvider};
use crate::services::disk_resolver;

/// Execute the disks command
pub fn run_disks(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let (config, _) = load_config(config_path, None)?;
    let report = disk_report(
        &SysinfoProvider::new(),
        Platform::current(),
        &config.monitor.disk.targets,
    )?;

    print_output(&report, format)?;
    Ok(())
}

/// Resolve targets against the provider's partitions and read their usage
pub(crate) fn disk_report(
    provider: &dyn MetricsProvider,
    platform: Platform,
    configured: &[String],
) -> Result<DiskReport> {
    let partitions = provider.partitions()?;
    let resolution = disk_resolver::resolve(platform, &partitions, configured);

    let entries = partitions
        .into_iter()
        .map(|partition| {
            let target = mount_target(platform, &partition);
            let monitored = target
                .as_ref()
                .is_some_and(|t| resolution.targets.contains(t));
            let usage = target.and_then(|t| match provider.disk_usage(&t) {
                Ok(usage) => Some(usage),
                Err(e) => {
                    log::debug!("No usage for {}: {}", t, e);
                    None
                }
            });

            PartitionEntry {
                partition,
                monitored,
                usage,
            }
        })
        .collect();

    Ok(DiskReport {
        platform: platform.to_string(),
        partitions: entries,
        resolution,
    })
}

fn mount_target(platform: Platform, partition: &Partition) -> Option<DiskTarget> {
    match platform {
        Platform::Posix => Some(DiskTarget::from_normalized(partition.mount_point.clone())),
        Platform::Windows => DiskTarget::parse(
            platform,
            partition.mount_point.trim_end_matches(['\\', '/']),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiskUsage;
    use crate::mock::MockProvider;
    use crate::services::Selection;

    #[test]
    fn test_disk_report_marks_monitored_partitions() {
        let mock = MockProvider::new();
        mock.set_partitions(vec![
            Partition::new("/dev/sda1", "/", "ext4"),
            Partition::new("tmpfs", "/run", "tmpfs"),
            Partition::new("/dev/sdb1", "/data", "xfs"),
        ]);
        mock.set_disk("/", DiskUsage::from_totals(100, 50));

        let report = disk_report(&mock, Platform::Posix, &["/data".to_string()]).unwrap();

        assert_eq!(report.resolution.selection, Selection::Configured);
        let monitored: Vec<&str> = report
            .partitions
            .iter()
            .filter(|p| p.monitored)
            .map(|p| p.partition.mount_point.as_str())
            .collect();
        assert_eq!(monitored, vec!["/data"]);
        assert!(report.partitions[0].usage.is_some());
        assert!(report.partitions[2].usage.is_none());
    }

    #[test]
    fn test_disk_report_windows_drives() {
        let mock = MockProvider::new();
        mock.set_partitions(vec![
            Partition::new("", "C:\\", "NTFS"),
            Partition::new("", "A:\\", "FAT32"),
        ]);

        let report = disk_report(&mock, Platform::Windows, &[]).unwrap();

        assert_eq!(report.resolution.selection, Selection::AllDetected);
        assert!(report.partitions[0].monitored);
        assert!(!report.partitions[1].monitored);
    }
}
