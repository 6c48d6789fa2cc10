//! Disk target resolution
//!
//! Turns the OS partition list and the configured target list into the
//! ordered set of targets the disk sampler checks on every tick.

use crate::domain::{DiskTarget, Partition, Platform};
use serde::Serialize;
use std::collections::HashSet;

/// Filesystem kinds that never back a real disk on POSIX hosts
const EXCLUDED_FS_TYPES: &[&str] = &[
    "sysfs",
    "proc",
    "tmpfs",
    "devtmpfs",
    "devpts",
    "cgroup",
    "overlay",
    "aufs",
    "squashfs",
    "rpc_pipefs",
    "binfmt_misc",
];

/// Network filesystem markers, matched as substrings of the kind
const NETWORK_FS_MARKERS: &[&str] = &["nfs", "smb"];

/// Fixed-drive filesystem kinds on Windows
const WINDOWS_FS_TYPES: &[&str] = &["NTFS", "FAT32", "exFAT"];

/// Drive letters reserved for floppy drives
const FLOPPY_DRIVES: &[char] = &['A', 'B'];

/// How the final target list was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Configured targets intersected with the detected ones
    Configured,
    /// No targets configured, every detected target is monitored
    AllDetected,
    /// Every configured target was invalid, every detected target is monitored
    FallbackAll,
    /// The host has no monitorable partitions
    NoneDetected,
}

/// Result of resolving disk targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Targets to monitor, in evaluation order
    pub targets: Vec<DiskTarget>,
    /// Configured targets that did not match a detected partition
    pub invalid: Vec<DiskTarget>,
    pub selection: Selection,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Push into `list` unless already present, preserving first-seen order
fn push_unique(list: &mut Vec<DiskTarget>, seen: &mut HashSet<DiskTarget>, target: DiskTarget) {
    if seen.insert(target.clone()) {
        list.push(target);
    }
}

fn is_monitorable_posix(partition: &Partition) -> bool {
    let fs_type = partition.fs_type.as_str();
    !EXCLUDED_FS_TYPES.contains(&fs_type)
        && !partition.mount_point.contains("/tmp")
        && !NETWORK_FS_MARKERS.iter().any(|m| fs_type.contains(m))
}

fn windows_drive(partition: &Partition) -> Option<DiskTarget> {
    if !WINDOWS_FS_TYPES.contains(&partition.fs_type.as_str()) {
        return None;
    }

    let mount = partition.mount_point.trim_end_matches(['\\', '/']);
    let mut chars = mount.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(letter), Some(':'), None)
            if letter.is_ascii_uppercase() && !FLOPPY_DRIVES.contains(&letter) =>
        {
            DiskTarget::parse(Platform::Windows, mount)
        }
        _ => None,
    }
}

/// Platform-filtered, deduplicated targets detected on the host
pub fn valid_targets(platform: Platform, partitions: &[Partition]) -> Vec<DiskTarget> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();

    for partition in partitions {
        let target = match platform {
            Platform::Posix if is_monitorable_posix(partition) => {
                Some(DiskTarget::from_normalized(partition.mount_point.clone()))
            }
            Platform::Posix => None,
            Platform::Windows => windows_drive(partition),
        };

        if let Some(target) = target {
            push_unique(&mut targets, &mut seen, target);
        }
    }

    targets
}

/// Normalize configured targets, dropping blanks and duplicates
pub fn normalize_configured(platform: Platform, configured: &[String]) -> Vec<DiskTarget> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();

    for raw in configured {
        if let Some(target) = DiskTarget::parse(platform, raw) {
            push_unique(&mut targets, &mut seen, target);
        }
    }

    targets
}

/// Resolve the monitoring target set
///
/// Precedence: valid configured targets, then every detected target (when
/// nothing or nothing valid is configured), then empty (only when the host
/// itself has no monitorable partitions).
pub fn resolve(platform: Platform, partitions: &[Partition], configured: &[String]) -> Resolution {
    let valid = valid_targets(platform, partitions);
    if valid.is_empty() {
        log::warn!("No monitorable disk partitions detected, disk monitoring disabled");
        return Resolution {
            targets: Vec::new(),
            invalid: Vec::new(),
            selection: Selection::NoneDetected,
        };
    }

    let wanted = normalize_configured(platform, configured);
    if wanted.is_empty() {
        log::info!("No disk targets configured, monitoring all detected: {:?}", valid);
        return Resolution {
            targets: valid,
            invalid: Vec::new(),
            selection: Selection::AllDetected,
        };
    }

    let valid_set: HashSet<&DiskTarget> = valid.iter().collect();
    let (targets, invalid): (Vec<DiskTarget>, Vec<DiskTarget>) =
        wanted.into_iter().partition(|t| valid_set.contains(t));

    if targets.is_empty() {
        log::warn!(
            "None of the configured disk targets {:?} exist, monitoring all detected: {:?}",
            invalid,
            valid
        );
        return Resolution {
            targets: valid,
            invalid,
            selection: Selection::FallbackAll,
        };
    }

    if !invalid.is_empty() {
        log::warn!(
            "Ignoring invalid disk targets {:?}, monitoring: {:?}",
            invalid,
            targets
        );
    }

    Resolution {
        targets,
        invalid,
        selection: Selection::Configured,
    }
}
