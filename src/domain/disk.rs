//! Disk target identifiers and platform path rules

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path convention of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Linux, macOS, BSD: mount points under `/`
    Posix,
    /// Drive letters such as `C:\`
    Windows,
}

impl Platform {
    /// Platform of the running host
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Path separator used for normalized targets
    pub fn separator(&self) -> char {
        match self {
            Self::Posix => '/',
            Self::Windows => '\\',
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => write!(f, "POSIX"),
            Self::Windows => write!(f, "Windows"),
        }
    }
}

/// Display name of the host operating system
pub fn os_name() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => "macOS",
        other => other,
    }
}

/// A normalized mount point or volume identifier
///
/// Two targets are equal when their normalized strings are equal, so
/// `/data/`, `/data` and `/data/./` all denote the same target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiskTarget(String);

impl DiskTarget {
    /// Normalize a raw identifier for the given platform
    ///
    /// Returns `None` for blank input.
    pub fn parse(platform: Platform, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(clean_path(platform, trimmed)))
    }

    /// Wrap a string that is already normalized
    pub fn from_normalized(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiskTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DiskTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a leading `X:` drive prefix, upper-casing the letter
fn split_drive(path: &str) -> (Option<String>, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        let drive = format!("{}:", (bytes[0] as char).to_ascii_uppercase());
        (Some(drive), &path[2..])
    } else {
        (None, path)
    }
}

/// Lexically clean a path: collapse separators, resolve `.` and `..`, drop
/// the trailing separator except at a root. On Windows a bare drive `X:`
/// becomes `X:\`.
pub fn clean_path(platform: Platform, path: &str) -> String {
    let sep = platform.separator();
    let owned;
    let (drive, rest) = match platform {
        Platform::Posix => (None, path),
        Platform::Windows => {
            owned = path.replace('/', "\\");
            split_drive(&owned)
        }
    };

    let rooted = rest.starts_with(sep);
    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split(sep) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join(&sep.to_string());
    match (drive, rooted) {
        // A drive always denotes its root
        (Some(drive), _) if body.is_empty() => format!("{}{}", drive, sep),
        (Some(drive), true) => format!("{}{}{}", drive, sep, body),
        (Some(drive), false) => format!("{}{}", drive, body),
        (None, true) => format!("{}{}", sep, body),
        (None, false) if body.is_empty() => ".".to_string(),
        (None, false) => body,
    }
}
