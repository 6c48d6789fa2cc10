//! Alert events handed to the dispatcher

use super::resource::ResourceKind;
use serde::Serialize;

/// A triggered alert, delivered once to every enabled channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    /// Resource that violated its threshold
    pub kind: ResourceKind,
    /// Short title (e.g. "CPU Alert")
    pub title: String,
    /// Server display identifier from the configuration
    pub server_name: String,
    /// Human-readable description with observed values and threshold
    pub content: String,
}

impl AlertEvent {
    /// Create an alert using the kind's standard title
    pub fn new(kind: ResourceKind, server_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: kind.alert_title().to_string(),
            server_name: server_name.into(),
            content: content.into(),
        }
    }

    /// Override the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
