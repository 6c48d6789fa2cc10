//! Notification channel trait

use crate::error::NotifyError;

/// A channel that delivers rendered alerts
///
/// Senders are shared by every delivery thread, so `send_alert` takes
/// `&self` and must be callable concurrently.
pub trait AlertSender: Send + Sync {
    /// Channel name for identification in logs
    fn name(&self) -> &str;

    /// Whether the channel's configuration is complete
    fn is_enabled(&self) -> bool;

    /// Deliver one alert
    fn send_alert(&self, title: &str, server_name: &str, content: &str) -> Result<(), NotifyError>;
}

/// Subject line shared by every channel
pub fn alert_subject(title: &str, server_name: &str) -> String {
    format!("[{}] {}", server_name, title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_subject() {
        assert_eq!(alert_subject("CPU Alert", "web-01"), "[web-01] CPU Alert");
    }
}
