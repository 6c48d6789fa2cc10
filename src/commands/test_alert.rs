//! Test-alert command implementation
//!
//! Sends one alert through every enabled channel and reports the outcome.

use crate::alerts::{build_enabled_senders, AlertSender};
use crate::cli::args::OutputFormat;
use crate::cli::output::{print_output, AlertTestReport};
use crate::commands::load_config;
use crate::domain::{AlertEvent, ResourceKind};
use crate::error::{AppError, NotifyError, Result};
use crate::services::AlertDispatcher;

use std::sync::Arc;

/// Execute the test-alert command
pub fn run_test_alert(format: OutputFormat, config_path: Option<&str>) -> Result<()> {
    let (config, _) = load_config(config_path, None)?;
    let senders = build_enabled_senders(&config.alert);
    if senders.is_empty() {
        return Err(AppError::Notify(NotifyError::Disabled(
            "every alert".to_string(),
        )));
    }

    let report = send_test_alert(senders, &config.monitor.server_name);
    print_output(&report, format)?;

    match delivery_error(&report) {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Error naming every channel that failed, if any did
fn delivery_error(report: &AlertTestReport) -> Option<NotifyError> {
    let failed: Vec<String> = report
        .results
        .iter()
        .filter(|r| !r.delivered)
        .map(|r| r.channel.clone())
        .collect();

    if failed.is_empty() {
        None
    } else {
        Some(NotifyError::Undelivered(failed))
    }
}

/// Dispatch a test alert and wait for every channel
pub(crate) fn send_test_alert(senders: Vec<Arc<dyn AlertSender>>, server_name: &str) -> AlertTestReport {
    let event = AlertEvent::new(
        ResourceKind::Cpu,
        server_name,
        "This is a test alert from sysmon.\nNo action is required.",
    )
    .with_title("Test Alert");

    let results = AlertDispatcher::new(senders)
        .dispatch(&event)
        .wait()
        .into_iter()
        .map(Into::into)
        .collect();

    AlertTestReport {
        server_name: server_name.to_string(),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChannel;

    #[test]
    fn test_send_test_alert_reports_each_channel() {
        let ok = Arc::new(MockChannel::ok("DingTalk"));
        let failing = Arc::new(MockChannel::failing("Email"));

        let report = send_test_alert(vec![ok.clone(), failing], "web-01");

        assert_eq!(report.results.len(), 2);
        assert!(!report.all_delivered());
        assert_eq!(ok.sent()[0].title, "Test Alert");
        assert_eq!(ok.sent()[0].server_name, "web-01");
        let email = report.results.iter().find(|r| r.channel == "Email").unwrap();
        assert!(email.error.is_some());
    }

    #[test]
    fn test_delivery_error_names_failed_channels() {
        let report = send_test_alert(
            vec![
                Arc::new(MockChannel::ok("DingTalk")),
                Arc::new(MockChannel::failing("Email")),
            ],
            "web-01",
        );

        match delivery_error(&report) {
            Some(NotifyError::Undelivered(channels)) => assert_eq!(channels, vec!["Email"]),
            other => panic!("expected undelivered error, got {other:?}"),
        }
    }

    #[test]
    fn test_delivery_error_none_when_all_delivered() {
        let report = send_test_alert(vec![Arc::new(MockChannel::ok("DingTalk"))], "web-01");
        assert!(delivery_error(&report).is_none());
    }
}
