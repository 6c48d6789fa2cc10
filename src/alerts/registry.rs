//! Construction of the enabled channel list

use super::dingtalk::DingTalkSender;
use super::email::EmailSender;
use super::sender::AlertSender;
use crate::config::AlertConfig;

use std::sync::Arc;

/// Build every known channel and keep the enabled ones
///
/// A channel whose client cannot be created is logged and left out.
pub fn build_enabled_senders(config: &AlertConfig) -> Vec<Arc<dyn AlertSender>> {
    let mut candidates: Vec<Arc<dyn AlertSender>> = Vec::new();

    match DingTalkSender::new(config.dingtalk.clone()) {
        Ok(sender) => candidates.push(Arc::new(sender)),
        Err(e) => log::error!("DingTalk channel unavailable: {}", e),
    }
    candidates.push(Arc::new(EmailSender::new(config.email.clone())));

    let enabled: Vec<Arc<dyn AlertSender>> = candidates
        .into_iter()
        .filter(|sender| {
            let enabled = sender.is_enabled();
            if !enabled {
                log::debug!("Alert channel {} disabled (configuration incomplete)", sender.name());
            }
            enabled
        })
        .collect();

    if enabled.is_empty() {
        log::warn!("No alert channels configured, alerts will only be logged");
    } else {
        let names: Vec<&str> = enabled.iter().map(|s| s.name()).collect();
        log::info!("Alert channels enabled: {}", names.join(", "));
    }

    enabled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DingTalkConfig, EmailConfig};

    fn names(senders: &[Arc<dyn AlertSender>]) -> Vec<String> {
        senders.iter().map(|s| s.name().to_string()).collect()
    }

    #[test]
    fn test_nothing_configured() {
        assert!(build_enabled_senders(&AlertConfig::default()).is_empty());
    }

    #[test]
    fn test_only_complete_channels_are_kept() {
        let config = AlertConfig {
            dingtalk: DingTalkConfig {
                token: "token".to_string(),
                secret: "secret".to_string(),
            },
            email: EmailConfig {
                from: "monitor@example.com".to_string(),
                ..EmailConfig::default()
            },
        };

        assert_eq!(names(&build_enabled_senders(&config)), vec!["DingTalk"]);
    }

    #[test]
    fn test_all_channels_in_order() {
        let config = AlertConfig {
            dingtalk: DingTalkConfig {
                token: "token".to_string(),
                secret: "secret".to_string(),
            },
            email: EmailConfig {
                from: "monitor@example.com".to_string(),
                password: String::new(),
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: 587,
                to: vec!["ops@example.com".to_string()],
            },
        };

        assert_eq!(names(&build_enabled_senders(&config)), vec!["DingTalk", "Email"]);
    }
}
