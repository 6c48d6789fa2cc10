//! SMTP e-mail channel

use super::sender::{alert_subject, AlertSender};
use crate::config::EmailConfig;
use crate::error::NotifyError;

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{SmtpTransport, Transport};
use std::time::Duration;
use tera::{Context, Tera};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

const BODY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{{ subject }}</title>
</head>
<body>
    <div style="font-family: Arial, sans-serif; font-size: 14px; line-height: 1.6;">
        <p>{% for line in lines %}{{ line }}{% if not loop.last %}<br>{% endif %}{% endfor %}</p>
        <p>Alert time: {{ sent_at }}</p>
    </div>
</body>
</html>
"#;

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte
    ImplicitTls,
    /// STARTTLS required before authenticating
    StartTls,
    /// STARTTLS when the server offers it
    Opportunistic,
}

impl SmtpSecurity {
    /// 465 uses implicit TLS, 587 STARTTLS, anything else opportunistic STARTTLS
    pub fn for_port(port: u16) -> Self {
        match port {
            465 => Self::ImplicitTls,
            587 => Self::StartTls,
            _ => Self::Opportunistic,
        }
    }
}

/// E-mail alert channel
pub struct EmailSender {
    config: EmailConfig,
}

impl EmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build the message for one alert
    pub fn build_message(
        &self,
        title: &str,
        server_name: &str,
        content: &str,
        sent_at: &str,
    ) -> Result<Message, NotifyError> {
        let subject = alert_subject(title, server_name);
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.from)?)
            .subject(subject.clone())
            .header(ContentType::TEXT_HTML);

        for to in &self.config.to {
            builder = builder.to(parse_mailbox(to)?);
        }

        builder
            .body(render_html(&subject, content, sent_at)?)
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    /// SMTP transport for the configured port, see [`SmtpSecurity::for_port`]
    fn transport(&self) -> Result<SmtpTransport, NotifyError> {
        let host = self.config.smtp_host.as_str();
        let builder = match SmtpSecurity::for_port(self.config.smtp_port) {
            SmtpSecurity::ImplicitTls => SmtpTransport::relay(host)?,
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(host)?,
            SmtpSecurity::Opportunistic => SmtpTransport::builder_dangerous(host)
                .tls(Tls::Opportunistic(TlsParameters::new(host.to_string())?)),
        }
        .port(self.config.smtp_port)
        .timeout(Some(SMTP_TIMEOUT));

        let builder = if self.config.password.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                self.config.from.clone(),
                self.config.password.clone(),
            ))
        };

        Ok(builder.build())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse()
        .map_err(|_| NotifyError::InvalidAddress(address.to_string()))
}

/// HTML body with autoescaped content; each line of `content` becomes a line break
pub fn render_html(subject: &str, content: &str, sent_at: &str) -> Result<String, NotifyError> {
    let mut context = Context::new();
    context.insert("subject", subject);
    context.insert("lines", &content.lines().collect::<Vec<_>>());
    context.insert("sent_at", sent_at);

    Tera::one_off(BODY_TEMPLATE, &context, true)
        .map_err(|e| NotifyError::Build(format!("cannot render e-mail body: {}", e)))
}

impl AlertSender for EmailSender {
    fn name(&self) -> &str {
        "Email"
    }

    fn is_enabled(&self) -> bool {
        !self.config.from.is_empty()
            && !self.config.smtp_host.is_empty()
            && self.config.smtp_port != 0
            && !self.config.to.is_empty()
    }

    fn send_alert(&self, title: &str, server_name: &str, content: &str) -> Result<(), NotifyError> {
        if !self.is_enabled() {
            return Err(NotifyError::Disabled(self.name().to_string()));
        }

        let sent_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let message = self.build_message(title, server_name, content, &sent_at)?;
        self.transport()?.send(&message)?;

        log::debug!(
            "Email alert '{}' sent to {} recipient(s)",
            title,
            self.config.to.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            from: "monitor@example.com".to_string(),
            password: "app-password".to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            to: vec!["ops@example.com".to_string(), "dev@example.com".to_string()],
        }
    }

    #[test]
    fn test_enabled_requires_complete_config() {
        assert!(EmailSender::new(config()).is_enabled());

        let mut missing_to = config();
        missing_to.to.clear();
        assert!(!EmailSender::new(missing_to).is_enabled());

        let mut missing_port = config();
        missing_port.smtp_port = 0;
        let sender = EmailSender::new(missing_port);
        assert!(!sender.is_enabled());
        assert!(matches!(
            sender.send_alert("t", "s", "c"),
            Err(NotifyError::Disabled(_))
        ));
    }

    #[test]
    fn test_build_message_headers() {
        let sender = EmailSender::new(config());
        let message = sender
            .build_message("CPU Alert", "web-01", "CPU usage above threshold!", "2026-01-01 00:00:00")
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: [web-01] CPU Alert"));
        assert!(raw.contains("monitor@example.com"));
        assert!(raw.contains("ops@example.com"));
        assert!(raw.contains("dev@example.com"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_invalid_recipient() {
        let mut cfg = config();
        cfg.to.push("not an address".to_string());
        let sender = EmailSender::new(cfg);

        let result = sender.build_message("CPU Alert", "web-01", "x", "now");
        assert!(matches!(result, Err(NotifyError::InvalidAddress(a)) if a == "not an address"));
    }

    #[test]
    fn test_render_html_escapes_and_breaks_lines() {
        let html = render_html(
            "[web-01] Disk Alert",
            "Disk [data] usage above threshold!\nCurrent <usage> & more",
            "2026-01-01 00:00:00",
        )
        .unwrap();

        assert!(html.contains("Disk [data] usage above threshold!<br>Current &lt;usage&gt; &amp; more"));
        assert!(!html.contains("<usage>"));
        assert!(html.contains("<title>[web-01] Disk Alert</title>"));
        assert!(html.contains("Alert time: 2026-01-01 00:00:00"));
    }

    #[test]
    fn test_render_html_single_line_has_no_break() {
        let html = render_html("[web-01] CPU Alert", "CPU usage above threshold!", "now").unwrap();
        assert!(html.contains("<p>CPU usage above threshold!</p>"));
    }

    #[test]
    fn test_security_for_port() {
        assert_eq!(SmtpSecurity::for_port(465), SmtpSecurity::ImplicitTls);
        assert_eq!(SmtpSecurity::for_port(587), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::for_port(25), SmtpSecurity::Opportunistic);
        assert_eq!(SmtpSecurity::for_port(2525), SmtpSecurity::Opportunistic);
    }

    #[test]
    fn test_transport_builds_for_every_port() {
        for port in [465, 587, 25, 2525] {
            let mut cfg = config();
            cfg.smtp_port = port;
            assert!(EmailSender::new(cfg).transport().is_ok(), "port {port}");
        }
    }
}
