//! DingTalk robot webhook channel
//!
//! Posts text messages to a signed robot webhook. The signature is
//! base64(HMAC-SHA256(secret, "<timestamp_ms>\n<secret>")).

use super::sender::{alert_subject, AlertSender};
use crate::config::DingTalkConfig;
use crate::error::NotifyError;

use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Public robot endpoint
pub const DEFAULT_ENDPOINT: &str = "https://oapi.dingtalk.com/robot/send";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reply body of the robot API
#[derive(Debug, Deserialize)]
struct RobotResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// DingTalk alert channel
pub struct DingTalkSender {
    config: DingTalkConfig,
    endpoint: String,
    client: Client,
}

impl DingTalkSender {
    /// Create a sender for the public endpoint
    pub fn new(config: DingTalkConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Build(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client,
        })
    }

    /// Builder: post to a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Signed webhook URL for the given millisecond timestamp
    pub fn webhook_url(&self, timestamp_ms: i64) -> Result<Url, NotifyError> {
        let timestamp = timestamp_ms.to_string();
        let signature = sign(&self.config.secret, timestamp_ms)?;

        Url::parse_with_params(
            &self.endpoint,
            &[
                ("access_token", self.config.token.as_str()),
                ("timestamp", timestamp.as_str()),
                ("sign", signature.as_str()),
            ],
        )
        .map_err(|e| NotifyError::Build(format!("invalid endpoint '{}': {}", self.endpoint, e)))
    }
}

/// Base64 signature over `"<timestamp_ms>\n<secret>"`
pub fn sign(secret: &str, timestamp_ms: i64) -> Result<String, NotifyError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .map_err(|e| NotifyError::Build(format!("HMAC initialization failed: {}", e)))?;
    mac.update(format!("{}\n{}", timestamp_ms, secret).as_bytes());
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Text message payload
pub fn message_body(title: &str, server_name: &str, content: &str) -> Value {
    json!({
        "msgtype": "text",
        "text": {
            "content": format!("{}\n{}", alert_subject(title, server_name), content),
        },
    })
}

impl AlertSender for DingTalkSender {
    fn name(&self) -> &str {
        "DingTalk"
    }

    fn is_enabled(&self) -> bool {
        !self.config.token.is_empty() && !self.config.secret.is_empty()
    }

    fn send_alert(&self, title: &str, server_name: &str, content: &str) -> Result<(), NotifyError> {
        if !self.is_enabled() {
            return Err(NotifyError::Disabled(self.name().to_string()));
        }

        let url = self.webhook_url(chrono::Utc::now().timestamp_millis())?;
        let response = self
            .client
            .post(url)
            .json(&message_body(title, server_name, content))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Http(format!("unexpected status {}", status)));
        }

        let reply: RobotResponse = response.json()?;
        if reply.errcode != 0 {
            return Err(NotifyError::Rejected {
                code: reply.errcode,
                message: reply.errmsg,
            });
        }

        log::debug!("DingTalk accepted alert '{}'", title);
        Ok(())
    }
}
