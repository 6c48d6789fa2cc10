//! Alert notification channels
//!
//! Provides the channel trait, the DingTalk and e-mail channels, and the
//! construction of the enabled channel list from configuration.

pub mod dingtalk;
pub mod email;
mod registry;
mod sender;

pub use dingtalk::DingTalkSender;
pub use email::EmailSender;
pub use registry::build_enabled_senders;
pub use sender::{alert_subject, AlertSender};
