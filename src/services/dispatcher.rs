//! Alert fan-out to notification channels
//!
//! Every (alert, channel) pair is delivered on its own detached thread.
//! Errors and panics inside a channel are trapped on that thread and turned
//! into a [`DeliveryOutcome`]; nothing reaches the sampler that raised the
//! alert or the other channels.

use crate::alerts::AlertSender;
use crate::domain::AlertEvent;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Result of delivering one alert through one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { channel: String },
    /// The channel returned an error
    Failed { channel: String, error: String },
    /// The channel panicked
    Faulted { channel: String, error: String },
}

impl DeliveryOutcome {
    pub fn channel(&self) -> &str {
        match self {
            Self::Delivered { channel }
            | Self::Failed { channel, .. }
            | Self::Faulted { channel, .. } => channel,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered { channel } => write!(f, "{}: delivered", channel),
            Self::Failed { channel, error } => write!(f, "{}: failed ({})", channel, error),
            Self::Faulted { channel, error } => write!(f, "{}: faulted ({})", channel, error),
        }
    }
}

/// Handles for the deliveries started by one dispatch
///
/// Dropping it detaches the deliveries; [`Dispatch::wait`] joins them.
#[must_use = "drop the dispatch to detach deliveries, or wait() to collect outcomes"]
pub struct Dispatch {
    deliveries: Vec<(String, JoinHandle<DeliveryOutcome>)>,
}

impl Dispatch {
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Block until every delivery finished and collect the outcomes
    pub fn wait(self) -> Vec<DeliveryOutcome> {
        self.deliveries
            .into_iter()
            .map(|(channel, handle)| {
                handle.join().unwrap_or_else(|panic| DeliveryOutcome::Faulted {
                    channel,
                    error: panic_message(panic.as_ref()),
                })
            })
            .collect()
    }
}

/// Fans alerts out to a fixed list of enabled channels
#[derive(Clone)]
pub struct AlertDispatcher {
    channels: Arc<[Arc<dyn AlertSender>]>,
}

impl AlertDispatcher {
    /// Create a dispatcher over an immutable channel list
    pub fn new(channels: Vec<Arc<dyn AlertSender>>) -> Self {
        Self {
            channels: channels.into(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Names of the channels, in dispatch order
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }

    /// Start delivering `event` through every channel concurrently
    pub fn dispatch(&self, event: &AlertEvent) -> Dispatch {
        if self.channels.is_empty() {
            log::warn!(
                "No alert channels enabled, dropping {}: {}",
                event.title,
                event.content.replace('\n', " ")
            );
            return Dispatch {
                deliveries: Vec::new(),
            };
        }

        let event = Arc::new(event.clone());
        let mut deliveries = Vec::with_capacity(self.channels.len());

        for channel in self.channels.iter() {
            let name = channel.name().to_string();
            let channel = Arc::clone(channel);
            let event = Arc::clone(&event);

            let spawned = thread::Builder::new()
                .name(format!("alert-{}", name.to_lowercase()))
                .spawn(move || deliver(channel.as_ref(), &event));

            match spawned {
                Ok(handle) => deliveries.push((name, handle)),
                Err(e) => log::error!("Alert [{}] could not start delivery: {}", name, e),
            }
        }

        Dispatch { deliveries }
    }
}

/// Send through one channel, trapping both errors and panics
fn deliver(channel: &dyn AlertSender, event: &AlertEvent) -> DeliveryOutcome {
    let channel_name = channel.name().to_string();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        channel.send_alert(&event.title, &event.server_name, &event.content)
    }));

    match result {
        Ok(Ok(())) => {
            log::info!("Alert [{}] sent: {}", channel_name, event.title);
            DeliveryOutcome::Delivered {
                channel: channel_name,
            }
        }
        Ok(Err(e)) => {
            log::error!("Alert [{}] failed: {}", channel_name, e);
            DeliveryOutcome::Failed {
                channel: channel_name,
                error: e.to_string(),
            }
        }
        Err(panic) => {
            let error = panic_message(panic.as_ref());
            log::error!("Alert [{}] panicked: {}", channel_name, error);
            DeliveryOutcome::Faulted {
                channel: channel_name,
                error,
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceKind;
    use crate::mock::MockChannel;

    fn event() -> AlertEvent {
        AlertEvent::new(ResourceKind::Cpu, "web-01", "CPU usage above threshold!")
    }

    #[test]
    fn test_failures_are_isolated_per_channel() {
        let ok = Arc::new(MockChannel::ok("ok"));
        let failing = Arc::new(MockChannel::failing("failing"));
        let faulting = Arc::new(MockChannel::panicking("faulting"));

        let dispatcher = AlertDispatcher::new(vec![ok.clone(), failing.clone(), faulting.clone()]);
        let outcomes = dispatcher.dispatch(&event()).wait();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(ok.call_count(), 1);
        assert_eq!(failing.call_count(), 1);
        assert_eq!(faulting.call_count(), 1);

        let find = |name: &str| outcomes.iter().find(|o| o.channel() == name).unwrap().clone();
        assert!(find("ok").is_delivered());
        assert!(matches!(find("failing"), DeliveryOutcome::Failed { .. }));
        match find("faulting") {
            DeliveryOutcome::Faulted { error, .. } => assert!(error.contains("faulting")),
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_channel_receives_event_fields() {
        let ok = Arc::new(MockChannel::ok("ok"));
        let dispatcher = AlertDispatcher::new(vec![ok.clone()]);

        let _ = dispatcher.dispatch(&event()).wait();

        let sent = ok.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "CPU Alert");
        assert_eq!(sent[0].server_name, "web-01");
        assert_eq!(sent[0].content, "CPU usage above threshold!");
    }

    #[test]
    fn test_empty_channel_list_is_noop() {
        let dispatcher = AlertDispatcher::new(vec![]);
        let dispatch = dispatcher.dispatch(&event());
        assert!(dispatch.is_empty());
        assert!(dispatch.wait().is_empty());
    }

    #[test]
    fn test_channel_names_in_order() {
        let dispatcher = AlertDispatcher::new(vec![
            Arc::new(MockChannel::ok("DingTalk")),
            Arc::new(MockChannel::ok("Email")),
        ]);
        assert_eq!(dispatcher.channel_count(), 2);
        assert_eq!(dispatcher.channel_names(), vec!["DingTalk", "Email"]);
    }
}
