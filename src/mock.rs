//! Mock implementations for testing
//!
//! Provides a scripted metrics provider, a recording alert channel and a
//! manually advanced clock so samplers can be tested without a real host.

use crate::alerts::AlertSender;
use crate::domain::{CpuSample, DiskTarget, DiskUsage, MemorySample, Partition};
use crate::error::{MetricsError, NotifyError};
use crate::metrics::MetricsProvider;
use crate::services::{CancellationToken, Clock, Wake};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

const GB: u64 = 1024 * 1024 * 1024;

/// Scripted metrics provider
///
/// Readings are set by the test; every query is counted.
#[derive(Debug)]
pub struct MockProvider {
    cpu: RwLock<CpuSample>,
    memory: RwLock<MemorySample>,
    partitions: RwLock<Vec<Partition>>,
    disks: RwLock<HashMap<String, Option<DiskUsage>>>,
    cpu_fails: AtomicBool,
    memory_fails: AtomicBool,
    cpu_calls: AtomicUsize,
    memory_calls: AtomicUsize,
    disk_calls: AtomicUsize,
}

impl MockProvider {
    /// Idle host: 5% CPU, 8GB of 16GB available, no partitions
    pub fn new() -> Self {
        Self {
            cpu: RwLock::new(CpuSample::new(5.0)),
            memory: RwLock::new(MemorySample::new(16 * GB, 8 * GB, 50.0)),
            partitions: RwLock::new(Vec::new()),
            disks: RwLock::new(HashMap::new()),
            cpu_fails: AtomicBool::new(false),
            memory_fails: AtomicBool::new(false),
            cpu_calls: AtomicUsize::new(0),
            memory_calls: AtomicUsize::new(0),
            disk_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_cpu(&self, sample: CpuSample) {
        *self.cpu.write().unwrap() = sample;
    }

    pub fn set_memory(&self, sample: MemorySample) {
        *self.memory.write().unwrap() = sample;
    }

    pub fn set_partitions(&self, partitions: Vec<Partition>) {
        *self.partitions.write().unwrap() = partitions;
    }

    /// Set the usage reported for one mount point
    pub fn set_disk(&self, target: &str, usage: DiskUsage) {
        self.disks
            .write()
            .unwrap()
            .insert(target.to_string(), Some(usage));
    }

    /// Make queries for one mount point fail
    pub fn fail_disk(&self, target: &str) {
        self.disks.write().unwrap().insert(target.to_string(), None);
    }

    pub fn fail_cpu(&self, fail: bool) {
        self.cpu_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_memory(&self, fail: bool) {
        self.memory_fails.store(fail, Ordering::SeqCst);
    }

    pub fn cpu_calls(&self) -> usize {
        self.cpu_calls.load(Ordering::SeqCst)
    }

    pub fn memory_calls(&self) -> usize {
        self.memory_calls.load(Ordering::SeqCst)
    }

    pub fn disk_calls(&self) -> usize {
        self.disk_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for MockProvider {
    fn cpu_usage(&self) -> Result<CpuSample, MetricsError> {
        self.cpu_calls.fetch_add(1, Ordering::SeqCst);
        if self.cpu_fails.load(Ordering::SeqCst) {
            return Err(MetricsError::Unavailable("mock cpu failure".to_string()));
        }
        Ok(*self.cpu.read().unwrap())
    }

    fn memory(&self) -> Result<MemorySample, MetricsError> {
        self.memory_calls.fetch_add(1, Ordering::SeqCst);
        if self.memory_fails.load(Ordering::SeqCst) {
            return Err(MetricsError::Unavailable("mock memory failure".to_string()));
        }
        Ok(*self.memory.read().unwrap())
    }

    fn disk_usage(&self, target: &DiskTarget) -> Result<DiskUsage, MetricsError> {
        self.disk_calls.fetch_add(1, Ordering::SeqCst);
        match self.disks.read().unwrap().get(target.as_str()) {
            Some(Some(usage)) => Ok(*usage),
            Some(None) => Err(MetricsError::Unavailable(format!(
                "mock disk failure on {}",
                target
            ))),
            None => Err(MetricsError::TargetNotFound(target.to_string())),
        }
    }

    fn partitions(&self) -> Result<Vec<Partition>, MetricsError> {
        Ok(self.partitions.read().unwrap().clone())
    }
}

/// How a [`MockChannel`] reacts to a send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBehavior {
    Succeed,
    Fail,
    Panic,
}

/// One alert recorded by a [`MockChannel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub title: String,
    pub server_name: String,
    pub content: String,
}

/// Recording alert channel
#[derive(Debug)]
pub struct MockChannel {
    name: String,
    behavior: ChannelBehavior,
    calls: AtomicUsize,
    sent: Mutex<Vec<SentAlert>>,
}

impl MockChannel {
    pub fn new(name: impl Into<String>, behavior: ChannelBehavior) -> Self {
        Self {
            name: name.into(),
            behavior,
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(name: impl Into<String>) -> Self {
        Self::new(name, ChannelBehavior::Succeed)
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, ChannelBehavior::Fail)
    }

    pub fn panicking(name: impl Into<String>) -> Self {
        Self::new(name, ChannelBehavior::Panic)
    }

    /// Number of send attempts, successful or not
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of alerts delivered
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().unwrap().clone()
    }
}

impl AlertSender for MockChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn send_alert(&self, title: &str, server_name: &str, content: &str) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            ChannelBehavior::Succeed => {
                self.sent.lock().unwrap().push(SentAlert {
                    title: title.to_string(),
                    server_name: server_name.to_string(),
                    content: content.to_string(),
                });
                Ok(())
            }
            ChannelBehavior::Fail => Err(NotifyError::Http(format!(
                "mock channel {} refused",
                self.name
            ))),
            ChannelBehavior::Panic => panic!("mock channel {} panicked", self.name),
        }
    }
}

/// Clock that only moves when the test advances it
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    moved: Condvar,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and wake every waiter
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
        self.moved.notify_all();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn wait_until(&self, deadline: Duration, cancel: &CancellationToken) -> Wake {
        let mut now = self.now.lock().unwrap();
        loop {
            // Cancellation is polled since it lives on a different condvar
            if cancel.is_cancelled() {
                return Wake::Cancelled;
            }
            if *now >= deadline {
                return Wake::Tick;
            }
            now = self
                .moved
                .wait_timeout(now, Duration::from_millis(5))
                .unwrap()
                .0;
        }
    }
}

/// Poll `condition` until it holds or two seconds pass
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_counts_calls() {
        let provider = MockProvider::new();
        provider.set_cpu(CpuSample::new(42.0));

        assert_eq!(provider.cpu_usage().unwrap().usage_percent, 42.0);
        assert_eq!(provider.cpu_calls(), 1);

        provider.fail_cpu(true);
        assert!(provider.cpu_usage().is_err());
        assert_eq!(provider.cpu_calls(), 2);
    }

    #[test]
    fn test_mock_provider_disk_targets() {
        let provider = MockProvider::new();
        provider.set_disk("/", DiskUsage::from_totals(100, 40));
        provider.fail_disk("/data");

        let root = DiskTarget::from_normalized("/");
        assert_eq!(provider.disk_usage(&root).unwrap().used_percent, 60.0);
        assert!(matches!(
            provider.disk_usage(&DiskTarget::from_normalized("/data")),
            Err(MetricsError::Unavailable(_))
        ));
        assert!(matches!(
            provider.disk_usage(&DiskTarget::from_normalized("/srv")),
            Err(MetricsError::TargetNotFound(_))
        ));
        assert_eq!(provider.disk_calls(), 3);
    }

    #[test]
    fn test_manual_clock_wakes_on_advance() {
        let clock = std::sync::Arc::new(ManualClock::new());
        let cancel = CancellationToken::new();

        let waiter = {
            let clock = clock.clone();
            thread::spawn(move || clock.wait_until(Duration::from_secs(10), &cancel))
        };
        clock.advance(Duration::from_secs(10));

        assert_eq!(waiter.join().unwrap(), Wake::Tick);
    }
}
