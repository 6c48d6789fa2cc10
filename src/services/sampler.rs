//! Periodic resource samplers
//!
//! Each sampler owns one resource kind. The shared loop in [`run_sampler`]
//! waits for a tick, asks the sampler for a reading, and hands every
//! violation to the dispatcher without waiting for delivery.

use crate::domain::{AlertEvent, DiskTarget, Platform, ResourceKind, ResourceSample, Threshold};
use crate::error::MetricsError;
use crate::metrics::MetricsProvider;
use crate::services::cancel::CancellationToken;
use crate::services::clock::{Ticker, Wake};
use crate::services::disk_resolver;
use crate::services::dispatcher::AlertDispatcher;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Observable sampler task state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Created, loop not entered yet
    Idle,
    /// Waiting for the next tick or cancellation
    Waiting,
    /// Querying the provider and evaluating thresholds
    Sampling,
    /// Loop left; terminal
    Exited,
}

impl SamplerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Waiting,
            2 => Self::Sampling,
            _ => Self::Exited,
        }
    }
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Waiting => write!(f, "waiting"),
            Self::Sampling => write!(f, "sampling"),
            Self::Exited => write!(f, "exited"),
        }
    }
}

/// Atomic cell holding a [`SamplerState`], readable from other threads
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SamplerState::Idle as u8))
    }

    pub fn get(&self) -> SamplerState {
        SamplerState::from_u8(self.0.load(Ordering::SeqCst))
    }

    fn set(&self, state: SamplerState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks the sampler exited however the loop ends, including by panic
struct ExitGuard<'a> {
    kind: ResourceKind,
    state: &'a StateCell,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        self.state.set(SamplerState::Exited);
        log::info!("{} sampler stopped", self.kind);
    }
}

/// One resource kind's measurement and threshold policy
pub trait Sampler: Send {
    fn kind(&self) -> ResourceKind;

    fn interval(&self) -> Duration;

    /// Runs once on the sampler's own thread before the first tick
    ///
    /// Returning `false` ends the task without sampling.
    fn prepare(&mut self) -> bool {
        true
    }

    /// Take readings and return one alert per violation
    fn sample(&mut self) -> Result<Vec<AlertEvent>, MetricsError>;
}

/// Evaluate a reading, logging its status line
fn evaluate(sample: &ResourceSample, threshold: Threshold, server_name: &str) -> Option<AlertEvent> {
    log::info!("{}", sample.status_line(threshold));

    if threshold.is_violated(sample.reading()) {
        Some(AlertEvent::new(
            sample.kind(),
            server_name,
            sample.alert_content(threshold),
        ))
    } else {
        None
    }
}

/// Global CPU usage sampler; alerts when usage rises above the threshold
pub struct CpuSampler {
    provider: Arc<dyn MetricsProvider>,
    server_name: String,
    interval: Duration,
    threshold: Threshold,
}

impl CpuSampler {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        server_name: impl Into<String>,
        interval: Duration,
        threshold_percent: f64,
    ) -> Self {
        Self {
            provider,
            server_name: server_name.into(),
            interval,
            threshold: Threshold::Above(threshold_percent),
        }
    }
}

impl Sampler for CpuSampler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Cpu
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn sample(&mut self) -> Result<Vec<AlertEvent>, MetricsError> {
        let sample = ResourceSample::Cpu(self.provider.cpu_usage()?);
        Ok(evaluate(&sample, self.threshold, &self.server_name)
            .into_iter()
            .collect())
    }
}

/// Memory sampler; alerts when available memory falls below the threshold
pub struct MemorySampler {
    provider: Arc<dyn MetricsProvider>,
    server_name: String,
    interval: Duration,
    threshold: Threshold,
}

impl MemorySampler {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        server_name: impl Into<String>,
        interval: Duration,
        available_threshold_gb: f64,
    ) -> Self {
        Self {
            provider,
            server_name: server_name.into(),
            interval,
            threshold: Threshold::Below(available_threshold_gb),
        }
    }
}

impl Sampler for MemorySampler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Memory
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn sample(&mut self) -> Result<Vec<AlertEvent>, MetricsError> {
        let sample = ResourceSample::Memory(self.provider.memory()?);
        Ok(evaluate(&sample, self.threshold, &self.server_name)
            .into_iter()
            .collect())
    }
}

/// Disk usage sampler; checks every resolved target on each tick
pub struct DiskSampler {
    provider: Arc<dyn MetricsProvider>,
    server_name: String,
    interval: Duration,
    threshold: Threshold,
    platform: Platform,
    configured: Vec<String>,
    targets: Vec<DiskTarget>,
}

impl DiskSampler {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        server_name: impl Into<String>,
        interval: Duration,
        usage_threshold_percent: f64,
        configured: Vec<String>,
    ) -> Self {
        Self {
            provider,
            server_name: server_name.into(),
            interval,
            threshold: Threshold::Above(usage_threshold_percent),
            platform: Platform::current(),
            configured,
            targets: Vec::new(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Targets resolved by [`Sampler::prepare`]
    pub fn targets(&self) -> &[DiskTarget] {
        &self.targets
    }
}

impl Sampler for DiskSampler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Disk
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn prepare(&mut self) -> bool {
        let partitions = match self.provider.partitions() {
            Ok(partitions) => partitions,
            Err(e) => {
                log::warn!("Failed to list disk partitions: {}", e);
                Vec::new()
            }
        };

        let resolution = disk_resolver::resolve(self.platform, &partitions, &self.configured);
        self.targets = resolution.targets;

        if self.targets.is_empty() {
            log::warn!("No disk targets to monitor, disk sampler exiting");
            return false;
        }

        log::info!("Monitoring disk targets on {}: {:?}", self.platform, self.targets);
        true
    }

    fn sample(&mut self) -> Result<Vec<AlertEvent>, MetricsError> {
        let mut alerts = Vec::new();

        for target in &self.targets {
            let usage = match self.provider.disk_usage(target) {
                Ok(usage) => usage,
                Err(e) => {
                    log::warn!("Disk [{}] query failed: {}", target, e);
                    continue;
                }
            };

            let sample = ResourceSample::Disk {
                target: target.clone(),
                usage,
            };
            alerts.extend(evaluate(&sample, self.threshold, &self.server_name));
        }

        Ok(alerts)
    }
}

/// Sampler task body
///
/// Cancellation is checked after every wake-up, so a raised signal always
/// wins over a tick that became ready at the same time.
pub fn run_sampler(
    mut sampler: Box<dyn Sampler>,
    mut ticker: Ticker,
    cancel: CancellationToken,
    dispatcher: AlertDispatcher,
    state: Arc<StateCell>,
) {
    let kind = sampler.kind();
    let _exit = ExitGuard {
        kind,
        state: &state,
    };

    log::info!("{} sampler started (interval {:?})", kind, ticker.period());
    if !sampler.prepare() {
        return;
    }

    loop {
        state.set(SamplerState::Waiting);
        if ticker.tick(&cancel) == Wake::Cancelled || cancel.is_cancelled() {
            break;
        }

        state.set(SamplerState::Sampling);
        match sampler.sample() {
            Ok(alerts) => {
                for alert in &alerts {
                    // Detached: delivery never blocks the next tick
                    let _ = dispatcher.dispatch(alert);
                }
            }
            Err(e) => log::warn!("{} sampling failed: {}", kind, e),
        }
    }
}
