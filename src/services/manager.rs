//! Monitor manager
//!
//! Owns the sampler tasks and their shared cancellation token. `start`
//! spawns one thread per resource kind; `stop` raises the token and joins
//! every thread. Alert deliveries are detached and may outlive `stop`.

use crate::alerts::AlertSender;
use crate::config::MonitorConfig;
use crate::domain::{os_name, Platform, ResourceKind};
use crate::error::ManagerError;
use crate::metrics::MetricsProvider;
use crate::services::cancel::CancellationToken;
use crate::services::clock::{Clock, SystemClock, Ticker};
use crate::services::dispatcher::AlertDispatcher;
use crate::services::sampler::{
    run_sampler, CpuSampler, DiskSampler, MemorySampler, Sampler, SamplerState, StateCell,
};

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Smallest accepted sampling interval
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Manager lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// A spawned sampler thread
struct SamplerTask {
    kind: ResourceKind,
    state: Arc<StateCell>,
    handle: Option<JoinHandle<()>>,
}

/// Coordinates the CPU, memory and disk samplers
pub struct Manager {
    server_name: String,
    config: MonitorConfig,
    provider: Arc<dyn MetricsProvider>,
    dispatcher: AlertDispatcher,
    clock: Arc<dyn Clock>,
    platform: Platform,
    cancel: CancellationToken,
    state: ManagerState,
    tasks: Vec<SamplerTask>,
}

impl Manager {
    /// Create a manager, rejecting intervals below [`MIN_SAMPLE_INTERVAL`]
    pub fn new(
        config: MonitorConfig,
        provider: Arc<dyn MetricsProvider>,
        senders: Vec<Arc<dyn AlertSender>>,
    ) -> Result<Self, ManagerError> {
        for (kind, interval) in config.intervals() {
            if interval < MIN_SAMPLE_INTERVAL {
                return Err(ManagerError::IntervalTooShort {
                    kind,
                    interval,
                    minimum: MIN_SAMPLE_INTERVAL,
                });
            }
        }

        Ok(Self {
            server_name: config.server_name.clone(),
            config,
            provider,
            dispatcher: AlertDispatcher::new(senders),
            clock: Arc::new(SystemClock::new()),
            platform: Platform::current(),
            cancel: CancellationToken::new(),
            state: ManagerState::Created,
            tasks: Vec::new(),
        })
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the platform used for disk target resolution
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Current state of every spawned sampler
    pub fn sampler_states(&self) -> Vec<(ResourceKind, SamplerState)> {
        self.tasks.iter().map(|t| (t.kind, t.state.get())).collect()
    }

    fn samplers(&self) -> Vec<Box<dyn Sampler>> {
        let cfg = &self.config;
        vec![
            Box::new(CpuSampler::new(
                Arc::clone(&self.provider),
                &self.server_name,
                cfg.cpu.interval(),
                cfg.cpu.threshold,
            )),
            Box::new(MemorySampler::new(
                Arc::clone(&self.provider),
                &self.server_name,
                cfg.memory.interval(),
                cfg.memory.available_threshold_gb,
            )),
            Box::new(
                DiskSampler::new(
                    Arc::clone(&self.provider),
                    &self.server_name,
                    cfg.disk.interval(),
                    cfg.disk.usage_threshold,
                    cfg.disk.targets.clone(),
                )
                .with_platform(self.platform),
            ),
        ]
    }

    /// Spawn one sampler thread per resource kind
    ///
    /// Returns immediately. Fails with [`ManagerError::AlreadyStarted`]
    /// unless the manager is freshly created.
    pub fn start(&mut self) -> Result<(), ManagerError> {
        if self.state != ManagerState::Created {
            return Err(ManagerError::AlreadyStarted);
        }

        log::info!(
            "Starting monitor | server: {} | OS: {} | CPU interval: {:?} | memory interval: {:?} | disk interval: {:?}",
            self.server_name,
            os_name(),
            self.config.cpu.interval(),
            self.config.memory.interval(),
            self.config.disk.interval()
        );
        if self.dispatcher.channel_count() == 0 {
            log::warn!("No alert channels enabled, violations will only be logged");
        } else {
            log::info!("Alert channels: {:?}", self.dispatcher.channel_names());
        }

        for sampler in self.samplers() {
            let kind = sampler.kind();
            // Created here so the schedule starts at `start`, not at thread spawn
            let ticker = Ticker::new(Arc::clone(&self.clock), sampler.interval());
            let state = Arc::new(StateCell::new());
            let cancel = self.cancel.clone();
            let dispatcher = self.dispatcher.clone();
            let task_state = Arc::clone(&state);

            let spawned = thread::Builder::new()
                .name(format!("sampler-{}", kind.slug()))
                .spawn(move || run_sampler(sampler, ticker, cancel, dispatcher, task_state));

            match spawned {
                Ok(handle) => self.tasks.push(SamplerTask {
                    kind,
                    state,
                    handle: Some(handle),
                }),
                Err(e) => {
                    self.state = ManagerState::Running;
                    self.stop();
                    return Err(ManagerError::Spawn(e.to_string()));
                }
            }
        }

        self.state = ManagerState::Running;
        Ok(())
    }

    /// Cancel every sampler and wait for all of them to exit
    ///
    /// Safe to call more than once; later calls return immediately.
    pub fn stop(&mut self) {
        match self.state {
            ManagerState::Stopped | ManagerState::Stopping => return,
            ManagerState::Created => {
                self.cancel.cancel();
                self.state = ManagerState::Stopped;
                return;
            }
            ManagerState::Running => {}
        }

        self.state = ManagerState::Stopping;
        self.cancel.cancel();

        for task in &mut self.tasks {
            if let Some(handle) = task.handle.take() {
                if handle.join().is_err() {
                    log::error!("{} sampler terminated by a panic", task.kind);
                }
            }
        }

        self.state = ManagerState::Stopped;
        log::info!("Monitor stopped");
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.stop();
    }
}
