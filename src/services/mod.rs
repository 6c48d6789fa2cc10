//! Service layer for resource monitoring
//!
//! Services encapsulate the sampling loop, disk target resolution, alert
//! dispatch and the lifecycle of the sampler threads.

pub mod cancel;
pub mod clock;
pub mod disk_resolver;
pub mod dispatcher;
pub mod manager;
pub mod sampler;

pub use cancel::CancellationToken;
pub use clock::{Clock, SystemClock, Ticker, Wake};
pub use disk_resolver::{Resolution, Selection};
pub use dispatcher::{AlertDispatcher, DeliveryOutcome, Dispatch};
pub use manager::{Manager, ManagerState, MIN_SAMPLE_INTERVAL};
pub use sampler::{CpuSampler, DiskSampler, MemorySampler, Sampler, SamplerState};
