//! OS metrics abstraction layer
//!
//! Provides a trait-based abstraction over host metric queries for testability.

pub mod system;
pub mod traits;

pub use system::SysinfoProvider;
pub use traits::MetricsProvider;
