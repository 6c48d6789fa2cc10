//! sysmon - host resource monitoring library
//!
//! This library samples CPU, memory and disk usage on independent
//! schedules and fans threshold alerts out to DingTalk and e-mail.
//!
//! # Modules
//!
//! - [`alerts`]: Notification channels
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Domain models
//! - [`error`]: Error types
//! - [`metrics`]: OS metrics abstraction layer
//! - [`services`]: Samplers, dispatcher and manager

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod services;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
