//! Core types, configuration, and cancellation shared by the wireplan crates.
//!
//! This crate provides the ambient building blocks used across the generator:
//! the run configuration, a cooperative cancellation token checked between
//! per-type plan computations, and the host-level error type.

mod config;
mod error;
mod types;

pub use config::GeneratorConfig;
pub use error::{WirePlanError, WirePlanResult};
pub use types::WireFormat;

/// Cooperative cancellation shared by the planner and its callers.
pub use tokio_util::sync::CancellationToken;
