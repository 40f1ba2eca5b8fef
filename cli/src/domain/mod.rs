//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod access;
pub mod compute;
pub mod config;
pub mod diff;
pub mod endpoint;
pub mod error;
pub mod network;
pub mod reachability;
pub mod stack;

pub use config::{IsovpcConfig, apply_config_value, validate_config_key, validate_config_value};
pub use endpoint::Region;
pub use error::{ConfigError, EngineError, NetworkError};
pub use reachability::{ReachabilityReport, analyze};
pub use stack::StackSpec;
