//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nExpected: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

// ── Network errors ────────────────────────────────────────────────────────────

/// Errors raised while planning the isolated network.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR block '{0}': expected a.b.c.d/n with host bits cleared")]
    InvalidCidr(String),

    #[error("CIDR prefix /{prefix} out of range (/{min}../{max})")]
    PrefixOutOfRange { prefix: u8, min: u8, max: u8 },

    #[error("Availability zone count {count} out of range ({min}..={max})")]
    ZoneCountOutOfRange { count: u8, min: u8, max: u8 },

    #[error("{cidr} cannot be split into {zones} subnets of at least /{smallest}")]
    AddressSpaceExhausted { cidr: String, zones: u8, smallest: u8 },
}

// ── Engine errors ─────────────────────────────────────────────────────────────

/// Errors reported by the external provisioning engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Stack '{0}' not found. Run 'isovpc deploy' first.")]
    StackNotFound(String),

    #[error("Stack '{stack}' has no output '{output}'")]
    MissingOutput { stack: String, output: String },
}
