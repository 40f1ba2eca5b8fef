//! Domain types and validators for isovpc configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::compute::{AL2023_IMAGE_PARAMETER, DEFAULT_INSTANCE_TYPE};
use crate::domain::error::ConfigError;
use crate::domain::network::{Cidr, DEFAULT_CIDR, DEFAULT_MAX_AZS, NetworkSpec};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_STACK_NAME: &str = "PrivateVpcConnectionStack";

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "stack.name",
    "stack.region",
    "network.cidr",
    "network.max_azs",
    "instance.type",
    "instance.image",
];

static STACK_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").unwrap_or_else(|e| panic!("stack name regex: {e}"))
});
static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]?)?-[a-z]+-[0-9]+$")
        .unwrap_or_else(|e| panic!("region regex: {e}"))
});
static INSTANCE_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9-]*\.[a-z0-9]+$")
        .unwrap_or_else(|e| panic!("instance type regex: {e}"))
});
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ami-[0-9a-f]{8,17}|/[A-Za-z0-9_./-]+)$")
        .unwrap_or_else(|e| panic!("image regex: {e}"))
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.isovpc/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct IsovpcConfig {
    pub stack: StackSettings,
    pub network: NetworkSettings,
    pub instance: InstanceSettings,
}

/// Stack identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StackSettings {
    /// CloudFormation stack name.
    pub name: String,
    /// Deployment region; unset means environment-agnostic synthesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_STACK_NAME.to_string(),
            region: None,
        }
    }
}

/// Isolated network layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkSettings {
    /// VPC address space.
    pub cidr: String,
    /// Number of availability zones (one isolated subnet each).
    pub max_azs: u8,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            cidr: DEFAULT_CIDR.to_string(),
            max_azs: DEFAULT_MAX_AZS,
        }
    }
}

/// Compute instance settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstanceSettings {
    /// EC2 instance type.
    #[serde(rename = "type")]
    pub instance_type: String,
    /// SSM parameter path or AMI id.
    pub image: String,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            image: AL2023_IMAGE_PARAMETER.to_string(),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |expected: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
        .into()
    };

    match key {
        "stack.name" if !STACK_NAME_RE.is_match(value) => Err(invalid(
            "a letter followed by up to 127 letters, digits or hyphens",
        )),
        "stack.region" if !REGION_RE.is_match(value) => {
            Err(invalid("an AWS region such as us-east-1"))
        }
        "network.cidr" => match Cidr::parse(value) {
            Ok(cidr) => NetworkSpec::new(cidr, DEFAULT_MAX_AZS)
                .map(|_| ())
                .map_err(|e| invalid(&e.to_string())),
            Err(e) => Err(invalid(&e.to_string())),
        },
        "network.max_azs" => match value.parse::<u8>() {
            Ok(n) if (crate::domain::network::MIN_AZS..=crate::domain::network::MAX_AZS)
                .contains(&n) =>
            {
                Ok(())
            }
            _ => Err(invalid("an integer from 2 to 6")),
        },
        "instance.type" if !INSTANCE_TYPE_RE.is_match(value) => {
            Err(invalid("an EC2 instance type such as t2.micro"))
        }
        "instance.image" if !IMAGE_RE.is_match(value) => {
            Err(invalid("an SSM parameter path or an ami- id"))
        }
        _ => Ok(()),
    }
}

/// Validates `key`/`value` and writes the value into `config`.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value invalid.
pub fn apply_config_value(config: &mut IsovpcConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;

    match key {
        "stack.name" => config.stack.name = value.to_string(),
        "stack.region" => config.stack.region = Some(value.to_string()),
        "network.cidr" => config.network.cidr = value.to_string(),
        "network.max_azs" => config.network.max_azs = value.parse()?,
        "instance.type" => config.instance.instance_type = value.to_string(),
        "instance.image" => config.instance.image = value.to_string(),
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

/// Validates a region string on its own (CLI flags, environment).
#[must_use]
pub fn is_valid_region(region: &str) -> bool {
    REGION_RE.is_match(region)
}

// ── Unit tests ───────────────────────────────────────────────────────────────
