//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{IsovpcConfig, apply_config_value, is_valid_region};
use crate::domain::endpoint::Region;

/// Environment variables consulted for the region, in order.
pub const REGION_ENV_VARS: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the stored configuration cannot be read.
pub fn load_config(store: &impl ConfigStore) -> Result<IsovpcConfig> {
    store.load()
}

/// Validate and persist one setting, returning the updated configuration.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the store fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<IsovpcConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    tracing::info!(key, value, "configuration updated");
    Ok(config)
}

/// Resolve the deployment region.
///
/// Precedence: explicit flag, `stack.region`, then the AWS environment
/// variables. Nothing set means the template stays region-agnostic.
///
/// # Errors
///
/// Returns an error if the chosen value is not a region name.
pub fn resolve_region(
    flag: Option<&str>,
    config: &IsovpcConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Region> {
    let from_env = REGION_ENV_VARS
        .iter()
        .find_map(|var| env(var).filter(|v| !v.is_empty()).map(|v| (*var, v)));

    let (source, region) = match (flag, config.stack.region.as_deref(), from_env) {
        (Some(r), _, _) => ("--region", r.to_string()),
        (None, Some(r), _) => ("stack.region", r.to_string()),
        (None, None, Some((var, r))) => (var, r),
        (None, None, None) => {
            tracing::debug!("no region configured, synthesizing region-agnostic template");
            return Ok(Region::Agnostic);
        }
    };

    anyhow::ensure!(
        is_valid_region(&region),
        "Invalid region '{region}' (from {source}): expected a name such as us-east-1"
    );
    tracing::debug!(region, source, "resolved region");
    Ok(Region::Known(region))
}
