//! Interface endpoints that stand in for internet access.
//!
//! Session Manager needs three regional services. Each gets a private
//! endpoint in the isolated subnets, guarded by the shared access policy,
//! with private DNS so the agent's lookups resolve to in-VPC addresses.

use std::fmt;

use isovpc_common::{AWS_REGION, Expr};

use crate::domain::access::{HTTPS, Port};

/// Service suffixes the session agent talks to.
pub const SESSION_SUBSERVICES: [&str; 3] = ["ssm", "ec2messages", "ssmmessages"];

pub const SERVICE_NAME_PREFIX: &str = "com.amazonaws.";

/// The deployment region as far as synthesis knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Known(String),
    /// Resolved by the engine at deploy time through `AWS::Region`.
    Agnostic,
}

impl Region {
    #[must_use]
    pub fn known(&self) -> Option<&str> {
        match self {
            Self::Known(r) => Some(r),
            Self::Agnostic => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(r) => f.write_str(r),
            Self::Agnostic => f.write_str("(any region)"),
        }
    }
}

/// `com.amazonaws.<region>.<suffix>`
#[must_use]
pub fn service_name(region: &Region, suffix: &str) -> Expr {
    match region {
        Region::Known(r) => Expr::literal(format!("{SERVICE_NAME_PREFIX}{r}.{suffix}")),
        Region::Agnostic => Expr::join(
            "",
            vec![
                Expr::literal(SERVICE_NAME_PREFIX),
                Expr::reference(AWS_REGION),
                Expr::literal(format!(".{suffix}")),
            ],
        ),
    }
}

/// Split a resolved service name into `(region, suffix)`.
#[must_use]
pub fn parse_service_name(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix(SERVICE_NAME_PREFIX)?;
    let (region, suffix) = rest.split_once('.')?;
    if region.is_empty() || suffix.is_empty() {
        return None;
    }
    Some((region, suffix))
}

/// One interface endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    suffix: &'static str,
    port: Port,
}

impl EndpointSpec {
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        self.suffix
    }

    #[must_use]
    pub fn port(&self) -> Port {
        self.port
    }

    /// Always on. Without it the agent resolves public addresses it cannot
    /// reach and sessions connect but never show output.
    #[must_use]
    pub fn private_dns_enabled(&self) -> bool {
        true
    }

    #[must_use]
    pub fn service_name(&self, region: &Region) -> Expr {
        service_name(region, self.suffix)
    }
}

/// The endpoints Session Manager needs, one per sub-service.
#[must_use]
pub fn session_endpoints() -> Vec<EndpointSpec> {
    SESSION_SUBSERVICES
        .iter()
        .map(|&suffix| EndpointSpec {
            suffix,
            port: HTTPS,
        })
        .collect()
}
