//! Isolated network planning: address space, zones and subnet layout.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::domain::error::NetworkError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_CIDR: &str = "10.0.0.0/16";
pub const DEFAULT_MAX_AZS: u8 = 2;

pub const MIN_AZS: u8 = 2;
pub const MAX_AZS: u8 = 6;

/// VPC address space bounds accepted by the network planner.
pub const MIN_VPC_PREFIX: u8 = 16;
pub const MAX_VPC_PREFIX: u8 = 24;

/// Smallest subnet EC2 allows.
pub const SMALLEST_SUBNET_PREFIX: u8 = 28;

// ── Cidr ─────────────────────────────────────────────────────────────────────

/// An IPv4 network in CIDR notation with its host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Cidr {
    /// Parse `a.b.c.d/n`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidCidr`] on malformed input or when host
    /// bits are set (`10.0.0.1/16`).
    pub fn parse(raw: &str) -> Result<Self, NetworkError> {
        let invalid = || NetworkError::InvalidCidr(raw.to_string());
        let (addr, prefix) = raw.split_once('/').ok_or_else(invalid)?;
        let network: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        if prefix > 32 {
            return Err(invalid());
        }
        if u32::from(network) & !mask(prefix) != 0 {
            return Err(invalid());
        }
        Ok(Self { network, prefix })
    }

    #[must_use]
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    #[must_use]
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Number of addresses in the block.
    #[must_use]
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    /// Carve the block into `count` equal power-of-two subnets, lowest first.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::AddressSpaceExhausted`] when the resulting
    /// subnets would be smaller than `/28`.
    pub fn split(&self, count: u8) -> Result<Vec<Cidr>, NetworkError> {
        let extra_bits = u8::try_from(u32::from(count.max(1)).next_power_of_two().trailing_zeros())
            .unwrap_or(u8::MAX);
        let sub_prefix = self.prefix.saturating_add(extra_bits);
        if sub_prefix > SMALLEST_SUBNET_PREFIX {
            return Err(NetworkError::AddressSpaceExhausted {
                cidr: self.to_string(),
                zones: count,
                smallest: SMALLEST_SUBNET_PREFIX,
            });
        }

        let step = 1u32 << (32 - u32::from(sub_prefix));
        let base = u32::from(self.network);
        Ok((0..u32::from(count))
            .map(|i| Cidr {
                network: Ipv4Addr::from(base + i * step),
                prefix: sub_prefix,
            })
            .collect())
    }

    /// Whether `other` lies entirely inside this block.
    #[must_use]
    pub fn contains(&self, other: &Cidr) -> bool {
        other.prefix >= self.prefix
            && u32::from(other.network) & mask(self.prefix) == u32::from(self.network)
    }
}

fn mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

impl FromStr for Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

// ── Subnets ──────────────────────────────────────────────────────────────────

/// Routing class of a subnet. The network plans no subnet with a route
/// out of the VPC, so this is the only class there is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetKind {
    /// No route out of the VPC at all.
    Isolated,
}

impl SubnetKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Isolated => "Isolated",
        }
    }
}

/// One planned subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetPlan {
    /// 1-based position, used in construct names (`IsolatedSubnet1`).
    pub number: u8,
    /// Index into the region's availability zone list.
    pub zone_index: u32,
    pub cidr: Cidr,
    pub kind: SubnetKind,
}

impl SubnetPlan {
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}Subnet{}", self.kind.as_str(), self.number)
    }
}

// ── NetworkSpec ──────────────────────────────────────────────────────────────

/// An internet-isolated VPC spread over `max_azs` zones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSpec {
    cidr: Cidr,
    max_azs: u8,
}

impl NetworkSpec {
    /// # Errors
    ///
    /// Returns an error when the prefix or zone count is out of range, or the
    /// address space cannot hold one subnet per zone.
    pub fn new(cidr: Cidr, max_azs: u8) -> Result<Self, NetworkError> {
        if !(MIN_VPC_PREFIX..=MAX_VPC_PREFIX).contains(&cidr.prefix()) {
            return Err(NetworkError::PrefixOutOfRange {
                prefix: cidr.prefix(),
                min: MIN_VPC_PREFIX,
                max: MAX_VPC_PREFIX,
            });
        }
        if !(MIN_AZS..=MAX_AZS).contains(&max_azs) {
            return Err(NetworkError::ZoneCountOutOfRange {
                count: max_azs,
                min: MIN_AZS,
                max: MAX_AZS,
            });
        }
        let spec = Self { cidr, max_azs };
        spec.subnets()?;
        Ok(spec)
    }

    #[must_use]
    pub fn cidr(&self) -> Cidr {
        self.cidr
    }

    #[must_use]
    pub fn max_azs(&self) -> u8 {
        self.max_azs
    }

    /// Always zero: the network has no address translation.
    #[must_use]
    pub fn nat_gateways(&self) -> u8 {
        0
    }

    /// Always zero: nothing in the network is internet-routable.
    #[must_use]
    pub fn internet_gateways(&self) -> u8 {
        0
    }

    /// One isolated subnet per zone.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::AddressSpaceExhausted`] if the blocks do not fit.
    pub fn subnets(&self) -> Result<Vec<SubnetPlan>, NetworkError> {
        Ok(self
            .cidr
            .split(self.max_azs)?
            .into_iter()
            .zip(0u32..)
            .map(|(cidr, zone_index)| SubnetPlan {
                number: u8::try_from(zone_index + 1).unwrap_or(u8::MAX),
                zone_index,
                cidr,
                kind: SubnetKind::Isolated,
            })
            .collect())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
