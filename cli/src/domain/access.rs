//! The access policy (security group) shared by the instance and the endpoints.
//!
//! The policy is default-deny. The only egress it ever permits is HTTPS to
//! members of the policy itself, so the instance can reach the session
//! endpoints and nothing else.

// ── Ports ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
        }
    }
}

/// A single protocol/port pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub protocol: Protocol,
    pub number: u16,
}

impl Port {
    #[must_use]
    pub const fn tcp(number: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            number,
        }
    }
}

/// Port the session broker and its message channels listen on.
pub const HTTPS: Port = Port::tcp(443);

// ── Placeholder egress ───────────────────────────────────────────────────────

/// A security group declared without egress rules gets an implicit
/// allow-all rule from the provider. This rule matches nothing and keeps
/// the group closed until real rules are attached.
pub mod placeholder {
    pub const CIDR: &str = "255.255.255.255/32";
    pub const PROTOCOL: &str = "icmp";
    pub const FROM_PORT: i32 = 252;
    pub const TO_PORT: i32 = 86;
    pub const DESCRIPTION: &str = "Disallow all traffic";
}

// ── Rules ────────────────────────────────────────────────────────────────────

/// One permitted port. Egress rules always point at members of the policy
/// itself; ingress rules always admit the enclosing network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub port: Port,
    pub description: String,
}

// ── AccessPolicy ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    description: String,
    allow_all_outbound: bool,
    egress: Vec<Rule>,
    ingress: Vec<Rule>,
}

impl AccessPolicy {
    /// A policy permitting nothing in either direction.
    #[must_use]
    pub fn default_deny(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            allow_all_outbound: false,
            egress: Vec::new(),
            ingress: Vec::new(),
        }
    }

    /// The policy shared by the instance and the session endpoints:
    /// HTTPS out to members of the group, HTTPS in from the VPC.
    #[must_use]
    pub fn session_channel() -> Self {
        let mut policy = Self::default_deny("Instance and session endpoints");
        policy.allow_egress_to_self(HTTPS);
        policy.allow_ingress_from_vpc(HTTPS);
        policy
    }

    /// Permit `port` out to members of this policy.
    pub fn allow_egress_to_self(&mut self, port: Port) {
        self.egress.push(Rule {
            port,
            description: format!("to members of this group:{}", port.number),
        });
    }

    /// Permit `port` in from anywhere in the VPC.
    pub fn allow_ingress_from_vpc(&mut self, port: Port) {
        self.ingress.push(Rule {
            port,
            description: format!("from the VPC:{}", port.number),
        });
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn allow_all_outbound(&self) -> bool {
        self.allow_all_outbound
    }

    #[must_use]
    pub fn egress_rules(&self) -> &[Rule] {
        &self.egress
    }

    #[must_use]
    pub fn ingress_rules(&self) -> &[Rule] {
        &self.ingress
    }
}
