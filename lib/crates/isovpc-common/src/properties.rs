//! Typed `Properties` blocks for the resource types the stack emits.
//!
//! Every struct round-trips through `serde_json` with CloudFormation's
//! PascalCase keys. Optional keys default on read so templates written by
//! other tools can still be inspected.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// `AWS::EC2::VPC`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcProperties {
    pub cidr_block: String,
    #[serde(default)]
    pub enable_dns_hostnames: bool,
    #[serde(default)]
    pub enable_dns_support: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_tenancy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// `AWS::EC2::Subnet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetProperties {
    pub vpc_id: Expr,
    #[serde(default)]
    pub availability_zone: Expr,
    pub cidr_block: String,
    #[serde(default)]
    pub map_public_ip_on_launch: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// `AWS::EC2::RouteTable`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTableProperties {
    pub vpc_id: Expr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// `AWS::EC2::SubnetRouteTableAssociation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetRouteTableAssociationProperties {
    pub route_table_id: Expr,
    pub subnet_id: Expr,
}

/// `AWS::EC2::Route`. Never emitted by the stack; read when checking
/// that no subnet has a path out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteProperties {
    pub route_table_id: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_cidr_block: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_ipv6_cidr_block: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_gateway_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress_only_internet_gateway_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_interface_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_gateway_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_peering_connection_id: Option<Expr>,
}

impl RouteProperties {
    /// Destination block as written, or `"?"` when it is not a literal.
    #[must_use]
    pub fn destination(&self) -> &str {
        self.destination_cidr_block
            .as_ref()
            .or(self.destination_ipv6_cidr_block.as_ref())
            .and_then(Expr::as_literal)
            .unwrap_or("?")
    }

    /// Kind of next hop the route sends traffic to.
    #[must_use]
    pub fn target_kind(&self) -> &'static str {
        [
            (&self.gateway_id, "a gateway"),
            (&self.nat_gateway_id, "a NAT gateway"),
            (&self.egress_only_internet_gateway_id, "an egress-only internet gateway"),
            (&self.instance_id, "an instance"),
            (&self.network_interface_id, "a network interface"),
            (&self.transit_gateway_id, "a transit gateway"),
            (&self.vpc_peering_connection_id, "a peering connection"),
        ]
        .into_iter()
        .find_map(|(field, kind)| field.is_some().then_some(kind))
        .unwrap_or("an unrecognised target")
    }
}

/// `AWS::EC2::VPCCidrBlock`. Read when checking for IPv6 address space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcCidrBlockProperties {
    pub vpc_id: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<Expr>,
    #[serde(default)]
    pub amazon_provided_ipv6_cidr_block: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_cidr_block: Option<Expr>,
}

/// One security group rule, inline or standalone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupRule {
    pub ip_protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_ip: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_ipv6: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_prefix_list_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_security_group_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_security_group_id: Option<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `AWS::EC2::SecurityGroup`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupProperties {
    pub group_description: String,
    pub vpc_id: Expr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_egress: Vec<SecurityGroupRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ingress: Vec<SecurityGroupRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// `AWS::EC2::SecurityGroupEgress` / `AWS::EC2::SecurityGroupIngress`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandaloneRuleProperties {
    pub group_id: Expr,
    #[serde(flatten)]
    pub rule: SecurityGroupRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: String,
    pub principal: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Trust policy letting a service principal assume the role.
    #[must_use]
    pub fn assume_role_by(service: &str) -> Self {
        Self {
            version: "2012-10-17".to_string(),
            statement: vec![PolicyStatement {
                action: "sts:AssumeRole".to_string(),
                effect: "Allow".to_string(),
                principal: Principal {
                    service: service.to_string(),
                },
            }],
        }
    }
}

/// `AWS::IAM::Role`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IamRoleProperties {
    pub assume_role_policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// `AWS::IAM::InstanceProfile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfileProperties {
    pub roles: Vec<Expr>,
}

/// `AWS::EC2::Instance`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProperties {
    #[serde(default)]
    pub availability_zone: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile: Option<Expr>,
    pub image_id: Expr,
    pub instance_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<Expr>,
    pub subnet_id: Expr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// `AWS::EC2::VPCEndpoint`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcEndpointProperties {
    pub service_name: Expr,
    pub vpc_id: Expr,
    #[serde(default)]
    pub private_dns_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnet_ids: Vec<Expr>,
    #[serde(default = "default_endpoint_type")]
    pub vpc_endpoint_type: String,
}

fn default_endpoint_type() -> String {
    "Gateway".to_string()
}
