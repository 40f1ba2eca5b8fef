use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::expr::Expr;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Errors raised while assembling or reading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("duplicate logical id '{0}'")]
    DuplicateLogicalId(String),

    #[error("properties of {resource_type} must serialize to a JSON object")]
    NotAnObject { resource_type: String },

    #[error("invalid properties for '{id}': {source}")]
    InvalidProperties {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Resource types this crate emits or inspects. Anything else is kept
/// verbatim in `Other` so foreign templates survive a read/write cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Vpc,
    Subnet,
    RouteTable,
    SubnetRouteTableAssociation,
    Route,
    InternetGateway,
    VpcGatewayAttachment,
    NatGateway,
    EgressOnlyInternetGateway,
    VpcCidrBlock,
    SecurityGroup,
    SecurityGroupEgress,
    SecurityGroupIngress,
    Instance,
    VpcEndpoint,
    IamRole,
    InstanceProfile,
    Other(String),
}

const KNOWN_TYPES: &[(ResourceType, &str)] = &[
    (ResourceType::Vpc, "AWS::EC2::VPC"),
    (ResourceType::Subnet, "AWS::EC2::Subnet"),
    (ResourceType::RouteTable, "AWS::EC2::RouteTable"),
    (
        ResourceType::SubnetRouteTableAssociation,
        "AWS::EC2::SubnetRouteTableAssociation",
    ),
    (ResourceType::Route, "AWS::EC2::Route"),
    (ResourceType::InternetGateway, "AWS::EC2::InternetGateway"),
    (
        ResourceType::VpcGatewayAttachment,
        "AWS::EC2::VPCGatewayAttachment",
    ),
    (ResourceType::NatGateway, "AWS::EC2::NatGateway"),
    (
        ResourceType::EgressOnlyInternetGateway,
        "AWS::EC2::EgressOnlyInternetGateway",
    ),
    (ResourceType::VpcCidrBlock, "AWS::EC2::VPCCidrBlock"),
    (ResourceType::SecurityGroup, "AWS::EC2::SecurityGroup"),
    (ResourceType::SecurityGroupEgress, "AWS::EC2::SecurityGroupEgress"),
    (
        ResourceType::SecurityGroupIngress,
        "AWS::EC2::SecurityGroupIngress",
    ),
    (ResourceType::Instance, "AWS::EC2::Instance"),
    (ResourceType::VpcEndpoint, "AWS::EC2::VPCEndpoint"),
    (ResourceType::IamRole, "AWS::IAM::Role"),
    (ResourceType::InstanceProfile, "AWS::IAM::InstanceProfile"),
];

impl ResourceType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        if let Self::Other(name) = self {
            return name;
        }
        KNOWN_TYPES
            .iter()
            .find(|(t, _)| t == self)
            .map_or("", |(_, name)| *name)
    }
}

impl From<String> for ResourceType {
    fn from(name: String) -> Self {
        KNOWN_TYPES
            .iter()
            .find(|(_, n)| *n == name)
            .map_or(Self::Other(name), |(t, _)| t.clone())
    }
}

impl From<ResourceType> for String {
    fn from(t: ResourceType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `Resources` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    /// Build a resource from a typed property struct.
    pub fn new<P: Serialize>(
        resource_type: ResourceType,
        properties: &P,
    ) -> Result<Self, TemplateError> {
        match serde_json::to_value(properties)? {
            Value::Object(properties) => Ok(Self {
                resource_type,
                properties,
                depends_on: Vec::new(),
            }),
            _ => Err(TemplateError::NotAnObject {
                resource_type: resource_type.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn with_dependency(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    /// Read the properties back into a typed struct.
    pub fn properties_as<P: DeserializeOwned>(&self, id: &str) -> Result<P, TemplateError> {
        serde_json::from_value(Value::Object(self.properties.clone())).map_err(|source| {
            TemplateError::InvalidProperties {
                id: id.to_string(),
                source,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Expr,
}

/// A CloudFormation template document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion", default = "default_format_version")]
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

fn default_format_version() -> String {
    TEMPLATE_FORMAT_VERSION.to_string()
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: default_format_version(),
            description: None,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Insert a resource, refusing to overwrite an existing logical id.
    pub fn add_resource(
        &mut self,
        id: impl Into<String>,
        resource: Resource,
    ) -> Result<(), TemplateError> {
        let id = id.into();
        if self.resources.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        self.resources.insert(id, resource);
        Ok(())
    }

    pub fn add_parameter(
        &mut self,
        id: impl Into<String>,
        parameter: Parameter,
    ) -> Result<(), TemplateError> {
        let id = id.into();
        if self.parameters.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        self.parameters.insert(id, parameter);
        Ok(())
    }

    pub fn add_output(&mut self, id: impl Into<String>, output: Output) -> Result<(), TemplateError> {
        let id = id.into();
        if self.outputs.contains_key(&id) {
            return Err(TemplateError::DuplicateLogicalId(id));
        }
        self.outputs.insert(id, output);
        Ok(())
    }

    /// Resources of one type, in logical id order.
    pub fn resources_of<'a>(
        &'a self,
        resource_type: &'a ResourceType,
    ) -> impl Iterator<Item = (&'a str, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| &r.resource_type == resource_type)
            .map(|(id, r)| (id.as_str(), r))
    }

    /// Typed properties of every resource of one type.
    pub fn typed<P: DeserializeOwned>(
        &self,
        resource_type: &ResourceType,
    ) -> Result<Vec<(String, P)>, TemplateError> {
        self.resources_of(resource_type)
            .map(|(id, r)| -> Result<_, TemplateError> {
                Ok((id.to_string(), r.properties_as(id)?))
            })
            .collect()
    }

    pub fn to_json_pretty(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(raw)?)
    }
}
