//! The stack declaration and its synthesis into a CloudFormation template.
//!
//! Synthesis is a flat builder sequence: network, access policy, instance,
//! endpoints, output. Each step returns the logical ids later steps wire in.

use anyhow::{Context, Result};
use isovpc_common::{
    Expr, IamRoleProperties, InstanceProfileProperties, InstanceProperties, LogicalId, Output,
    Parameter, PolicyDocument, Resource, ResourceType, RouteTableProperties, SecurityGroupProperties,
    SecurityGroupRule, StandaloneRuleProperties, SubnetProperties,
    SubnetRouteTableAssociationProperties, Tag, Template, VpcEndpointProperties, VpcProperties,
};

use crate::domain::access::{AccessPolicy, Rule, placeholder};
use crate::domain::compute::{EC2_SERVICE_PRINCIPAL, InstanceSpec, MachineImage, ManagedPolicy};
use crate::domain::config::IsovpcConfig;
use crate::domain::endpoint::{EndpointSpec, Region, session_endpoints};
use crate::domain::network::{Cidr, NetworkSpec, SubnetPlan};

pub const TEMPLATE_DESCRIPTION: &str =
    "Internet-isolated VPC with one instance reachable through SSM Session Manager";

/// Name of the stack output carrying the instance id.
pub const INSTANCE_ID_OUTPUT: &str = "InstanceId";

/// Tag recording the routing class of a subnet.
pub const SUBNET_TYPE_TAG: &str = "isovpc:subnet-type";

const IMAGE_PARAMETER_TYPE: &str = "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>";

// ── StackSpec ────────────────────────────────────────────────────────────────

/// Everything one deployment declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    name: String,
    region: Region,
    network: NetworkSpec,
    access: AccessPolicy,
    instance: InstanceSpec,
    endpoints: Vec<EndpointSpec>,
}

/// Logical ids of the network pieces other resources point at.
struct NetworkIds {
    vpc: String,
    subnets: Vec<(SubnetPlan, String)>,
}

impl StackSpec {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        region: Region,
        network: NetworkSpec,
        instance: InstanceSpec,
    ) -> Self {
        Self {
            name: name.into(),
            region,
            network,
            access: AccessPolicy::session_channel(),
            instance,
            endpoints: session_endpoints(),
        }
    }

    /// Build the declaration from user configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured network is invalid.
    pub fn from_config(config: &IsovpcConfig, region: Region) -> Result<Self> {
        let cidr = Cidr::parse(&config.network.cidr)
            .with_context(|| format!("network.cidr = {}", config.network.cidr))?;
        let network = NetworkSpec::new(cidr, config.network.max_azs).with_context(|| {
            format!(
                "network {} across {} zones",
                config.network.cidr, config.network.max_azs
            )
        })?;
        let instance = InstanceSpec::new(
            config.instance.instance_type.clone(),
            MachineImage::from_config(&config.instance.image),
        );
        Ok(Self::new(config.stack.name.clone(), region, network, instance))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    #[must_use]
    pub fn network(&self) -> &NetworkSpec {
        &self.network
    }

    #[must_use]
    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    #[must_use]
    pub fn instance(&self) -> &InstanceSpec {
        &self.instance
    }

    #[must_use]
    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    /// Produce the deployment plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the network cannot be laid out or two constructs
    /// collide on a logical id.
    pub fn synthesize(&self) -> Result<Template> {
        let mut template = Template::new(TEMPLATE_DESCRIPTION);

        let net = self.add_network(&mut template)?;
        let group = self.add_access_policy(&mut template, &net)?;
        let instance = self.add_instance(&mut template, &net, &group)?;
        self.add_endpoints(&mut template, &net, &group)?;

        template.add_output(
            INSTANCE_ID_OUTPUT,
            Output {
                description: Some("Instance id to open a session with".to_string()),
                value: Expr::reference(instance),
            },
        )?;
        Ok(template)
    }

    fn name_tag(&self, path: &str) -> Tag {
        Tag::new("Name", format!("{}/{path}", self.name))
    }

    fn add_network(&self, template: &mut Template) -> Result<NetworkIds> {
        let vpc = LogicalId::from_path(&["vpc", "Resource"]).to_string();
        template.add_resource(
            &vpc,
            Resource::new(
                ResourceType::Vpc,
                &VpcProperties {
                    cidr_block: self.network.cidr().to_string(),
                    enable_dns_hostnames: true,
                    enable_dns_support: true,
                    instance_tenancy: Some("default".to_string()),
                    tags: vec![self.name_tag("vpc")],
                },
            )?,
        )?;

        let mut subnets = Vec::new();
        for plan in self.network.subnets()? {
            let name = plan.name();
            let subnet = LogicalId::from_path(&["vpc", name.as_str(), "Subnet"]).to_string();
            let table = LogicalId::from_path(&["vpc", name.as_str(), "RouteTable"]).to_string();
            let association =
                LogicalId::from_path(&["vpc", name.as_str(), "RouteTableAssociation"]).to_string();

            template.add_resource(
                &subnet,
                Resource::new(
                    ResourceType::Subnet,
                    &SubnetProperties {
                        vpc_id: Expr::reference(&vpc),
                        availability_zone: Expr::select(plan.zone_index, Expr::azs()),
                        cidr_block: plan.cidr.to_string(),
                        map_public_ip_on_launch: false,
                        tags: vec![
                            self.name_tag(&format!("vpc/{name}")),
                            Tag::new(SUBNET_TYPE_TAG, plan.kind.as_str()),
                        ],
                    },
                )?,
            )?;
            // No routes are ever added: the table only knows the local route.
            template.add_resource(
                &table,
                Resource::new(
                    ResourceType::RouteTable,
                    &RouteTableProperties {
                        vpc_id: Expr::reference(&vpc),
                        tags: vec![self.name_tag(&format!("vpc/{name}"))],
                    },
                )?,
            )?;
            template.add_resource(
                &association,
                Resource::new(
                    ResourceType::SubnetRouteTableAssociation,
                    &SubnetRouteTableAssociationProperties {
                        route_table_id: Expr::reference(&table),
                        subnet_id: Expr::reference(&subnet),
                    },
                )?,
            )?;
            subnets.push((plan, subnet));
        }

        Ok(NetworkIds { vpc, subnets })
    }

    fn subnet_ids_for(&self, net: &NetworkIds) -> Vec<(SubnetPlan, String)> {
        let kind = self.instance.subnet_selection();
        net.subnets
            .iter()
            .filter(|(plan, _)| plan.kind == kind)
            .cloned()
            .collect()
    }

    fn add_access_policy(&self, template: &mut Template, net: &NetworkIds) -> Result<String> {
        let group = LogicalId::from_path(&["InstanceSecurityGroup", "Resource"]).to_string();
        let group_id = Expr::get_att(&group, "GroupId");

        let vpc_cidr = Expr::get_att(&net.vpc, "CidrBlock");
        let inline_ingress: Vec<_> = self
            .access
            .ingress_rules()
            .iter()
            .map(|rule| SecurityGroupRule {
                cidr_ip: Some(vpc_cidr.clone()),
                ..base_rule(rule)
            })
            .collect();
        let inline_egress = if self.access.allow_all_outbound() {
            Vec::new()
        } else {
            vec![SecurityGroupRule {
                ip_protocol: placeholder::PROTOCOL.to_string(),
                from_port: Some(placeholder::FROM_PORT),
                to_port: Some(placeholder::TO_PORT),
                cidr_ip: Some(Expr::literal(placeholder::CIDR)),
                description: Some(placeholder::DESCRIPTION.to_string()),
                ..SecurityGroupRule::default()
            }]
        };

        template.add_resource(
            &group,
            Resource::new(
                ResourceType::SecurityGroup,
                &SecurityGroupProperties {
                    group_description: format!(
                        "{}/InstanceSecurityGroup: {}",
                        self.name,
                        self.access.description()
                    ),
                    vpc_id: Expr::reference(&net.vpc),
                    security_group_egress: inline_egress,
                    security_group_ingress: inline_ingress,
                    tags: vec![self.name_tag("InstanceSecurityGroup")],
                },
            )?,
        )?;

        // A rule cannot reference its own group inline, so self egress is a
        // standalone resource.
        for rule in self.access.egress_rules() {
            let construct = format!("EgressToSelf{}", rule.port.number);
            let id = LogicalId::from_path(&["InstanceSecurityGroup", construct.as_str()]).to_string();
            template.add_resource(
                id,
                Resource::new(
                    ResourceType::SecurityGroupEgress,
                    &StandaloneRuleProperties {
                        group_id: group_id.clone(),
                        rule: SecurityGroupRule {
                            destination_security_group_id: Some(group_id.clone()),
                            ..base_rule(rule)
                        },
                    },
                )?,
            )?;
        }

        Ok(group)
    }

    fn add_instance(
        &self,
        template: &mut Template,
        net: &NetworkIds,
        group: &str,
    ) -> Result<String> {
        let role = LogicalId::from_path(&["ec2-instance", "InstanceRole", "Resource"]).to_string();
        let profile = LogicalId::from_path(&["ec2-instance", "InstanceProfile"]).to_string();
        let instance = LogicalId::from_path(&["ec2-instance", "Resource"]).to_string();

        template.add_resource(
            &role,
            Resource::new(
                ResourceType::IamRole,
                &IamRoleProperties {
                    assume_role_policy_document: PolicyDocument::assume_role_by(
                        EC2_SERVICE_PRINCIPAL,
                    ),
                    managed_policy_arns: self
                        .instance
                        .managed_policies()
                        .iter()
                        .map(ManagedPolicy::arn)
                        .collect(),
                    tags: vec![self.name_tag("ec2-instance")],
                },
            )?,
        )?;
        template.add_resource(
            &profile,
            Resource::new(
                ResourceType::InstanceProfile,
                &InstanceProfileProperties {
                    roles: vec![Expr::reference(&role)],
                },
            )?,
        )?;

        let image_id = match self.instance.image() {
            MachineImage::AmiId(ami) => Expr::literal(ami.clone()),
            MachineImage::SsmParameter(path) => {
                let parameter = LogicalId::from_path(&["InstanceImageId"]).to_string();
                template.add_parameter(
                    &parameter,
                    Parameter {
                        parameter_type: IMAGE_PARAMETER_TYPE.to_string(),
                        default: Some(path.clone()),
                        description: Some("Image for the isolated instance".to_string()),
                    },
                )?;
                Expr::reference(parameter)
            }
        };

        let placement = self.subnet_ids_for(net);
        let (plan, subnet) = placement
            .first()
            .context("instance placement: no subnet selected")?;

        template.add_resource(
            &instance,
            Resource::new(
                ResourceType::Instance,
                &InstanceProperties {
                    availability_zone: Expr::select(plan.zone_index, Expr::azs()),
                    iam_instance_profile: Some(Expr::reference(&profile)),
                    image_id,
                    instance_type: self.instance.instance_type().to_string(),
                    security_group_ids: vec![Expr::get_att(group, "GroupId")],
                    subnet_id: Expr::reference(subnet),
                    tags: vec![self.name_tag("ec2-instance")],
                },
            )?
            .with_dependency(&role),
        )?;

        Ok(instance)
    }

    fn add_endpoints(&self, template: &mut Template, net: &NetworkIds, group: &str) -> Result<()> {
        let subnet_ids: Vec<Expr> = self
            .subnet_ids_for(net)
            .into_iter()
            .map(|(_, id)| Expr::reference(id))
            .collect();

        for endpoint in &self.endpoints {
            let construct = format!("vpc-endpoint-{}", endpoint.suffix());
            let id = LogicalId::from_path(&[construct.as_str(), "Resource"]).to_string();
            template.add_resource(
                id,
                Resource::new(
                    ResourceType::VpcEndpoint,
                    &VpcEndpointProperties {
                        service_name: endpoint.service_name(&self.region),
                        vpc_id: Expr::reference(&net.vpc),
                        private_dns_enabled: endpoint.private_dns_enabled(),
                        security_group_ids: vec![Expr::get_att(group, "GroupId")],
                        subnet_ids: subnet_ids.clone(),
                        vpc_endpoint_type: "Interface".to_string(),
                    },
                )?,
            )?;
        }
        Ok(())
    }
}

fn base_rule(rule: &Rule) -> SecurityGroupRule {
    SecurityGroupRule {
        ip_protocol: rule.port.protocol.as_str().to_string(),
        from_port: Some(i32::from(rule.port.number)),
        to_port: Some(i32::from(rule.port.number)),
        description: Some(rule.description.clone()),
        ..SecurityGroupRule::default()
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
