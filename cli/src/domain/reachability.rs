//! Static reachability analysis over a synthesized template.
//!
//! Answers one question without deploying anything: can the instance reach
//! the session service, and can it reach nothing else? Each check inspects
//! resources by type and follows `Ref`/`Fn::GetAtt` links between them, so
//! templates produced by other tools can be checked as well.

use std::collections::{BTreeMap, BTreeSet};

use isovpc_common::{
    AWS_PARTITION, AWS_REGION, Expr, IamRoleProperties, InstanceProfileProperties,
    InstanceProperties, ResourceType, RouteProperties, SecurityGroupProperties, SecurityGroupRule,
    StandaloneRuleProperties, SubnetProperties, SubnetRouteTableAssociationProperties, Template,
    TemplateError, VpcCidrBlockProperties, VpcEndpointProperties,
};
use serde::Serialize;

use crate::domain::access::{HTTPS, placeholder};
use crate::domain::compute::{EC2_SERVICE_PRINCIPAL, SSM_MANAGED_POLICY};
use crate::domain::endpoint::{Region, SESSION_SUBSERVICES, parse_service_name};
use crate::domain::stack::INSTANCE_ID_OUTPUT;

/// Stand-in for `AWS::Region` when checking a region-agnostic template.
const UNRESOLVED_REGION: &str = "${AWS::Region}";

// ── Types ─────────────────────────────────────────────────────────────────────

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Stable identifier, e.g. `egress-self-only`.
    pub name: &'static str,
    /// One-line statement of what must hold.
    pub summary: &'static str,
    pub passed: bool,
    /// Why the check failed. Empty when it passed.
    pub issues: Vec<String>,
}

/// Every check run against one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityReport {
    pub region: String,
    pub checks: Vec<CheckResult>,
}

impl ReachabilityReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Failing checks' issues, prefixed with the check name.
    #[must_use]
    pub fn collect_issues(&self) -> Vec<String> {
        self.checks
            .iter()
            .flat_map(|c| c.issues.iter().map(move |i| format!("{}: {i}", c.name)))
            .collect()
    }
}

// ── Template view ─────────────────────────────────────────────────────────────

/// Typed slices of the template the checks work on.
struct View {
    groups: BTreeMap<String, SecurityGroupProperties>,
    egress: Vec<(String, StandaloneRuleProperties)>,
    ingress: Vec<(String, StandaloneRuleProperties)>,
    subnets: BTreeMap<String, SubnetProperties>,
    routes: Vec<(String, RouteProperties)>,
    associations: Vec<(String, SubnetRouteTableAssociationProperties)>,
    cidr_blocks: Vec<(String, VpcCidrBlockProperties)>,
    instances: Vec<(String, InstanceProperties)>,
    profiles: BTreeMap<String, InstanceProfileProperties>,
    roles: BTreeMap<String, IamRoleProperties>,
    endpoints: Vec<(String, VpcEndpointProperties)>,
}

impl View {
    fn new(template: &Template) -> Result<Self, TemplateError> {
        Ok(Self {
            groups: template.typed(&ResourceType::SecurityGroup)?.into_iter().collect(),
            egress: template.typed(&ResourceType::SecurityGroupEgress)?,
            ingress: template.typed(&ResourceType::SecurityGroupIngress)?,
            subnets: template.typed(&ResourceType::Subnet)?.into_iter().collect(),
            routes: template.typed(&ResourceType::Route)?,
            associations: template.typed(&ResourceType::SubnetRouteTableAssociation)?,
            cidr_blocks: template.typed(&ResourceType::VpcCidrBlock)?,
            instances: template.typed(&ResourceType::Instance)?,
            profiles: template.typed(&ResourceType::InstanceProfile)?.into_iter().collect(),
            roles: template.typed(&ResourceType::IamRole)?.into_iter().collect(),
            endpoints: template.typed(&ResourceType::VpcEndpoint)?,
        })
    }

    /// Egress rules that actually permit traffic out of `group`.
    fn egress_of(&self, group: &str) -> Vec<&SecurityGroupRule> {
        let inline = self
            .groups
            .get(group)
            .map(|g| g.security_group_egress.iter())
            .into_iter()
            .flatten()
            .filter(|r| !is_placeholder(r));
        let standalone = self
            .egress
            .iter()
            .filter(|(_, r)| r.group_id.referenced_id() == Some(group))
            .map(|(_, r)| &r.rule);
        inline.chain(standalone).collect()
    }

    fn ingress_of(&self, group: &str) -> Vec<&SecurityGroupRule> {
        let inline = self
            .groups
            .get(group)
            .map(|g| g.security_group_ingress.iter())
            .into_iter()
            .flatten();
        let standalone = self
            .ingress
            .iter()
            .filter(|(_, r)| r.group_id.referenced_id() == Some(group))
            .map(|(_, r)| &r.rule);
        inline.chain(standalone).collect()
    }

    /// Routes in effect for `subnet`. A subnet with no explicit association
    /// uses the VPC's main table, so every route not bound to an associated
    /// table may apply to it.
    fn routes_of(&self, subnet: &str) -> Vec<(&str, &RouteProperties)> {
        let associated: BTreeSet<&str> = self
            .associations
            .iter()
            .filter_map(|(_, a)| a.route_table_id.referenced_id())
            .collect();
        let own: BTreeSet<&str> = self
            .associations
            .iter()
            .filter(|(_, a)| a.subnet_id.referenced_id() == Some(subnet))
            .filter_map(|(_, a)| a.route_table_id.referenced_id())
            .collect();
        self.routes
            .iter()
            .filter(|(_, r)| {
                let table = r.route_table_id.referenced_id();
                if own.is_empty() {
                    table.is_none_or(|t| !associated.contains(t))
                } else {
                    table.is_none_or(|t| own.contains(t))
                }
            })
            .map(|(id, r)| (id.as_str(), r))
            .collect()
    }
}

fn is_placeholder(rule: &SecurityGroupRule) -> bool {
    rule.ip_protocol == placeholder::PROTOCOL
        && rule.cidr_ip.as_ref().and_then(Expr::as_literal) == Some(placeholder::CIDR)
}

/// Exactly the session port over TCP, nothing wider.
fn is_session_port(rule: &SecurityGroupRule) -> bool {
    let port = Some(i32::from(HTTPS.number));
    matches!(rule.ip_protocol.as_str(), "tcp" | "6") && rule.from_port == port && rule.to_port == port
}

fn describe_ports(rule: &SecurityGroupRule) -> String {
    match (rule.ip_protocol.as_str(), rule.from_port, rule.to_port) {
        ("-1", _, _) => "all traffic".to_string(),
        (protocol, Some(from), Some(to)) if from == to => format!("{protocol}/{from}"),
        (protocol, Some(from), Some(to)) => format!("{protocol}/{from}-{to}"),
        (protocol, _, _) => format!("{protocol}/all ports"),
    }
}

fn covers_port(rule: &SecurityGroupRule, port: u16) -> bool {
    let protocol_ok = matches!(rule.ip_protocol.as_str(), "tcp" | "6" | "-1");
    let port = i32::from(port);
    let from = rule.from_port.unwrap_or(0);
    let to = rule.to_port.unwrap_or(65535);
    protocol_ok && (rule.ip_protocol == "-1" || (from..=to).contains(&port))
}

fn referenced_ids(exprs: &[Expr]) -> BTreeSet<&str> {
    exprs.iter().filter_map(Expr::referenced_id).collect()
}

fn check(
    name: &'static str,
    summary: &'static str,
    issues: Vec<String>,
) -> CheckResult {
    CheckResult {
        name,
        summary,
        passed: issues.is_empty(),
        issues,
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Run every check against `template`.
///
/// # Errors
///
/// Returns an error if a resource of a checked type has malformed properties.
pub fn analyze(template: &Template, region: &Region) -> Result<ReachabilityReport, TemplateError> {
    let view = View::new(template)?;
    Ok(ReachabilityReport {
        region: region.to_string(),
        checks: vec![
            check(
                "no-internet-path",
                "No gateway, NAT, declared route or public address anywhere in the network",
                no_internet_path(template, &view),
            ),
            check(
                "egress-self-only",
                "Every security group's egress is TCP/443 to members of that group only",
                egress_self_only(&view),
            ),
            check(
                "instance-placement",
                "Exactly one instance, in an isolated subnet, behind a security group",
                instance_placement(&view),
            ),
            check(
                "instance-role",
                "The instance role is trusted by EC2 and carries the session-management policy",
                instance_role(&view),
            ),
            check(
                "endpoint-set",
                "One interface endpoint per session sub-service, all in one region",
                endpoint_set(&view, region),
            ),
            check(
                "private-dns",
                "Every endpoint has private DNS enabled",
                private_dns(&view),
            ),
            check(
                "session-coupling",
                "The instance's egress target guards every endpoint and accepts the endpoint port",
                session_coupling(&view),
            ),
            check(
                "instance-output",
                "The stack exports the instance id",
                instance_output(template, &view),
            ),
        ],
    })
}

// ── Checks ────────────────────────────────────────────────────────────────────

fn no_internet_path(template: &Template, view: &View) -> Vec<String> {
    let mut issues = Vec::new();
    for forbidden in [
        ResourceType::InternetGateway,
        ResourceType::VpcGatewayAttachment,
        ResourceType::NatGateway,
        ResourceType::EgressOnlyInternetGateway,
    ] {
        for (id, _) in template.resources_of(&forbidden) {
            issues.push(format!("{id} is a {forbidden}"));
        }
    }
    for (id, block) in &view.cidr_blocks {
        if block.amazon_provided_ipv6_cidr_block || block.ipv6_cidr_block.is_some() {
            issues.push(format!("{id} gives the VPC public IPv6 addresses"));
        }
    }
    // The local route is implicit, so any declared route leads somewhere else.
    for (id, route) in &view.routes {
        issues.push(format!(
            "route {id} sends {} to {}",
            route.destination(),
            route.target_kind()
        ));
    }
    for (id, subnet) in &view.subnets {
        if subnet.map_public_ip_on_launch {
            issues.push(format!("subnet {id} assigns public IPs on launch"));
        }
    }
    issues
}

fn egress_self_only(view: &View) -> Vec<String> {
    let mut issues = Vec::new();
    if view.groups.is_empty() {
        issues.push("template has no security group".to_string());
    }
    for (id, group) in &view.groups {
        if group.security_group_egress.is_empty() {
            issues.push(format!(
                "{id} declares no egress and falls back to allow-all"
            ));
        }
        for rule in view.egress_of(id) {
            let to_self = rule.destination_security_group_id.as_ref().and_then(Expr::referenced_id)
                == Some(id.as_str());
            let elsewhere = rule
                .cidr_ip
                .as_ref()
                .or(rule.cidr_ipv6.as_ref())
                .or(rule.destination_prefix_list_id.as_ref());
            if !to_self || elsewhere.is_some() {
                let target = elsewhere
                    .map(|e| e.as_literal().unwrap_or("an address range"))
                    .unwrap_or("another group");
                issues.push(format!("{id} permits egress to {target}"));
            } else if !is_session_port(rule) {
                issues.push(format!(
                    "{id} permits {} to itself, only tcp/{} is allowed",
                    describe_ports(rule),
                    HTTPS.number
                ));
            }
        }
    }
    issues
}

fn instance_placement(view: &View) -> Vec<String> {
    let mut issues = Vec::new();
    if view.instances.len() != 1 {
        issues.push(format!("expected one instance, found {}", view.instances.len()));
    }
    for (id, instance) in &view.instances {
        match instance.subnet_id.referenced_id() {
            Some(subnet_id) => match view.subnets.get(subnet_id) {
                Some(subnet) => {
                    if subnet.map_public_ip_on_launch {
                        issues.push(format!("{id} sits in {subnet_id}, which assigns public IPs"));
                    }
                    for (route, props) in view.routes_of(subnet_id) {
                        issues.push(format!(
                            "{id} sits in {subnet_id}, which is not isolated: route {route} sends {} to {}",
                            props.destination(),
                            props.target_kind()
                        ));
                    }
                }
                None => issues.push(format!("{id} is placed in unknown subnet {subnet_id}")),
            },
            None => issues.push(format!("{id} is not placed in a subnet of this stack")),
        }
        let groups = referenced_ids(&instance.security_group_ids);
        if groups.is_empty() {
            issues.push(format!("{id} has no security group"));
        }
        for group in groups {
            if !view.groups.contains_key(group) {
                issues.push(format!("{id} references unknown security group {group}"));
            }
        }
    }
    issues
}

fn instance_role(view: &View) -> Vec<String> {
    let mut issues = Vec::new();
    for (id, instance) in &view.instances {
        let Some(profile) = instance
            .iam_instance_profile
            .as_ref()
            .and_then(Expr::referenced_id)
            .and_then(|p| view.profiles.get(p))
        else {
            issues.push(format!("{id} has no instance profile"));
            continue;
        };
        let roles: Vec<_> = referenced_ids(&profile.roles)
            .into_iter()
            .filter_map(|r| view.roles.get(r))
            .collect();
        if roles.is_empty() {
            issues.push(format!("{id}'s instance profile carries no role"));
        }
        for role in roles {
            let trusted = role
                .assume_role_policy_document
                .statement
                .iter()
                .any(|s| s.effect == "Allow" && s.principal.service == EC2_SERVICE_PRINCIPAL);
            if !trusted {
                issues.push(format!("{id}'s role is not assumable by {EC2_SERVICE_PRINCIPAL}"));
            }
            let partition = |name: &str| (name == AWS_PARTITION).then(|| "aws".to_string());
            let has_policy = role.managed_policy_arns.iter().any(|arn| {
                arn.evaluate(&partition)
                    .is_some_and(|a| a.ends_with(&format!(":policy/{SSM_MANAGED_POLICY}")))
            });
            if !has_policy {
                issues.push(format!("{id}'s role lacks {SSM_MANAGED_POLICY}"));
            }
        }
    }
    issues
}

fn endpoint_set(view: &View, region: &Region) -> Vec<String> {
    let mut issues = Vec::new();
    let resolved_region = region.known().unwrap_or(UNRESOLVED_REGION).to_string();
    let pseudo = move |name: &str| match name {
        AWS_REGION => Some(resolved_region.clone()),
        AWS_PARTITION => Some("aws".to_string()),
        _ => None,
    };

    let mut regions = BTreeSet::new();
    let mut suffixes: BTreeMap<String, usize> = BTreeMap::new();
    for (id, endpoint) in &view.endpoints {
        if endpoint.vpc_endpoint_type != "Interface" {
            issues.push(format!(
                "{id} is a {} endpoint, not Interface",
                endpoint.vpc_endpoint_type
            ));
        }
        let Some(name) = endpoint.service_name.evaluate(&pseudo) else {
            issues.push(format!("{id} has an unresolvable service name"));
            continue;
        };
        let Some((r, suffix)) = parse_service_name(&name) else {
            issues.push(format!("{id} has a foreign service name {name}"));
            continue;
        };
        regions.insert(r.to_string());
        *suffixes.entry(suffix.to_string()).or_default() += 1;
    }

    for expected in SESSION_SUBSERVICES {
        match suffixes.get(expected).copied().unwrap_or(0) {
            1 => {}
            0 => issues.push(format!("no endpoint for {expected}")),
            n => issues.push(format!("{n} endpoints for {expected}")),
        }
    }
    for extra in suffixes.keys() {
        if !SESSION_SUBSERVICES.contains(&extra.as_str()) {
            issues.push(format!("unexpected endpoint for {extra}"));
        }
    }
    if regions.len() > 1 {
        let listed: Vec<_> = regions.iter().map(String::as_str).collect();
        issues.push(format!("endpoints span regions: {}", listed.join(", ")));
    }
    if let (Some(expected), Some(actual)) = (region.known(), regions.iter().next())
        && actual != expected
    {
        issues.push(format!("endpoints target {actual}, stack deploys to {expected}"));
    }
    issues
}

fn private_dns(view: &View) -> Vec<String> {
    view.endpoints
        .iter()
        .filter(|(_, e)| !e.private_dns_enabled)
        .map(|(id, _)| format!("{id} has private DNS disabled"))
        .collect()
}

fn session_coupling(view: &View) -> Vec<String> {
    let mut issues = Vec::new();
    let port = HTTPS.number;

    // Groups the instance may send HTTPS to, through its own groups' egress.
    let mut targets = BTreeSet::new();
    for (_, instance) in &view.instances {
        for group in referenced_ids(&instance.security_group_ids) {
            for rule in view.egress_of(group) {
                if covers_port(rule, port)
                    && let Some(target) = rule
                        .destination_security_group_id
                        .as_ref()
                        .and_then(Expr::referenced_id)
                {
                    targets.insert(target.to_string());
                }
            }
        }
    }
    if targets.is_empty() {
        issues.push(format!("the instance has no egress on port {port}"));
        return issues;
    }

    for (id, endpoint) in &view.endpoints {
        let guards = referenced_ids(&endpoint.security_group_ids);
        let reachable = targets.iter().any(|t| {
            guards.contains(t.as_str()) && view.ingress_of(t).iter().any(|r| covers_port(r, port))
        });
        if !reachable {
            issues.push(format!(
                "{id} is not guarded by a group the instance can reach on port {port}"
            ));
        }
    }
    issues
}

fn instance_output(template: &Template, view: &View) -> Vec<String> {
    let Some(output) = template.outputs.get(INSTANCE_ID_OUTPUT) else {
        return vec![format!("missing output {INSTANCE_ID_OUTPUT}")];
    };
    let target = output.value.referenced_id();
    if view.instances.iter().any(|(id, _)| Some(id.as_str()) == target) {
        Vec::new()
    } else {
        vec![format!("{INSTANCE_ID_OUTPUT} does not reference the instance")]
    }
}

// ── Unit tests ────────────────────────────────────────────────────────────────
