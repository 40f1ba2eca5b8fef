//! The single managed instance and its execution role.

use isovpc_common::{AWS_PARTITION, Expr};

use crate::domain::network::SubnetKind;

pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// Public SSM parameter tracking the latest Amazon Linux 2023 AMI.
pub const AL2023_IMAGE_PARAMETER: &str =
    "/aws/service/ami-amazon-linux-latest/al2023-ami-kernel-default-x86_64";

/// Managed policy granting Session Manager control of the instance.
pub const SSM_MANAGED_POLICY: &str = "AmazonSSMManagedInstanceCore";

pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";

/// Where the instance's image id comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineImage {
    /// Resolved at deploy time from an SSM parameter.
    SsmParameter(String),
    /// A fixed AMI id.
    AmiId(String),
}

impl MachineImage {
    #[must_use]
    pub fn latest_amazon_linux_2023() -> Self {
        Self::SsmParameter(AL2023_IMAGE_PARAMETER.to_string())
    }

    /// Interpret a configured image: paths are SSM parameters, `ami-` ids are literal.
    #[must_use]
    pub fn from_config(raw: &str) -> Self {
        if raw.starts_with("ami-") {
            Self::AmiId(raw.to_string())
        } else {
            Self::SsmParameter(raw.to_string())
        }
    }
}

/// An AWS managed IAM policy referenced by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicy {
    name: String,
}

impl ManagedPolicy {
    #[must_use]
    pub fn aws_managed(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `arn:<partition>:iam::aws:policy/<name>`, partition-agnostic.
    #[must_use]
    pub fn arn(&self) -> Expr {
        Expr::join(
            "",
            vec![
                Expr::literal("arn:"),
                Expr::reference(AWS_PARTITION),
                Expr::literal(format!(":iam::aws:policy/{}", self.name)),
            ],
        )
    }
}

/// The compute instance. Always placed in isolated subnets and always
/// carrying the session-management grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    instance_type: String,
    image: MachineImage,
    subnet_selection: SubnetKind,
    managed_policies: Vec<ManagedPolicy>,
}

impl InstanceSpec {
    #[must_use]
    pub fn new(instance_type: impl Into<String>, image: MachineImage) -> Self {
        Self {
            instance_type: instance_type.into(),
            image,
            subnet_selection: SubnetKind::Isolated,
            managed_policies: vec![ManagedPolicy::aws_managed(SSM_MANAGED_POLICY)],
        }
    }

    #[must_use]
    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    #[must_use]
    pub fn image(&self) -> &MachineImage {
        &self.image
    }

    #[must_use]
    pub fn subnet_selection(&self) -> SubnetKind {
        self.subnet_selection
    }

    #[must_use]
    pub fn managed_policies(&self) -> &[ManagedPolicy] {
        &self.managed_policies
    }
}

impl Default for InstanceSpec {
    fn default() -> Self {
        Self::new(
            DEFAULT_INSTANCE_TYPE,
            MachineImage::latest_amazon_linux_2023(),
        )
    }
}
