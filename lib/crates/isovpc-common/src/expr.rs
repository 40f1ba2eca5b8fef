use serde::{Deserialize, Serialize};

/// Pseudo parameter resolving to the region the stack is deployed in.
pub const AWS_REGION: &str = "AWS::Region";

/// Pseudo parameter resolving to the partition (`aws`, `aws-cn`, ...).
pub const AWS_PARTITION: &str = "AWS::Partition";

/// A template value: either a literal string or an intrinsic function.
///
/// Serializes to the JSON shapes CloudFormation expects, e.g.
/// `{"Ref": "vpc"}` or `{"Fn::GetAtt": ["vpc", "CidrBlock"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expr {
    Literal(String),
    Ref {
        #[serde(rename = "Ref")]
        target: String,
    },
    GetAtt {
        #[serde(rename = "Fn::GetAtt")]
        target: (String, String),
    },
    Join {
        #[serde(rename = "Fn::Join")]
        parts: (String, Vec<Expr>),
    },
    Select {
        #[serde(rename = "Fn::Select")]
        choice: (u32, Box<Expr>),
    },
    GetAzs {
        #[serde(rename = "Fn::GetAZs")]
        region: String,
    },
}

impl Default for Expr {
    fn default() -> Self {
        Self::Literal(String::new())
    }
}

impl Expr {
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// `{"Ref": id}`: a resource's primary identifier or a parameter's value.
    #[must_use]
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Ref { target: id.into() }
    }

    #[must_use]
    pub fn get_att(id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            target: (id.into(), attribute.into()),
        }
    }

    #[must_use]
    pub fn join(separator: impl Into<String>, parts: Vec<Expr>) -> Self {
        Self::Join {
            parts: (separator.into(), parts),
        }
    }

    #[must_use]
    pub fn select(index: u32, list: Expr) -> Self {
        Self::Select {
            choice: (index, Box::new(list)),
        }
    }

    /// Availability zones of the deployment region.
    #[must_use]
    pub fn azs() -> Self {
        Self::GetAzs {
            region: String::new(),
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Logical id this value points at through `Ref` or `Fn::GetAtt`.
    #[must_use]
    pub fn referenced_id(&self) -> Option<&str> {
        match self {
            Self::Ref { target } => Some(target),
            Self::GetAtt { target } => Some(&target.0),
            _ => None,
        }
    }

    /// Reduce to a plain string when every leaf is a literal or a pseudo
    /// parameter known to `pseudo`. Resource references never resolve.
    #[must_use]
    pub fn evaluate(&self, pseudo: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        match self {
            Self::Literal(s) => Some(s.clone()),
            Self::Ref { target } if target.starts_with("AWS::") => pseudo(target),
            Self::Join { parts: (sep, items) } => {
                let rendered = items
                    .iter()
                    .map(|item| item.evaluate(pseudo))
                    .collect::<Option<Vec<_>>>()?;
                Some(rendered.join(sep))
            }
            _ => None,
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}
