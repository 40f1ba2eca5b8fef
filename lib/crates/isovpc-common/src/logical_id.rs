//! Logical id allocation for template resources.
//!
//! Ids are derived from the construct path (`["vpc", "IsolatedSubnet1", "Subnet"]`)
//! so they stay stable across syntheses: the alphanumeric parts are
//! concatenated and, for nested paths, suffixed with the first 8 hex digits
//! of the SHA-256 of the `/`-joined path.

use std::fmt;

use sha2::{Digest, Sha256};

/// Path components that carry no meaning in the human-readable part.
const HIDDEN_COMPONENTS: &[&str] = &["Default", "Resource"];

/// CloudFormation's logical id length limit.
const MAX_LEN: usize = 255;
const HASH_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalId(String);

impl LogicalId {
    /// Allocate the id for a construct path.
    ///
    /// A single-component path is used as-is (after sanitizing), which is
    /// how top-level outputs keep readable names like `InstanceId`.
    #[must_use]
    pub fn from_path(path: &[&str]) -> Self {
        if let [single] = path {
            return Self(sanitize(single).chars().take(MAX_LEN).collect());
        }

        let human: String = path
            .iter()
            .filter(|c| !HIDDEN_COMPONENTS.contains(*c))
            .map(|c| sanitize(c))
            .collect();
        let human: String = human.chars().take(MAX_LEN - HASH_LEN).collect();

        Self(format!("{human}{}", path_hash(path)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<LogicalId> for String {
    fn from(id: LogicalId) -> Self {
        id.0
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn path_hash(path: &[&str]) -> String {
    let digest = Sha256::digest(path.join("/").as_bytes());
    digest
        .iter()
        .take(HASH_LEN / 2)
        .map(|b| format!("{b:02X}"))
        .collect()
}
