//! Structural comparison of two templates.

use std::collections::BTreeMap;

use isovpc_common::{Resource, Template};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    /// Same type, different properties or dependencies.
    Modified,
    /// Type changed: the engine deletes and recreates the resource.
    Replaced,
}

impl ChangeKind {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Added => "+",
            Self::Removed => "-",
            Self::Modified => "~",
            Self::Replaced => "±",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceChange {
    pub logical_id: String,
    pub resource_type: String,
    pub kind: ChangeKind,
    /// Top-level property keys that differ. Empty for adds and removes.
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputChange {
    pub name: String,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateDiff {
    pub resources: Vec<ResourceChange>,
    pub outputs: Vec<OutputChange>,
    pub parameters_changed: bool,
}

impl TemplateDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.outputs.is_empty() && !self.parameters_changed
    }
}

/// What changes if `current` is replaced by `proposed`.
#[must_use]
pub fn diff(current: &Template, proposed: &Template) -> TemplateDiff {
    let mut resources = Vec::new();

    for (id, old) in &current.resources {
        match proposed.resources.get(id) {
            None => resources.push(ResourceChange {
                logical_id: id.clone(),
                resource_type: old.resource_type.to_string(),
                kind: ChangeKind::Removed,
                properties: Vec::new(),
            }),
            Some(new) if new.resource_type != old.resource_type => {
                resources.push(ResourceChange {
                    logical_id: id.clone(),
                    resource_type: new.resource_type.to_string(),
                    kind: ChangeKind::Replaced,
                    properties: Vec::new(),
                });
            }
            Some(new) => {
                let properties = changed_properties(old, new);
                if !properties.is_empty() || old.depends_on != new.depends_on {
                    resources.push(ResourceChange {
                        logical_id: id.clone(),
                        resource_type: new.resource_type.to_string(),
                        kind: ChangeKind::Modified,
                        properties,
                    });
                }
            }
        }
    }
    for (id, new) in &proposed.resources {
        if !current.resources.contains_key(id) {
            resources.push(ResourceChange {
                logical_id: id.clone(),
                resource_type: new.resource_type.to_string(),
                kind: ChangeKind::Added,
                properties: Vec::new(),
            });
        }
    }
    resources.sort_by(|a, b| a.logical_id.cmp(&b.logical_id));

    TemplateDiff {
        resources,
        outputs: diff_keys(&current.outputs, &proposed.outputs),
        parameters_changed: current.parameters != proposed.parameters,
    }
}

fn changed_properties(old: &Resource, new: &Resource) -> Vec<String> {
    let mut keys: Vec<String> = old
        .properties
        .keys()
        .chain(new.properties.keys())
        .filter(|k| old.properties.get(*k) != new.properties.get(*k))
        .cloned()
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

fn diff_keys<V: PartialEq>(
    current: &BTreeMap<String, V>,
    proposed: &BTreeMap<String, V>,
) -> Vec<OutputChange> {
    let mut changes = Vec::new();
    for (name, old) in current {
        match proposed.get(name) {
            None => changes.push(OutputChange {
                name: name.clone(),
                kind: ChangeKind::Removed,
            }),
            Some(new) if new != old => changes.push(OutputChange {
                name: name.clone(),
                kind: ChangeKind::Modified,
            }),
            Some(_) => {}
        }
    }
    for name in proposed.keys() {
        if !current.contains_key(name) {
            changes.push(OutputChange {
                name: name.clone(),
                kind: ChangeKind::Added,
            });
        }
    }
    changes.sort_by(|a, b| a.name.cmp(&b.name));
    changes
}
