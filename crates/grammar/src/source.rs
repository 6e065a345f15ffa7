use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The source a grammar-built dispatcher runs commands for.
///
/// `name` is what `as` and `split` modifiers rewrite; `permissions` is what
/// a node's `requires` is checked against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrammarSource {
    /// Display name of the executing entity.
    pub name: String,
    /// Granted permission strings.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl GrammarSource {
    /// A source with no permissions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: BTreeSet::new(),
        }
    }

    /// Grant `permission`.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Whether `permission` was granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// The same permissions under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: self.permissions.clone(),
        }
    }
}
