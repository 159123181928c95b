// ── Client-side resource filtering ──

use serde::{Deserialize, Serialize};

use crate::model::{Resource, ResourceKind};

/// Which resources are shown. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    pub kind: Option<ResourceKind>,
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
}

impl ResourceFilter {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.name_contains.as_deref().is_none_or(str::is_empty)
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        if self.kind.is_some_and(|k| k != resource.kind()) {
            return false;
        }
        match self.name_contains.as_deref() {
            Some(needle) if !needle.is_empty() => resource
                .name()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }
}
