//! Shipwright BuildRun domain types

use serde::{Deserialize, Serialize};

use super::meta::{NamespacedName, ObjectMeta, OwnerReference};

/// An issued build request
///
/// Created by the triggers from an `ObjectRef` match; executing it is the
/// build engine's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildRun {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BuildRunSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRunSpec {
    pub build_name: String,
}

impl BuildRun {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, build_name: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: BuildRunSpec {
                build_name: build_name.to_string(),
            },
        }
    }

    /// Adds an owner reference
    pub fn with_owner(mut self, owner: OwnerReference) -> Self {
        self.metadata.owner_references.push(owner);
        self
    }

    pub fn namespaced_name(&self) -> NamespacedName {
        self.metadata.namespaced_name()
    }
}
