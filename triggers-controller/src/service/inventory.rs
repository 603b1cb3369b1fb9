//! Build inventory
//!
//! Keeps the `when` triggers declared by Builds and matches `ObjectRef`s
//! against them.

use async_trait::async_trait;
use std::sync::RwLock;
use triggers_core::domain::meta::NamespacedName;
use triggers_core::dto::object_ref::ObjectRef;

use crate::error::StoreError;

/// Service trait for looking up Builds triggered by an `ObjectRef`
#[async_trait]
pub trait BuildInventory: Send + Sync {
    /// Returns the Builds in `namespace` whose triggers match `object_ref`
    async fn search_for_object_ref(
        &self,
        namespace: &str,
        object_ref: &ObjectRef,
    ) -> Result<Vec<NamespacedName>, StoreError>;
}

/// Pipeline triggers declared by a single Build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTrigger {
    pub build: NamespacedName,
    pub when: Vec<ObjectRef>,
}

impl BuildTrigger {
    /// Whether any `when` entry matches the `ObjectRef`
    ///
    /// An entry matches on the same Pipeline name, a shared status (an empty
    /// status list matches any), and a selector fully contained in the
    /// `ObjectRef` selector.
    pub fn matches(&self, object_ref: &ObjectRef) -> bool {
        self.when.iter().any(|when| {
            when.name == object_ref.name
                && (when.status.is_empty()
                    || when.status.iter().any(|s| object_ref.status.contains(s)))
                && when
                    .selector
                    .iter()
                    .all(|(k, v)| object_ref.selector.get(k) == Some(v))
        })
    }
}

/// In-memory implementation of BuildInventory
#[derive(Default)]
pub struct InMemoryInventory {
    triggers: RwLock<Vec<BuildTrigger>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the triggers of a Build
    pub fn add(&self, trigger: BuildTrigger) {
        let mut triggers = self.triggers.write().unwrap_or_else(|e| e.into_inner());
        triggers.retain(|t| t.build != trigger.build);
        triggers.push(trigger);
    }

    /// Forgets a Build
    pub fn remove(&self, build: &NamespacedName) {
        let mut triggers = self.triggers.write().unwrap_or_else(|e| e.into_inner());
        triggers.retain(|t| &t.build != build);
    }
}

#[async_trait]
impl BuildInventory for InMemoryInventory {
    async fn search_for_object_ref(
        &self,
        namespace: &str,
        object_ref: &ObjectRef,
    ) -> Result<Vec<NamespacedName>, StoreError> {
        let triggers = self.triggers.read().unwrap_or_else(|e| e.into_inner());
        let mut builds: Vec<NamespacedName> = triggers
            .iter()
            .filter(|t| t.build.namespace == namespace && t.matches(object_ref))
            .map(|t| t.build.clone())
            .collect();
        builds.sort();
        Ok(builds)
    }
}
