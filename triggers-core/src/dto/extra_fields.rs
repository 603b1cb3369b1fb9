//! Structured payload stored in a CustomRun's extra fields

use serde::{Deserialize, Serialize};

use crate::domain::meta::NamespacedName;

/// Identity of the BuildRun created on behalf of a CustomRun
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraFields {
    #[serde(default, rename = "buildRunNamespace")]
    pub namespace: String,
    #[serde(default, rename = "buildRunName")]
    pub name: String,
}

impl ExtraFields {
    pub fn new(namespaced_name: &NamespacedName) -> Self {
        Self {
            namespace: namespaced_name.namespace.clone(),
            name: namespaced_name.name.clone(),
        }
    }

    /// Either attribute is blank
    pub fn is_empty(&self) -> bool {
        self.namespace.is_empty() || self.name.is_empty()
    }

    pub fn namespaced_name(&self) -> NamespacedName {
        NamespacedName::new(self.namespace.clone(), self.name.clone())
    }
}
