//! Tekton CustomRun domain types
//!
//! A CustomRun is a single custom-task invocation bound to one `TaskRef`.
//! When that reference points at a Shipwright Build, the triggers issue a
//! BuildRun for it and stash the BuildRun identity in `status.extra_fields`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::meta::{NamespacedName, ObjectMeta};
use super::pipeline_run::TaskRef;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomRun {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: CustomRunSpec,
    #[serde(default)]
    pub status: CustomRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_ref: Option<TaskRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRunStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Opaque payload owned by the custom-task controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_fields: Option<serde_json::Value>,
}

impl CustomRun {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, custom_ref: TaskRef) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: CustomRunSpec {
                custom_ref: Some(custom_ref),
            },
            status: CustomRunStatus::default(),
        }
    }

    pub fn namespaced_name(&self) -> NamespacedName {
        self.metadata.namespaced_name()
    }

    pub fn has_started(&self) -> bool {
        self.status.start_time.is_some()
    }
}

impl CustomRunStatus {
    /// Number of top-level entries in the extra fields payload
    ///
    /// `null` and absent payloads count as zero.
    pub fn extra_fields_size(&self) -> usize {
        match &self.extra_fields {
            None | Some(serde_json::Value::Null) => 0,
            Some(serde_json::Value::Object(map)) => map.len(),
            Some(serde_json::Value::Array(items)) => items.len(),
            Some(serde_json::Value::String(s)) => s.len(),
            Some(_) => 1,
        }
    }
}
