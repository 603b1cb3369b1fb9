//! Tekton PipelineRun domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::meta::{NamespacedName, ObjectMeta};

/// Condition type reporting the overall outcome of a run
pub const CONDITION_SUCCEEDED: &str = "Succeeded";

/// Spec status value requesting cancellation
pub const SPEC_STATUS_CANCELLED: &str = "Cancelled";

/// A single workflow run
///
/// Created and mutated by Tekton; the triggers only read it and append to its
/// labels and annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PipelineRunSpec,
    #[serde(default)]
    pub status: PipelineRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_ref: Option<PipelineRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Reference to the Pipeline definition a run follows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Resolved pipeline, populated by Tekton once the run is admitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<PipelineSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,
}

/// Reference to a task, either a Tekton Task or a custom task kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl PipelineRun {
    /// Creates a run in `namespace` following the Pipeline `pipeline`
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, pipeline: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: PipelineRunSpec {
                pipeline_ref: Some(PipelineRef {
                    name: pipeline.to_string(),
                }),
                ..Default::default()
            },
            status: PipelineRunStatus::default(),
        }
    }

    pub fn namespaced_name(&self) -> NamespacedName {
        self.metadata.namespaced_name()
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.metadata.labels
    }

    /// The `Succeeded` condition, when Tekton has reported one
    pub fn succeeded_condition(&self) -> Option<&Condition> {
        self.status
            .conditions
            .iter()
            .find(|c| c.type_ == CONDITION_SUCCEEDED)
    }

    /// Completed, either way
    pub fn is_done(&self) -> bool {
        self.succeeded_condition()
            .is_some_and(|c| c.status != ConditionStatus::Unknown)
    }

    pub fn is_succeeded(&self) -> bool {
        self.succeeded_condition()
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    pub fn is_cancelled(&self) -> bool {
        self.spec.status.as_deref() == Some(SPEC_STATUS_CANCELLED)
    }

    pub fn has_started(&self) -> bool {
        self.status.start_time.is_some()
    }

    /// Records a terminal `Succeeded` condition
    pub fn mark_succeeded(&mut self, reason: &str, message: &str) {
        self.set_succeeded_condition(ConditionStatus::True, reason, message);
    }

    /// Records a terminal failed `Succeeded` condition
    pub fn mark_failed(&mut self, reason: &str, message: &str) {
        self.set_succeeded_condition(ConditionStatus::False, reason, message);
    }

    fn set_succeeded_condition(&mut self, status: ConditionStatus, reason: &str, message: &str) {
        self.status
            .conditions
            .retain(|c| c.type_ != CONDITION_SUCCEEDED);
        self.status.conditions.push(Condition {
            type_: CONDITION_SUCCEEDED.to_string(),
            status,
            reason: reason.to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pipeline_run_has_pipeline_ref() {
        let pr = PipelineRun::new("default", "run-1", "pipeline");
        assert_eq!(pr.spec.pipeline_ref.unwrap().name, "pipeline");
        assert!(pr.status.pipeline_spec.is_none());
    }

    #[test]
    fn test_done_and_succeeded_flags() {
        let mut pr = PipelineRun::new("default", "run-1", "pipeline");
        assert!(!pr.is_done());

        pr.status.conditions.push(Condition {
            type_: CONDITION_SUCCEEDED.to_string(),
            status: ConditionStatus::Unknown,
            reason: "Running".to_string(),
            message: String::new(),
        });
        assert!(!pr.is_done());

        pr.mark_failed("Failed", "boom");
        assert!(pr.is_done());
        assert!(!pr.is_succeeded());
        assert_eq!(pr.status.conditions.len(), 1);

        pr.mark_succeeded("Succeeded", "ok");
        assert!(pr.is_done());
        assert!(pr.is_succeeded());
    }

    #[test]
    fn test_cancelled_flag() {
        let mut pr = PipelineRun::new("default", "run-1", "pipeline");
        assert!(!pr.is_cancelled());

        pr.spec.status = Some(SPEC_STATUS_CANCELLED.to_string());
        assert!(pr.is_cancelled());
    }

    #[test]
    fn test_deserialize_from_json() {
        let pr: PipelineRun = serde_json::from_value(serde_json::json!({
            "metadata": { "namespace": "default", "name": "run-1", "labels": { "app": "web" } },
            "spec": { "pipelineRef": { "name": "pipeline" } },
            "status": {
                "startTime": "2024-01-01T00:00:00Z",
                "pipelineSpec": {
                    "tasks": [
                        { "name": "build", "taskRef": { "apiVersion": "shipwright.io/v1alpha1", "kind": "Build", "name": "b" } }
                    ]
                }
            }
        }))
        .unwrap();

        assert!(pr.has_started());
        assert_eq!(pr.labels().get("app"), Some(&"web".to_string()));
        let pipeline_spec = pr.status.pipeline_spec.unwrap();
        assert_eq!(pipeline_spec.tasks[0].task_ref.as_ref().unwrap().kind, "Build");
    }
}
