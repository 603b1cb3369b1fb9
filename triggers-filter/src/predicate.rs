//! Eligibility predicate
//!
//! Decides which objects go through PipelineRun reconciliation. PipelineRuns
//! expanded from a Shipwright custom task are skipped, re-triggering those
//! would loop forever.

use tracing::{error, info};
use triggers_core::domain::object::Object;
use triggers_core::domain::pipeline_run::PipelineRun;

use crate::keys::TriggerKeys;

/// Checks if the PipelineRun refers to a Shipwright resource via `TaskRef`
pub fn pipeline_run_references_shipwright(keys: &TriggerKeys, pipeline_run: &PipelineRun) -> bool {
    let Some(pipeline_spec) = &pipeline_run.status.pipeline_spec else {
        return false;
    };

    pipeline_spec
        .tasks
        .iter()
        .filter_map(|task| task.task_ref.as_ref())
        .any(|task_ref| task_ref.api_version == keys.shipwright_api_version)
}

/// Event filter for watched objects
///
/// Only PipelineRuns pass; any other shape is logged as an error and rejected.
pub fn event_filter_predicate(keys: &TriggerKeys, obj: &Object) -> bool {
    let Some(pipeline_run) = obj.as_pipeline_run() else {
        let meta = obj.metadata();
        error!(
            namespace = %meta.namespace,
            name = %meta.name,
            kind = obj.kind(),
            "Unable to cast object as Tekton PipelineRun"
        );
        return false;
    };

    is_eligible(keys, pipeline_run)
}

/// Whether a PipelineRun should enter reconciliation
///
/// First matching rejection wins:
/// 1. marked for deletion
/// 2. no `spec.pipelineRef`
/// 3. no `status.pipelineSpec` yet
/// 4. part of a Shipwright custom task
pub fn is_eligible(keys: &TriggerKeys, pipeline_run: &PipelineRun) -> bool {
    let meta = &pipeline_run.metadata;

    if meta.is_marked_for_deletion() {
        info!(namespace = %meta.namespace, name = %meta.name, "Marked for deletion");
        return false;
    }

    if pipeline_run.spec.pipeline_ref.is_none() {
        info!(
            namespace = %meta.namespace,
            name = %meta.name,
            "Skipping due to missing .spec.pipelineRef"
        );
        return false;
    }

    if pipeline_run.status.pipeline_spec.is_none() {
        info!(
            namespace = %meta.namespace,
            name = %meta.name,
            "Skipping due to missing .status.pipelineSpec"
        );
        return false;
    }

    if pipeline_run_references_shipwright(keys, pipeline_run) {
        info!(
            namespace = %meta.namespace,
            name = %meta.name,
            "Skipping due to being part of a Custom-Task"
        );
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use triggers_core::domain::build_run::BuildRun;
    use triggers_core::domain::pipeline_run::{PipelineSpec, PipelineTask, TaskRef};

    fn pipeline_run_with_spec(tasks: Vec<PipelineTask>) -> PipelineRun {
        let mut pr = PipelineRun::new("default", "pipeline", "pipeline");
        pr.status.pipeline_spec = Some(PipelineSpec {
            description: "testing".to_string(),
            tasks,
        });
        pr
    }

    fn shipwright_task() -> PipelineTask {
        PipelineTask {
            name: "shipwright".to_string(),
            task_ref: Some(TaskRef {
                api_version: "shipwright.io/v1alpha1".to_string(),
                kind: String::new(),
                name: "name".to_string(),
            }),
        }
    }

    fn tekton_task() -> PipelineTask {
        PipelineTask {
            name: "tekton".to_string(),
            task_ref: Some(TaskRef {
                name: "task-ex".to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_plain_pipeline_run_is_eligible() {
        let keys = TriggerKeys::default();
        let pr = pipeline_run_with_spec(vec![tekton_task()]);
        assert!(is_eligible(&keys, &pr));
        assert!(event_filter_predicate(&keys, &Object::PipelineRun(pr)));
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        let keys = TriggerKeys::default();
        let obj = Object::BuildRun(BuildRun::new("default", "buildrun", "build"));
        assert!(!event_filter_predicate(&keys, &obj));
    }

    #[test]
    fn test_marked_for_deletion_is_rejected() {
        let keys = TriggerKeys::default();
        let mut pr = pipeline_run_with_spec(vec![]);
        pr.metadata.deletion_timestamp = Some(chrono::Utc::now());
        assert!(!is_eligible(&keys, &pr));
    }

    #[test]
    fn test_missing_pipeline_ref_is_rejected() {
        let keys = TriggerKeys::default();
        let mut pr = pipeline_run_with_spec(vec![tekton_task()]);
        pr.spec.pipeline_ref = None;
        assert!(!is_eligible(&keys, &pr));
    }

    #[test]
    fn test_missing_pipeline_spec_is_rejected() {
        let keys = TriggerKeys::default();
        let pr = PipelineRun::new("default", "pipeline", "pipeline");
        assert!(!is_eligible(&keys, &pr));
    }

    #[test]
    fn test_custom_task_pipeline_run_is_rejected() {
        let keys = TriggerKeys::default();
        let pr = pipeline_run_with_spec(vec![tekton_task(), shipwright_task()]);
        assert!(pipeline_run_references_shipwright(&keys, &pr));
        assert!(!is_eligible(&keys, &pr));
    }

    #[test]
    fn test_tasks_without_ref_do_not_reference_shipwright() {
        let keys = TriggerKeys::default();
        let pr = pipeline_run_with_spec(vec![PipelineTask {
            name: "inline".to_string(),
            task_ref: None,
        }]);
        assert!(!pipeline_run_references_shipwright(&keys, &pr));
        assert!(!pipeline_run_references_shipwright(
            &keys,
            &PipelineRun::new("default", "pipeline", "pipeline")
        ));
    }
}
