//! PipelineRun to `ObjectRef` translation

use chrono::{DateTime, Utc};
use triggers_core::domain::pipeline_run::PipelineRun;
use triggers_core::dto::object_ref::ObjectRef;

use crate::error::{FilterError, Result};
use crate::keys::TriggerKeys;
use crate::labels::pipeline_run_get_labels;
use crate::status::parse_pipeline_run_status;

/// Transforms the PipelineRun into the `ObjectRef` Build triggers match on
///
/// Labels under the reserved prefix are stripped from the selector, they were
/// written by the triggers themselves.
pub fn pipeline_run_to_object_ref(
    keys: &TriggerKeys,
    now: DateTime<Utc>,
    pipeline_run: &PipelineRun,
) -> Result<ObjectRef> {
    let status = parse_pipeline_run_status(now, pipeline_run)?;

    let pipeline_ref = pipeline_run
        .spec
        .pipeline_ref
        .as_ref()
        .ok_or_else(|| FilterError::MissingPipelineRef(pipeline_run.namespaced_name()))?;

    let mut selector = pipeline_run_get_labels(pipeline_run);
    selector.retain(|key, _| !keys.is_reserved(key));

    Ok(ObjectRef {
        name: pipeline_ref.name.clone(),
        status: vec![status.to_string()],
        selector,
    })
}
