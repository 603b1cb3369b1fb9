//! PipelineRun annotations owned by the triggers

use triggers_core::domain::pipeline_run::PipelineRun;
use triggers_core::dto::triggered_build::TriggeredBuild;

use crate::error::{FilterError, Result};
use crate::keys::TriggerKeys;

/// Decodes the triggered builds ledger, empty when the annotation is absent
pub fn triggered_builds(
    keys: &TriggerKeys,
    pipeline_run: &PipelineRun,
) -> Result<Vec<TriggeredBuild>> {
    match pipeline_run.metadata.annotations.get(&keys.triggered_builds) {
        None => Ok(Vec::new()),
        Some(value) if value.trim().is_empty() => Ok(Vec::new()),
        Some(value) => serde_json::from_str(value).map_err(FilterError::TriggeredBuildsMalformed),
    }
}

/// Merges `triggered` into the ledger, skipping Builds already recorded for
/// the same status
pub fn record_triggered_builds(
    keys: &TriggerKeys,
    pipeline_run: &mut PipelineRun,
    triggered: &[TriggeredBuild],
) -> Result<()> {
    if triggered.is_empty() {
        return Ok(());
    }

    let mut ledger = triggered_builds(keys, pipeline_run)?;
    for entry in triggered {
        if !ledger.iter().any(|recorded| recorded.is_same_trigger(entry)) {
            ledger.push(entry.clone());
        }
    }

    let value = serde_json::to_string(&ledger).map_err(FilterError::TriggeredBuildsMalformed)?;
    pipeline_run
        .metadata
        .annotations
        .insert(keys.triggered_builds.clone(), value);
    Ok(())
}

/// Annotates the PipelineRun with its own name
pub fn annotate_pipeline_run_name(keys: &TriggerKeys, pipeline_run: &mut PipelineRun) {
    let name = pipeline_run.metadata.name.clone();
    pipeline_run
        .metadata
        .annotations
        .insert(keys.pipelinerun_name.clone(), name);
}

/// Whether the name annotation matches the object, i.e. it was processed before
pub fn pipeline_run_annotated_name_matches(keys: &TriggerKeys, pipeline_run: &PipelineRun) -> bool {
    pipeline_run
        .metadata
        .annotations
        .get(&keys.pipelinerun_name)
        .is_some_and(|name| *name == pipeline_run.metadata.name)
}
