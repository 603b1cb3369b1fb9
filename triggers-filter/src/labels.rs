//! PipelineRun label codec

use std::collections::HashMap;
use triggers_core::domain::pipeline_run::PipelineRun;

use crate::keys::TriggerKeys;

/// Returns a copy of the PipelineRun labels, empty when it has none
pub fn pipeline_run_get_labels(pipeline_run: &PipelineRun) -> HashMap<String, String> {
    pipeline_run.metadata.labels.clone()
}

/// Prepends the issued BuildRun names to the `buildrun-names` label
///
/// The existing value is kept verbatim as the suffix, no de-duplication is
/// performed. An empty `build_runs` leaves the object untouched.
pub fn append_issued_build_runs_label(
    keys: &TriggerKeys,
    pipeline_run: &mut PipelineRun,
    build_runs: &[String],
) {
    if build_runs.is_empty() {
        return;
    }

    let labels = &mut pipeline_run.metadata.labels;
    let mut value = build_runs.join(",");
    if let Some(existing) = labels.get(&keys.buildrun_names).filter(|v| !v.is_empty()) {
        value.push(',');
        value.push_str(existing);
    }
    labels.insert(keys.buildrun_names.clone(), value);
}

/// Names recorded in the `buildrun-names` label, newest first
pub fn issued_build_runs(keys: &TriggerKeys, pipeline_run: &PipelineRun) -> Vec<String> {
    pipeline_run
        .metadata
        .labels
        .get(&keys.buildrun_names)
        .map(|value| {
            value
                .split(',')
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
