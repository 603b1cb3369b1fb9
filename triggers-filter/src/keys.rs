//! Reserved label and annotation keys
//!
//! Every key the triggers write lives under a single prefix. Consumers doing
//! selector matching treat anything under that prefix as internal.

use triggers_core::constants::{SHIPWRIGHT_API_VERSION, TEKTON_API_V1ALPHA1};

/// Prefix used in all labels and annotations written by the triggers
pub const DEFAULT_PREFIX: &str = "triggers.shipwright.io";

/// Immutable set of reserved keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerKeys {
    pub prefix: String,
    /// Annotates a BuildRun as owned by a Tekton Run
    pub owned_by_run: String,
    /// Labels a BuildRun as owned by a Tekton PipelineRun
    pub owned_by_pipelinerun: String,
    /// Comma-separated names of the BuildRuns created for a PipelineRun
    pub buildrun_names: String,
    /// Current PipelineRun name, avoids reprocessing
    pub pipelinerun_name: String,
    /// Builds triggered so far, JSON formatted
    pub triggered_builds: String,
    /// API version identifying Shipwright task references
    pub shipwright_api_version: String,
    /// API version of Tekton `Run` owners
    pub tekton_run_api_version: String,
}

impl TriggerKeys {
    /// Builds the key set under a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            owned_by_run: format!("{}/owned-by-run", prefix),
            owned_by_pipelinerun: format!("{}/owned-by-pipelinerun", prefix),
            buildrun_names: format!("{}/buildrun-names", prefix),
            pipelinerun_name: format!("{}/pipelinerun-name", prefix),
            triggered_builds: format!("{}/pipelinerun-triggered-builds", prefix),
            shipwright_api_version: SHIPWRIGHT_API_VERSION.to_string(),
            tekton_run_api_version: TEKTON_API_V1ALPHA1.to_string(),
            prefix,
        }
    }

    /// Whether `key` belongs to the reserved namespace
    pub fn is_reserved(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }
}

impl Default for TriggerKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}
