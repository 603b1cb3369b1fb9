//! Ledger entry for Builds already triggered by a PipelineRun

use serde::{Deserialize, Serialize};

use super::object_ref::ObjectRef;

/// A Build triggered for a given `ObjectRef`
///
/// Stored as a JSON array on the PipelineRun so that a later pass with the
/// same status does not trigger the Build again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredBuild {
    pub build_name: String,
    pub object_ref: ObjectRef,
}

impl TriggeredBuild {
    pub fn new(build_name: impl Into<String>, object_ref: ObjectRef) -> Self {
        Self {
            build_name: build_name.into(),
            object_ref,
        }
    }

    /// Whether both entries record the same Build for the same Pipeline status
    ///
    /// The selector is left out: it mirrors the PipelineRun labels, which
    /// other writers may change between two passes.
    pub fn is_same_trigger(&self, other: &TriggeredBuild) -> bool {
        self.build_name == other.build_name
            && self.object_ref.name == other.object_ref.name
            && self.object_ref.status == other.object_ref.status
    }
}
