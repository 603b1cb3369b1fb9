//! Build request descriptor

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Describes which Builds a PipelineRun should trigger
///
/// Builds declare `when` triggers naming a Pipeline, a set of statuses and a
/// label selector; an `ObjectRef` is matched against those.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Pipeline name
    pub name: String,
    /// Single canonical status of the run
    pub status: Vec<String>,
    #[serde(default)]
    pub selector: HashMap<String, String>,
}
