//! Error types for the decision core

use thiserror::Error;
use triggers_core::domain::meta::NamespacedName;

/// Result type alias for decision core operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors the decision core reports to its callers
#[derive(Debug, Error)]
pub enum FilterError {
    /// None of the status branches matched
    #[error("unable to parse pipelinerun \"{0}\" current status")]
    UnknownStatus(NamespacedName),

    /// The PipelineRun does not reference a Pipeline
    #[error("pipelinerun \"{0}\" does not reference a pipeline")]
    MissingPipelineRef(NamespacedName),

    /// Extra fields are absent or blank, the BuildRun was not recorded yet
    #[error("extra fields are not populated")]
    ExtraFieldsNotPopulated,

    /// Extra fields decoded, but carry an empty BuildRun identity
    #[error("attribute extra fields is empty")]
    ExtraFieldsEmpty,

    /// Extra fields cannot be decoded
    #[error("malformed extra fields: {0}")]
    ExtraFieldsMalformed(#[source] serde_json::Error),

    /// The triggered builds annotation cannot be decoded
    #[error("malformed triggered builds annotation: {0}")]
    TriggeredBuildsMalformed(#[source] serde_json::Error),
}

impl FilterError {
    /// Check if this error means "not recorded yet, retry later"
    pub fn is_not_populated(&self) -> bool {
        matches!(self, Self::ExtraFieldsNotPopulated)
    }

    /// Check if this error points at corrupt data on the object
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::ExtraFieldsEmpty
                | Self::ExtraFieldsMalformed(_)
                | Self::TriggeredBuildsMalformed(_)
        )
    }
}
