//! Reconcilers
//!
//! A reconciler performs one pass over one object: read it, ask the decision
//! core what to do, issue BuildRuns and persist the bookkeeping.

mod custom_run;
mod pipeline_run;

pub use custom_run::CustomRunReconciler;
pub use pipeline_run::PipelineRunReconciler;

use triggers_core::domain::meta::NamespacedName;

/// Result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Object is gone or not eligible
    Skipped,
    /// Everything the object asks for was already issued
    UpToDate,
    /// BuildRuns issued during this pass
    Triggered(Vec<NamespacedName>),
}
