//! Triggers decision core
//!
//! Pure functions deciding what the triggers controller does with a Tekton
//! object, grouped by concern:
//! - Eligibility: which PipelineRuns enter reconciliation at all
//! - Status: the canonical status a PipelineRun currently represents
//! - Translation: PipelineRun to `ObjectRef` (the build request descriptor)
//! - Bookkeeping: recording issued BuildRuns on PipelineRuns and CustomRuns
//!
//! Nothing here performs I/O. Callers fetch objects, pass them in together
//! with the current instant, and persist whatever was mutated.
//!
//! # Example
//!
//! ```
//! use triggers_core::domain::pipeline_run::PipelineRun;
//! use triggers_filter::{TriggerKeys, pipeline_run_to_object_ref};
//!
//! let keys = TriggerKeys::default();
//! let mut pipeline_run = PipelineRun::new("default", "run-1", "pipeline");
//! pipeline_run.mark_succeeded("Succeeded", "done");
//!
//! let now = chrono::Utc::now();
//! let object_ref = pipeline_run_to_object_ref(&keys, now, &pipeline_run).unwrap();
//! assert_eq!(object_ref.status, vec!["Successful".to_string()]);
//! ```

mod annotations;
pub mod error;
mod extra_fields;
mod keys;
mod labels;
mod object_ref;
mod owner;
mod predicate;
mod status;

// Re-export commonly used items
pub use annotations::{
    annotate_pipeline_run_name, pipeline_run_annotated_name_matches, record_triggered_builds,
    triggered_builds,
};
pub use error::{FilterError, Result};
pub use extra_fields::{decode_extra_fields, encode_extra_fields};
pub use keys::{DEFAULT_PREFIX, TriggerKeys};
pub use labels::{append_issued_build_runs_label, issued_build_runs, pipeline_run_get_labels};
pub use object_ref::pipeline_run_to_object_ref;
pub use owner::{
    build_run_owned_by_run, custom_run_references_shipwright, search_build_run_for_run_owner,
};
pub use predicate::{event_filter_predicate, is_eligible, pipeline_run_references_shipwright};
pub use status::{
    DEFAULT_PIPELINE_TIMEOUT, PipelineRunOutcome, has_timed_out, parse_pipeline_run_status,
};
