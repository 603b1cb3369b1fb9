//! Triggers Controller
//!
//! Wires the decision core to its collaborators and runs reconciliations.
//!
//! Architecture:
//! - Configuration: reserved prefix and worker limits, from environment or defaults
//! - Repository: the object store seam, with an in-memory implementation
//! - Services: Build inventory lookups and BuildRun issuing
//! - Reconcilers: one pass over a PipelineRun or CustomRun, retried on conflicts
//! - Controller: routes watch events to reconcilers on bounded tasks
//!
//! The controller never installs a tracing subscriber, the embedding process
//! owns that.

pub mod config;
pub mod controller;
pub mod error;
pub mod reconciler;
pub mod repository;
pub mod service;

pub use config::Config;
pub use controller::Controller;
pub use error::{ReconcileError, StoreError};
pub use reconciler::{CustomRunReconciler, PipelineRunReconciler, ReconcileOutcome};
pub use repository::{InMemoryStore, ObjectStore};
pub use service::{
    BuildInventory, BuildRunIssuer, BuildTrigger, InMemoryInventory, StoreBuildRunIssuer,
};
