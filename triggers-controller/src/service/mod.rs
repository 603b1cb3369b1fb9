//! Service layer
//!
//! Collaborators the reconcilers depend on: the Build inventory answering
//! "which Builds does this `ObjectRef` trigger" and the issuer creating
//! BuildRuns. Both are trait-based for testing and dependency injection.

mod inventory;
mod issuer;

// Re-export traits
pub use inventory::BuildInventory;
pub use issuer::BuildRunIssuer;

// Re-export implementations
pub use inventory::{BuildTrigger, InMemoryInventory};
pub use issuer::StoreBuildRunIssuer;
