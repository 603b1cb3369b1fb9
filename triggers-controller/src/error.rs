//! Error types for the controller

use thiserror::Error;
use triggers_core::domain::meta::NamespacedName;
use triggers_filter::FilterError;

/// Errors reported by an object store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object does not exist
    #[error("{kind} \"{key}\" not found")]
    NotFound { kind: &'static str, key: NamespacedName },

    /// Object was modified since it was read
    #[error("{kind} \"{key}\" was modified (expected version {expected}, found {found})")]
    Conflict {
        kind: &'static str,
        key: NamespacedName,
        expected: u64,
        found: u64,
    },

    /// Object already exists
    #[error("{kind} \"{key}\" already exists")]
    AlreadyExists { kind: &'static str, key: NamespacedName },
}

impl StoreError {
    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is an optimistic-concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Errors ending a reconciliation pass
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("object store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("updating \"{key}\" kept conflicting after {attempts} attempts")]
    ConflictRetriesExhausted { key: NamespacedName, attempts: u32 },
}
