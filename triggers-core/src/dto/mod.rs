//! Values derived from the watched objects
//!
//! These are built fresh on every reconciliation pass and handed to the
//! collaborators (build inventory, BuildRun issuer) or encoded back onto
//! the objects.

pub mod extra_fields;
pub mod object_ref;
pub mod triggered_build;
