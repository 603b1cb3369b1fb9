//! Repository layer
//!
//! The object store is the only way the controller reads and writes objects.
//! It is trait-based so the reconcilers run against a real API client or the
//! in-memory store alike.

mod memory;
mod store;

pub use memory::InMemoryStore;
pub use store::ObjectStore;
