//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-collection persistence contract for tasks.
//! - Isolate serialization and key layout from the task store.
//!
//! # Invariants
//! - The collection is read and written as one unit; there are no partial
//!   writes.

pub mod task_repo;
