//! Task-list domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` unique within its collection.
//! - Deletion removes the record; there are no tombstones.

pub mod task;
