//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its write-side normalization.
//! - Provide the example data used by guest mode.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod seed;
pub mod task;
