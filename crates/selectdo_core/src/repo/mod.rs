//! Repository layer: the persistence collaborator behind the task store.
//!
//! # Responsibility
//! - Define the `TaskRepository` contract keyed by task id.
//! - Isolate SQLite details from store and planner orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`)
//!   in addition to DB transport errors.

pub mod memory_repo;
pub mod task_repo;
