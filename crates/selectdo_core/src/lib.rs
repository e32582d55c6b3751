//! Core domain logic for Select + Do.
//! This crate is the single source of truth for task invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod feedback;
pub mod filter;
pub mod focus;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use feedback::{FeedbackError, FeedbackEvent, FeedbackSink, NoopFeedback};
pub use filter::engine::{filter_tasks, FilterEngine, ShuffleMode};
pub use filter::spec::{parse_tag_input, TaskFilterSpec, TIME_OPTIONS};
pub use focus::{
    format_clock, FinishReason, FocusController, FocusError, FocusOutcome, FocusSession,
    FocusStartPolicy, FocusState, TickOutcome,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::task::{NewTask, Task, TaskEdit, TaskId, TaskKind, TaskValidationError};
pub use repo::memory_repo::InMemoryTaskRepository;
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskListQuery, TaskRepository,
};
pub use service::planner::Planner;
pub use service::review::{ReviewSummary, TimeBracket};
pub use service::task_store::TaskStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
