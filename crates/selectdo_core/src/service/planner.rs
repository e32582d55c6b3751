//! App-level root object.
//!
//! # Responsibility
//! - Wire the task store, Find filter, filter engine and focus controller
//!   from one `CoreConfig`.
//! - Write focus completion back through the store.
//!
//! # Invariants
//! - Constructed explicitly; there is no process-wide instance in this crate.
//! - Focus write-back only ever goes through `TaskStore::complete`.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::feedback::{FeedbackEvent, FeedbackSink};
use crate::filter::engine::FilterEngine;
use crate::filter::spec::TaskFilterSpec;
use crate::focus::{FocusController, FocusError, FocusOutcome, FocusSession, TickOutcome};
use crate::model::seed::guest_tasks;
use crate::model::task::{Task, TaskId};
use crate::repo::memory_repo::InMemoryTaskRepository;
use crate::repo::task_repo::{RepoResult, TaskRepository};
use crate::service::review::{summarize, ReviewSummary};
use crate::service::task_store::TaskStore;
use log::{info, warn};
use std::sync::Arc;

pub struct Planner<R: TaskRepository> {
    config: CoreConfig,
    store: TaskStore<R>,
    filter: TaskFilterSpec,
    engine: FilterEngine,
    focus: FocusController,
}

impl<R: TaskRepository> Planner<R> {
    /// Loads the store from `repo` and applies `config`.
    pub fn new(repo: R, config: CoreConfig) -> RepoResult<Self> {
        let store = TaskStore::load(repo, &config)?;
        let filter = TaskFilterSpec::new(config.default_context.clone(), config.default_minutes);
        Ok(Self {
            engine: FilterEngine::new(config.shuffle),
            focus: FocusController::new(config.focus_start_policy),
            store,
            filter,
            config,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.store = self.store.with_clock(clock);
        self
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.store = self.store.with_feedback(feedback);
        self
    }

    /// Replaces the engine, e.g. with a fixed seed.
    pub fn with_engine(mut self, engine: FilterEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn store(&self) -> &TaskStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore<R> {
        &mut self.store
    }

    pub fn filter(&self) -> &TaskFilterSpec {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut TaskFilterSpec {
        &mut self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilterSpec) {
        self.filter = filter;
    }

    /// Current Find-screen candidates.
    pub fn find(&mut self) -> Vec<&Task> {
        self.engine.derive(self.store.tasks(), &self.filter)
    }

    pub fn reshuffle(&mut self) -> u64 {
        self.engine.reshuffle()
    }

    pub fn reshuffle_token(&self) -> u64 {
        self.engine.reshuffle_token()
    }

    pub fn reset_quick_filters(&mut self) {
        self.filter
            .reset_quick(&self.config.default_context, self.config.default_minutes);
    }

    pub fn reset_advanced_filters(&mut self) {
        self.filter.reset_advanced();
    }

    pub fn focus_session(&self) -> Option<&FocusSession> {
        self.focus.session()
    }

    /// Starts focusing on a stored task.
    ///
    /// # Errors
    /// - `TaskNotFound` for unknown ids, otherwise see `FocusController::start`.
    pub fn start_focus(&mut self, id: TaskId) -> Result<&FocusSession, FocusError> {
        let task = self.store.get(id).ok_or(FocusError::TaskNotFound(id))?;
        let now = self.store.now_ms();
        let session = self.focus.start(task, now)?;
        self.store.emit_feedback(FeedbackEvent::FocusStarted);
        Ok(session)
    }

    pub fn tick_focus(&mut self) -> TickOutcome {
        let outcome = self.focus.tick();
        self.settle_tick(&outcome);
        outcome
    }

    /// Catches up on ticks delivered late.
    pub fn advance_focus(&mut self, seconds: u32) -> TickOutcome {
        let outcome = self.focus.advance(seconds);
        self.settle_tick(&outcome);
        outcome
    }

    pub fn toggle_focus_pause(&mut self) -> Option<bool> {
        self.focus.toggle_pause()
    }

    /// Discards the running session; the task stays open.
    pub fn stop_focus(&mut self) -> Option<FocusOutcome> {
        self.focus.stop()
    }

    /// Ends the running session and marks its task completed.
    pub fn complete_focus(&mut self) -> Option<FocusOutcome> {
        let outcome = self.focus.complete()?;
        self.settle(&outcome);
        Some(outcome)
    }

    /// Review insights for today's completions.
    pub fn review(&self) -> ReviewSummary {
        summarize(
            &self.store.completed_today(),
            self.config.recognized_contexts.as_slice(),
        )
    }

    fn settle_tick(&mut self, outcome: &TickOutcome) {
        if let TickOutcome::Finished(finished) = outcome {
            self.settle(finished);
        }
    }

    fn settle(&mut self, outcome: &FocusOutcome) {
        if !outcome.completes_task(self.config.complete_on_elapse) {
            return;
        }
        let task_id = outcome.task_id();
        if self.store.complete(task_id) {
            info!(
                "event=focus_write_back module=planner status=ok task_id={task_id} reason={}",
                outcome.reason.as_str()
            );
        } else {
            warn!(
                "event=focus_write_back module=planner status=skipped reason=missing_or_completed task_id={task_id}"
            );
        }
    }
}

impl Planner<InMemoryTaskRepository> {
    /// Volatile planner pre-filled with the guest example tasks.
    pub fn guest(config: CoreConfig) -> RepoResult<Self> {
        Self::guest_with_clock(config, Arc::new(SystemClock))
    }

    /// Like `guest`, with seed timestamps and later mutations both read from
    /// `clock`.
    pub fn guest_with_clock(config: CoreConfig, clock: Arc<dyn Clock>) -> RepoResult<Self> {
        let repo = InMemoryTaskRepository::with_tasks(guest_tasks(clock.now_ms()))?;
        Ok(Self::new(repo, config)?.with_clock(clock))
    }
}
