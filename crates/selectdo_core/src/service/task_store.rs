//! Task store use-case service.
//!
//! # Responsibility
//! - Own the authoritative in-memory task collection.
//! - Apply every mutation, then save it through the repository.
//! - Emit feedback events for user-visible mutations.
//!
//! # Invariants
//! - Invalid input is rejected before anything changes.
//! - In-memory state wins: a failed save is logged and counted, never
//!   rolled back.
//! - Feedback failures never affect state.

use crate::clock::{local_date, Clock, SystemClock};
use crate::config::CoreConfig;
use crate::feedback::{FeedbackEvent, FeedbackSink, NoopFeedback};
use crate::model::task::{
    normalize_context, NewTask, Task, TaskEdit, TaskId, TaskValidationError,
};
use crate::repo::task_repo::{RepoResult, TaskListQuery, TaskRepository};
use chrono::NaiveDate;
use log::{debug, error, info};
use std::sync::Arc;

/// Context policy derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ContextPolicy {
    recognized: Vec<String>,
    default: String,
    normalize: bool,
}

impl ContextPolicy {
    fn apply(&self, raw: &str) -> String {
        if self.normalize {
            normalize_context(raw, self.recognized.as_slice(), &self.default)
        } else {
            raw.trim().to_string()
        }
    }
}

/// Store facade over repository implementations.
pub struct TaskStore<R: TaskRepository> {
    repo: R,
    tasks: Vec<Task>,
    clock: Arc<dyn Clock>,
    feedback: Box<dyn FeedbackSink>,
    contexts: ContextPolicy,
    haptics_enabled: bool,
    persist_failures: u64,
}

impl<R: TaskRepository> TaskStore<R> {
    /// Loads every persisted task into memory.
    ///
    /// # Errors
    /// - Returns the repository error when the initial read fails.
    pub fn load(repo: R, config: &CoreConfig) -> RepoResult<Self> {
        let tasks = repo.list_tasks(&TaskListQuery::default())?;
        info!(
            "event=task_store_load module=store status=ok count={}",
            tasks.len()
        );
        Ok(Self {
            repo,
            tasks,
            clock: Arc::new(SystemClock),
            feedback: Box::new(NoopFeedback),
            contexts: ContextPolicy {
                recognized: config.recognized_contexts.clone(),
                default: config.default_context.clone(),
                normalize: config.normalize_contexts,
            },
            haptics_enabled: config.haptics_enabled,
            persist_failures: 0,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of saves that failed since construction.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Creates and saves one open task.
    ///
    /// # Errors
    /// - `BlankTitle` / `ZeroMinutes` / `BlankContext`; the store is unchanged.
    pub fn add(&mut self, mut draft: NewTask) -> Result<TaskId, TaskValidationError> {
        draft.context = self.contexts.apply(&draft.context);
        let task = Task::create(draft, self.clock.now_ms())?;
        let id = task.id;

        let result = self.repo.create_task(&task);
        self.tasks.push(task);
        self.record_persist("create", id, result);
        info!("event=task_add module=store status=ok task_id={id}");
        self.emit_feedback(FeedbackEvent::Added);
        Ok(id)
    }

    /// Marks an open task completed.
    ///
    /// Returns `false` when the id is unknown or the task is already
    /// completed; an existing `completed_at` is never overwritten.
    pub fn complete(&mut self, id: TaskId) -> bool {
        let changed = self.mutate(id, "complete", |task, now| {
            if !task.is_open() {
                return false;
            }
            task.mark_completed(now);
            true
        });
        if changed {
            self.emit_feedback(FeedbackEvent::Completed);
        }
        changed
    }

    /// Clears completion. Returns `false` when unknown or already open.
    pub fn reopen(&mut self, id: TaskId) -> bool {
        self.mutate(id, "reopen", |task, now| {
            if task.is_open() {
                return false;
            }
            task.mark_open(now);
            true
        })
    }

    pub fn toggle_priority(&mut self, id: TaskId) -> bool {
        let changed = self.mutate(id, "toggle_priority", |task, now| {
            task.toggle_priority(now);
            true
        });
        if changed {
            self.emit_feedback(FeedbackEvent::PriorityToggled);
        }
        changed
    }

    /// Applies an editor change set.
    ///
    /// Returns `Ok(false)` when the id is unknown or the edit is empty.
    pub fn edit(&mut self, id: TaskId, edit: &TaskEdit) -> Result<bool, TaskValidationError> {
        let Some(index) = self.position(id) else {
            debug!("event=task_edit module=store status=skipped reason=not_found task_id={id}");
            return Ok(false);
        };

        let mut edit = edit.clone();
        if let Some(context) = edit.context.take() {
            edit.context = Some(self.contexts.apply(&context));
        }
        let now = self.clock.now_ms();
        if !self.tasks[index].apply_edit(&edit, now)? {
            return Ok(false);
        }
        self.persist_update(index);
        info!("event=task_edit module=store status=ok task_id={id}");
        Ok(true)
    }

    /// Removes a task. Returns `false` when the id is unknown.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=task_delete module=store status=skipped reason=not_found task_id={id}");
            return false;
        };
        self.tasks.remove(index);
        let result = self.repo.delete_task(id);
        self.record_persist("delete", id, result);
        info!("event=task_delete module=store status=ok task_id={id}");
        self.emit_feedback(FeedbackEvent::Deleted);
        true
    }

    /// Tasks completed on the current local day, most recent first.
    pub fn completed_today(&self) -> Vec<&Task> {
        match local_date(self.clock.now_ms()) {
            Some(today) => self.completed_on(today),
            None => Vec::new(),
        }
    }

    /// Tasks completed on `date` (local calendar), most recent first.
    pub fn completed_on(&self, date: NaiveDate) -> Vec<&Task> {
        let mut done = self
            .tasks
            .iter()
            .filter(|task| {
                task.completed_at
                    .and_then(local_date)
                    .is_some_and(|day| day == date)
            })
            .collect::<Vec<_>>();
        done.sort_by(|a, b| {
            b.completed_at
                .cmp(&a.completed_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        done
    }

    /// Rewrites contexts outside the recognized set. Returns how many changed.
    pub fn normalize_contexts(&mut self) -> usize {
        if !self.contexts.normalize {
            return 0;
        }

        let now = self.clock.now_ms();
        let mut changed = Vec::new();
        for (index, task) in self.tasks.iter_mut().enumerate() {
            let context = self.contexts.apply(&task.context);
            if context != task.context {
                task.context = context;
                task.touch(now);
                changed.push(index);
            }
        }
        for &index in &changed {
            self.persist_update(index);
        }
        info!(
            "event=task_normalize_contexts module=store status=ok changed={}",
            changed.len()
        );
        changed.len()
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn mutate(
        &mut self,
        id: TaskId,
        op: &'static str,
        apply: impl FnOnce(&mut Task, i64) -> bool,
    ) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=task_{op} module=store status=skipped reason=not_found task_id={id}");
            return false;
        };
        let now = self.clock.now_ms();
        if !apply(&mut self.tasks[index], now) {
            return false;
        }
        self.persist_update(index);
        info!("event=task_{op} module=store status=ok task_id={id}");
        true
    }

    fn persist_update(&mut self, index: usize) {
        let task = &self.tasks[index];
        let id = task.id;
        let result = self.repo.update_task(task);
        self.record_persist("update", id, result);
    }

    fn record_persist<T>(&mut self, op: &'static str, id: TaskId, result: RepoResult<T>) {
        if let Err(err) = result {
            self.persist_failures += 1;
            error!(
                "event=task_persist module=store status=error op={op} task_id={id} failures={} error={err}",
                self.persist_failures
            );
        }
    }

    /// Forwards a feedback event when haptics are enabled. Failures are dropped.
    pub fn emit_feedback(&self, event: FeedbackEvent) {
        if !self.haptics_enabled {
            return;
        }
        if let Err(err) = self.feedback.emit(event) {
            debug!(
                "event=feedback_emit module=store status=error feedback={} error={err}",
                event.as_str()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStore;
    use crate::clock::ManualClock;
    use crate::config::CoreConfig;
    use crate::model::task::{NewTask, TaskKind, TaskValidationError};
    use crate::repo::memory_repo::InMemoryTaskRepository;
    use std::sync::Arc;

    fn store() -> TaskStore<InMemoryTaskRepository> {
        TaskStore::load(InMemoryTaskRepository::new(), &CoreConfig::default())
            .expect("load")
            .with_clock(Arc::new(ManualClock::new(10_000)))
    }

    #[test]
    fn blank_title_is_rejected_without_mutation() {
        let mut store = store();
        let err = store
            .add(NewTask::new("   ", "Work", TaskKind::Atomic, 5))
            .unwrap_err();
        assert_eq!(err, TaskValidationError::BlankTitle);
        assert!(store.is_empty());
        assert!(store.repository().is_empty());
    }

    #[test]
    fn unknown_context_falls_back_to_default() {
        let mut store = store();
        let id = store
            .add(NewTask::new("Water plants", "Garden", TaskKind::Atomic, 5))
            .expect("add");
        assert_eq!(store.get(id).map(|task| task.context.as_str()), Some("Personal"));
    }

    #[test]
    fn reopen_only_applies_to_completed_tasks() {
        let mut store = store();
        let id = store
            .add(NewTask::new("Call mom", "Personal", TaskKind::Atomic, 10))
            .expect("add");
        assert!(!store.reopen(id));
        assert!(store.complete(id));
        assert!(store.reopen(id));
        assert!(store.get(id).is_some_and(|task| task.is_open()));
    }
}
