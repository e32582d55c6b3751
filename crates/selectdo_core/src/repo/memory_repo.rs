//! In-memory task repository for guest mode and tests.

use crate::model::task::{recent_first, Task, TaskId};
use crate::repo::task_repo::{RepoError, RepoResult, TaskListQuery, TaskRepository};
use std::collections::BTreeMap;

/// Volatile repository with the same contract as the SQLite one.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: BTreeMap<TaskId, Task>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository. Invalid tasks are rejected as a whole.
    pub fn with_tasks(tasks: Vec<Task>) -> RepoResult<Self> {
        let mut repo = Self::new();
        for task in tasks {
            repo.create_task(&task)?;
        }
        Ok(repo)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn create_task(&mut self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        if self.tasks.contains_key(&task.id) {
            return Err(RepoError::AlreadyExists(task.id));
        }
        self.tasks.insert(task.id, task.clone());
        Ok(task.id)
    }

    fn update_task(&mut self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        match self.tasks.get_mut(&task.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(())
            }
            None => Err(RepoError::NotFound(task.id)),
        }
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut tasks = self
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect::<Vec<_>>();
        tasks.sort_by(recent_first);

        let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);
        Ok(tasks
            .into_iter()
            .skip(query.offset as usize)
            .take(limit)
            .collect())
    }

    fn delete_task(&mut self, id: TaskId) -> RepoResult<()> {
        self.tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(id))
    }
}
