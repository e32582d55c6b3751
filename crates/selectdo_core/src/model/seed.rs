//! Example tasks for guest mode.

use crate::model::task::{Task, TaskKind, CONTEXT_PERSONAL, CONTEXT_WORK};
use uuid::Uuid;

const GUEST_TASKS: &[(&str, &str, TaskKind, u32, bool)] = &[
    ("Send project update email", CONTEXT_WORK, TaskKind::Atomic, 15, false),
    ("Review meeting notes", CONTEXT_WORK, TaskKind::Atomic, 10, false),
    ("Quick workout", CONTEXT_PERSONAL, TaskKind::Atomic, 15, false),
    ("Read industry article", CONTEXT_WORK, TaskKind::Progress, 15, false),
    ("Draft project proposal", CONTEXT_WORK, TaskKind::Progress, 30, true),
    ("Learn new programming concept", CONTEXT_PERSONAL, TaskKind::Progress, 45, false),
];

/// Builds the guest example set. `updated_at` steps back one millisecond per
/// row so list order matches declaration order.
pub fn guest_tasks(now_ms: i64) -> Vec<Task> {
    GUEST_TASKS
        .iter()
        .zip(0_i64..)
        .map(|(&(title, context, kind, minutes, is_priority), offset)| Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            context: context.to_string(),
            kind,
            minutes,
            is_priority,
            completed_at: None,
            updated_at: now_ms - offset,
            energy: None,
            project: None,
            tags: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::guest_tasks;

    #[test]
    fn guest_tasks_are_valid_and_open() {
        let tasks = guest_tasks(1_700_000_000_000);
        assert_eq!(tasks.len(), 6);
        for task in &tasks {
            task.validate().expect("seed task should validate");
            assert!(task.is_open());
        }
        assert!(tasks.windows(2).all(|w| w[0].updated_at > w[1].updated_at));
    }
}
