//! Filter/sort derivation and the reshuffle step.
//!
//! # Responsibility
//! - Derive the Find-screen candidate list from the full task collection.
//! - Vary which equally eligible task comes first ("reshuffle").
//!
//! # Invariants
//! - Derivation is re-runnable from current state; nothing is cached between
//!   calls except the shuffle mode, the reshuffle token and the RNG.
//! - Stages narrow in a fixed order: context, open, minutes, priority,
//!   energy, project, tags; then most recently updated first.
//! - Shuffled output is a permutation of the sorted output.

use crate::filter::spec::TaskFilterSpec;
use crate::model::task::{normalize_tag, recent_first, Task};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// When the sorted candidate list is shuffled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    /// Fresh permutation on every derive.
    #[default]
    EveryDerive,
    /// Permutation is a function of the reshuffle token; stable until
    /// `FilterEngine::reshuffle` is called.
    OnReshuffle,
    /// Sorted order only.
    Disabled,
}

impl ShuffleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EveryDerive => "every_derive",
            Self::OnReshuffle => "on_reshuffle",
            Self::Disabled => "disabled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "every_derive" => Some(Self::EveryDerive),
            "on_reshuffle" => Some(Self::OnReshuffle),
            "disabled" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Applies filter stages 1-7 and the recency sort. Deterministic.
pub fn filter_tasks<'a>(tasks: &'a [Task], spec: &TaskFilterSpec) -> Vec<&'a Task> {
    let mut stage = tasks
        .iter()
        .filter(|task| task.context == spec.active_context)
        .filter(|task| task.is_open())
        .collect::<Vec<_>>();

    if let Some(limit) = spec.selected_minutes {
        stage.retain(|task| task.minutes <= limit);
    }
    if spec.priority_only {
        stage.retain(|task| task.is_priority);
    }
    if !spec.energy().is_empty() {
        stage.retain(|task| label_in(task.energy.as_deref(), spec.energy()));
    }
    if !spec.projects().is_empty() {
        stage.retain(|task| label_in(task.project.as_deref(), spec.projects()));
    }
    if !spec.tags().is_empty() {
        stage.retain(|task| has_all_tags(task, spec.tags()));
    }

    stage.sort_by(|a, b| recent_first(a, b));
    stage
}

/// Filter engine with the configurable shuffle step.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    mode: ShuffleMode,
    reshuffle_token: u64,
    seed: u64,
    rng: StdRng,
}

impl FilterEngine {
    /// Engine seeded from OS entropy.
    pub fn new(mode: ShuffleMode) -> Self {
        Self::with_seed(mode, rand::random())
    }

    /// Engine with a fixed seed, for reproducible orders.
    pub fn with_seed(mode: ShuffleMode, seed: u64) -> Self {
        Self {
            mode,
            reshuffle_token: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn mode(&self) -> ShuffleMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ShuffleMode) {
        self.mode = mode;
    }

    /// Opaque version token; changes on every `reshuffle`.
    pub fn reshuffle_token(&self) -> u64 {
        self.reshuffle_token
    }

    /// Requests a new order even though no filter changed.
    pub fn reshuffle(&mut self) -> u64 {
        self.reshuffle_token = self.reshuffle_token.wrapping_add(1);
        debug!(
            "event=filter_reshuffle module=filter status=ok token={}",
            self.reshuffle_token
        );
        self.reshuffle_token
    }

    /// Derives the display list: `filter_tasks` followed by the shuffle step.
    ///
    /// Order is non-deterministic under `ShuffleMode::EveryDerive`.
    pub fn derive<'a>(&mut self, tasks: &'a [Task], spec: &TaskFilterSpec) -> Vec<&'a Task> {
        let mut items = filter_tasks(tasks, spec);
        match self.mode {
            ShuffleMode::EveryDerive => items.shuffle(&mut self.rng),
            ShuffleMode::OnReshuffle => {
                let mut rng = StdRng::seed_from_u64(self.token_seed());
                items.shuffle(&mut rng);
            }
            ShuffleMode::Disabled => {}
        }

        debug!(
            "event=filter_derive module=filter status=ok total={} results={} shuffle={} token={}",
            tasks.len(),
            items.len(),
            self.mode.as_str(),
            self.reshuffle_token
        );
        items
    }

    fn token_seed(&self) -> u64 {
        // Spread consecutive tokens across the seed space.
        self.seed ^ self.reshuffle_token.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }
}

fn label_in(value: Option<&str>, allowed: &BTreeSet<String>) -> bool {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .is_some_and(|value| allowed.contains(value))
}

fn has_all_tags(task: &Task, required: &BTreeSet<String>) -> bool {
    let own = task
        .tags
        .iter()
        .filter_map(|tag| normalize_tag(tag))
        .collect::<BTreeSet<_>>();
    required.is_subset(&own)
}

#[cfg(test)]
mod tests {
    use super::{FilterEngine, ShuffleMode};
    use crate::filter::spec::TaskFilterSpec;
    use crate::model::task::{NewTask, Task, TaskKind};

    fn open_tasks(count: u32) -> Vec<Task> {
        (0..count)
            .map(|idx| {
                Task::create(
                    NewTask::new(format!("task {idx}"), "Work", TaskKind::Standard, 5 + idx),
                    1_000 + i64::from(idx),
                )
                .expect("valid task")
            })
            .collect()
    }

    #[test]
    fn disabled_mode_returns_sorted_order() {
        let tasks = open_tasks(4);
        let spec = TaskFilterSpec::new("Work", None);
        let mut engine = FilterEngine::with_seed(ShuffleMode::Disabled, 7);
        let minutes = engine
            .derive(&tasks, &spec)
            .iter()
            .map(|task| task.minutes)
            .collect::<Vec<_>>();
        assert_eq!(minutes, vec![8, 7, 6, 5]);
    }

    #[test]
    fn on_reshuffle_mode_is_stable_until_token_changes() {
        let tasks = open_tasks(8);
        let spec = TaskFilterSpec::new("Work", None);
        let mut engine = FilterEngine::with_seed(ShuffleMode::OnReshuffle, 99);

        let first = ids(&engine.derive(&tasks, &spec));
        let again = ids(&engine.derive(&tasks, &spec));
        assert_eq!(first, again);

        let mut changed = false;
        for _ in 0..20 {
            engine.reshuffle();
            if ids(&engine.derive(&tasks, &spec)) != first {
                changed = true;
                break;
            }
        }
        assert!(changed, "reshuffle should eventually change the order");
    }

    #[test]
    fn reshuffle_bumps_token() {
        let mut engine = FilterEngine::new(ShuffleMode::EveryDerive);
        let before = engine.reshuffle_token();
        assert_eq!(engine.reshuffle(), before + 1);
    }

    fn ids(tasks: &[&Task]) -> Vec<uuid::Uuid> {
        tasks.iter().map(|task| task.id).collect()
    }
}
