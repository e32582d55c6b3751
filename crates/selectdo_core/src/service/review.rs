//! Review screen insights over completed tasks.
//!
//! # Invariants
//! - Empty input yields no context and no bracket, never a default guess.
//! - Context ties resolve by recognized-context order; unrecognized contexts
//!   rank after recognized ones, alphabetically.

use crate::model::task::Task;
use serde::Serialize;
use std::collections::BTreeMap;

/// Typical task length, from the integer average of completed minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBracket {
    /// Average below 20 minutes.
    Quick,
    /// Average from 20 up to 40 minutes.
    Standard,
    Long,
}

impl TimeBracket {
    pub fn from_average(minutes: u32) -> Self {
        match minutes {
            0..=19 => Self::Quick,
            20..=39 => Self::Standard,
            _ => Self::Long,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Quick => "Quick",
            Self::Standard => "Standard",
            Self::Long => "Long",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    /// Completed tasks, most recent completion first.
    pub completed: Vec<Task>,
    pub most_productive_context: Option<String>,
    pub average_minutes: Option<u32>,
    pub time_bracket: Option<TimeBracket>,
}

impl ReviewSummary {
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

/// Summarizes a set of completed tasks.
pub fn summarize<S: AsRef<str>>(completed: &[&Task], recognized: &[S]) -> ReviewSummary {
    let mut ordered = completed.iter().map(|&task| task.clone()).collect::<Vec<_>>();
    ordered.sort_by(|a, b| {
        b.completed_at
            .cmp(&a.completed_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let average_minutes = average_minutes(completed);
    ReviewSummary {
        most_productive_context: most_productive_context(completed, recognized),
        average_minutes,
        time_bracket: average_minutes.map(TimeBracket::from_average),
        completed: ordered,
    }
}

fn most_productive_context<S: AsRef<str>>(tasks: &[&Task], recognized: &[S]) -> Option<String> {
    let mut counts = BTreeMap::<&str, usize>::new();
    for task in tasks {
        *counts.entry(task.context.as_str()).or_default() += 1;
    }

    let rank = |context: &str| {
        recognized
            .iter()
            .position(|known| known.as_ref() == context)
            .unwrap_or(usize::MAX)
    };

    // BTreeMap iteration is alphabetical, so `min_by_key` keeps the first name
    // among equally ranked unrecognized contexts.
    counts
        .into_iter()
        .min_by_key(|&(context, count)| (std::cmp::Reverse(count), rank(context)))
        .map(|(context, _)| context.to_string())
}

fn average_minutes(tasks: &[&Task]) -> Option<u32> {
    if tasks.is_empty() {
        return None;
    }
    let total = tasks.iter().map(|task| u64::from(task.minutes)).sum::<u64>();
    let average = total / tasks.len() as u64;
    Some(u32::try_from(average).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::TimeBracket;

    #[test]
    fn bracket_boundaries() {
        assert_eq!(TimeBracket::from_average(0), TimeBracket::Quick);
        assert_eq!(TimeBracket::from_average(19), TimeBracket::Quick);
        assert_eq!(TimeBracket::from_average(20), TimeBracket::Standard);
        assert_eq!(TimeBracket::from_average(39), TimeBracket::Standard);
        assert_eq!(TimeBracket::from_average(40), TimeBracket::Long);
    }
}
