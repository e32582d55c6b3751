//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shared by Add/Find/Review flows.
//! - Own write-side normalization for titles, tags and optional labels.
//!
//! # Invariants
//! - `id` is stable, never nil, and never reused for another task.
//! - `title` is non-blank after trimming and `minutes > 0`.
//! - `updated_at` never moves backwards for one record.
//! - `tags` are trimmed, lowercase, deduplicated and sorted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier of one task record.
pub type TaskId = Uuid;

/// Context label for work tasks.
pub const CONTEXT_WORK: &str = "Work";
/// Context label for personal tasks.
pub const CONTEXT_PERSONAL: &str = "Personal";
/// Context assigned to blank or unrecognized input.
pub const DEFAULT_CONTEXT: &str = CONTEXT_PERSONAL;
/// Recognized context labels, in display order.
pub const RECOGNIZED_CONTEXTS: &[&str] = &[CONTEXT_WORK, CONTEXT_PERSONAL];
/// Recognized energy levels offered by the advanced filters.
pub const ENERGY_LEVELS: &[&str] = &["Low", "Medium", "High"];

/// Task shape. Informational only; no logic branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// One sitting, done in a single step.
    Atomic,
    /// Regular task.
    Standard,
    /// Chips away at something larger.
    Progress,
}

impl TaskKind {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::Standard => "standard",
            Self::Progress => "progress",
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Atomic => "Atomic",
            Self::Standard => "Standard",
            Self::Progress => "Progress",
        }
    }

    /// Parses either the storage value or the label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "atomic" => Some(Self::Atomic),
            "standard" => Some(Self::Standard),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

/// Validation failures for task writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    BlankTitle,
    BlankContext,
    ZeroMinutes,
    /// Tag list is not in normalized form (blank, cased, duplicated or unsorted).
    UnnormalizedTags,
    /// Energy is not one of `ENERGY_LEVELS`.
    UnknownEnergy(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::BlankContext => write!(f, "task context must not be blank"),
            Self::ZeroMinutes => write!(f, "task minutes must be greater than zero"),
            Self::UnnormalizedTags => {
                write!(f, "task tags must be trimmed, lowercase, unique and sorted")
            }
            Self::UnknownEnergy(level) => {
                write!(f, "unknown energy level `{level}`; expected Low|Medium|High")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskWire")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub context: String,
    pub kind: TaskKind,
    /// Estimated duration in minutes.
    pub minutes: u32,
    pub is_priority: bool,
    /// Unix epoch milliseconds; `None` while the task is open.
    pub completed_at: Option<i64>,
    /// Unix epoch milliseconds of the last mutation.
    pub updated_at: i64,
    pub energy: Option<String>,
    pub project: Option<String>,
    pub tags: Vec<String>,
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub context: String,
    pub kind: TaskKind,
    pub minutes: u32,
    pub is_priority: bool,
    pub energy: Option<String>,
    pub project: Option<String>,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        context: impl Into<String>,
        kind: TaskKind,
        minutes: u32,
    ) -> Self {
        Self {
            title: title.into(),
            context: context.into(),
            kind,
            minutes,
            is_priority: false,
            energy: None,
            project: None,
            tags: Vec::new(),
        }
    }

    pub fn priority(mut self, is_priority: bool) -> Self {
        self.is_priority = is_priority;
        self
    }

    pub fn energy(mut self, energy: impl Into<String>) -> Self {
        self.energy = Some(energy.into());
        self
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial edit applied by the task editor. `None` leaves a field untouched.
///
/// `energy` and `project` use a nested option so an edit can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub context: Option<String>,
    pub kind: Option<TaskKind>,
    pub minutes: Option<u32>,
    pub is_priority: Option<bool>,
    pub energy: Option<Option<String>>,
    pub project: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Task {
    /// Creates an open task with a generated id.
    ///
    /// Title whitespace is collapsed, optional labels are trimmed and tags are
    /// normalized. Context is only trimmed here; recognized-set policy belongs
    /// to the store.
    pub fn create(draft: NewTask, now_ms: i64) -> Result<Self, TaskValidationError> {
        Self::create_with_id(Uuid::new_v4(), draft, now_ms)
    }

    /// Creates an open task with a caller-provided id (import and seed paths).
    pub fn create_with_id(
        id: TaskId,
        draft: NewTask,
        now_ms: i64,
    ) -> Result<Self, TaskValidationError> {
        let title = normalize_title(&draft.title).ok_or(TaskValidationError::BlankTitle)?;
        let task = Self {
            id,
            title,
            context: draft.context.trim().to_string(),
            kind: draft.kind,
            minutes: draft.minutes,
            is_priority: draft.is_priority,
            completed_at: None,
            updated_at: now_ms,
            energy: normalize_energy(draft.energy.as_deref())?,
            project: normalize_label(draft.project.as_deref()),
            tags: normalize_tags(&draft.tags),
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks write-side invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.context.trim().is_empty() {
            return Err(TaskValidationError::BlankContext);
        }
        if self.minutes == 0 {
            return Err(TaskValidationError::ZeroMinutes);
        }
        if normalize_tags(&self.tags) != self.tags {
            return Err(TaskValidationError::UnnormalizedTags);
        }
        if let Some(energy) = self.energy.as_deref() {
            if !ENERGY_LEVELS.contains(&energy) {
                return Err(TaskValidationError::UnknownEnergy(energy.to_string()));
            }
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Advances `updated_at` to `now_ms` without ever moving it backwards.
    ///
    /// Returns the effective mutation timestamp.
    pub fn touch(&mut self, now_ms: i64) -> i64 {
        self.updated_at = self.updated_at.max(now_ms);
        self.updated_at
    }

    /// Marks the task completed; `completed_at` and `updated_at` share one instant.
    pub fn mark_completed(&mut self, now_ms: i64) {
        let at = self.touch(now_ms);
        self.completed_at = Some(at);
    }

    /// Clears completion ("mark as not completed").
    pub fn mark_open(&mut self, now_ms: i64) {
        self.completed_at = None;
        self.touch(now_ms);
    }

    pub fn toggle_priority(&mut self, now_ms: i64) {
        self.is_priority = !self.is_priority;
        self.touch(now_ms);
    }

    /// Applies an editor change set, validating before anything is written.
    ///
    /// Returns `Ok(false)` when the edit is empty.
    pub fn apply_edit(&mut self, edit: &TaskEdit, now_ms: i64) -> Result<bool, TaskValidationError> {
        if edit.is_empty() {
            return Ok(false);
        }

        let mut next = self.clone();
        if let Some(title) = edit.title.as_deref() {
            next.title = normalize_title(title).ok_or(TaskValidationError::BlankTitle)?;
        }
        if let Some(context) = edit.context.as_deref() {
            next.context = context.trim().to_string();
        }
        if let Some(kind) = edit.kind {
            next.kind = kind;
        }
        if let Some(minutes) = edit.minutes {
            next.minutes = minutes;
        }
        if let Some(is_priority) = edit.is_priority {
            next.is_priority = is_priority;
        }
        if let Some(energy) = edit.energy.as_ref() {
            next.energy = normalize_energy(energy.as_deref())?;
        }
        if let Some(project) = edit.project.as_ref() {
            next.project = normalize_label(project.as_deref());
        }
        if let Some(tags) = edit.tags.as_ref() {
            next.tags = normalize_tags(tags);
        }
        next.validate()?;
        next.touch(now_ms);

        *self = next;
        Ok(true)
    }
}

/// Deserialization shape; converted through `Task::validate`.
#[derive(Deserialize)]
struct TaskWire {
    id: TaskId,
    title: String,
    context: String,
    kind: TaskKind,
    minutes: u32,
    #[serde(default)]
    is_priority: bool,
    #[serde(default)]
    completed_at: Option<i64>,
    updated_at: i64,
    #[serde(default)]
    energy: Option<String>,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskValidationError;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        let task = Self {
            id: wire.id,
            title: wire.title,
            context: wire.context,
            kind: wire.kind,
            minutes: wire.minutes,
            is_priority: wire.is_priority,
            completed_at: wire.completed_at,
            updated_at: wire.updated_at,
            energy: wire.energy,
            project: wire.project,
            tags: wire.tags,
        };
        task.validate()?;
        Ok(task)
    }
}

/// Most recently touched first; id breaks ties so the order is total.
pub fn recent_first(a: &Task, b: &Task) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Trims and collapses internal whitespace; `None` when blank.
pub fn normalize_title(title: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(title.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Normalizes one tag; `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Trims an optional free-text label; blank collapses to `None`.
pub fn normalize_label(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Case-insensitive lookup into `ENERGY_LEVELS`.
pub fn canonical_energy(level: &str) -> Option<&'static str> {
    let trimmed = level.trim();
    ENERGY_LEVELS
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(trimmed))
}

/// Write-side energy normalization: blank clears, known levels take their
/// canonical label, anything else is rejected.
pub fn normalize_energy(value: Option<&str>) -> Result<Option<String>, TaskValidationError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    canonical_energy(raw)
        .map(|level| Some(level.to_string()))
        .ok_or_else(|| TaskValidationError::UnknownEnergy(raw.to_string()))
}

/// Maps a raw context onto the recognized set.
///
/// Exact matches win, then case-insensitive matches; anything else (blank
/// included) becomes `default`.
pub fn normalize_context<S: AsRef<str>>(raw: &str, recognized: &[S], default: &str) -> String {
    let trimmed = raw.trim();
    if let Some(found) = recognized.iter().find(|c| c.as_ref() == trimmed) {
        return found.as_ref().to_string();
    }
    recognized
        .iter()
        .find(|c| c.as_ref().eq_ignore_ascii_case(trimmed))
        .map(|c| c.as_ref().to_string())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        normalize_context, normalize_energy, normalize_title, TaskKind, TaskValidationError,
        RECOGNIZED_CONTEXTS,
    };

    #[test]
    fn normalize_title_collapses_whitespace() {
        assert_eq!(
            normalize_title("  write \t  the\nreport ").as_deref(),
            Some("write the report")
        );
        assert_eq!(normalize_title(" \n "), None);
    }

    #[test]
    fn normalize_context_maps_unknown_to_default() {
        assert_eq!(normalize_context("work", RECOGNIZED_CONTEXTS, "Personal"), "Work");
        assert_eq!(normalize_context("Home", RECOGNIZED_CONTEXTS, "Personal"), "Personal");
        assert_eq!(normalize_context("", RECOGNIZED_CONTEXTS, "Personal"), "Personal");
    }

    #[test]
    fn normalize_energy_canonicalizes_or_rejects() {
        assert_eq!(normalize_energy(Some(" high ")), Ok(Some("High".to_string())));
        assert_eq!(normalize_energy(Some("  ")), Ok(None));
        assert_eq!(normalize_energy(None), Ok(None));
        assert_eq!(
            normalize_energy(Some("Turbo")),
            Err(TaskValidationError::UnknownEnergy("Turbo".to_string()))
        );
    }

    #[test]
    fn task_kind_parses_labels_and_storage_values() {
        assert_eq!(TaskKind::parse("Atomic"), Some(TaskKind::Atomic));
        assert_eq!(TaskKind::parse(" progress "), Some(TaskKind::Progress));
        assert_eq!(TaskKind::parse("epic"), None);
    }
}
