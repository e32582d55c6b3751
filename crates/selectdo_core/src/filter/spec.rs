//! Find-screen filter configuration.
//!
//! # Invariants
//! - Set members are trimmed and never blank.
//! - `tags` members are lowercase.
//! - `energy` only holds recognized energy levels.

use crate::model::task::{canonical_energy, normalize_label, normalize_tag, DEFAULT_CONTEXT};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

static TAG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;\n]+").expect("valid tag separator regex"));

/// Time budgets offered as chips, in minutes.
pub const TIME_OPTIONS: &[u32] = &[5, 10, 15, 20, 25, 30, 45, 60];

const DEFAULT_SELECTED_MINUTES: Option<u32> = Some(15);

/// Value object describing which tasks the Find screen offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFilterSpec {
    pub active_context: String,
    /// Upper bound on `minutes`; `None` means unbounded ("Custom").
    pub selected_minutes: Option<u32>,
    pub priority_only: bool,
    energy: BTreeSet<String>,
    projects: BTreeSet<String>,
    tags: BTreeSet<String>,
}

impl Default for TaskFilterSpec {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT, DEFAULT_SELECTED_MINUTES)
    }
}

impl TaskFilterSpec {
    pub fn new(active_context: impl Into<String>, selected_minutes: Option<u32>) -> Self {
        Self {
            active_context: active_context.into(),
            selected_minutes,
            priority_only: false,
            energy: BTreeSet::new(),
            projects: BTreeSet::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.active_context = context.into();
        self
    }

    pub fn minutes(mut self, minutes: Option<u32>) -> Self {
        self.selected_minutes = minutes;
        self
    }

    pub fn priority_only(mut self, priority_only: bool) -> Self {
        self.priority_only = priority_only;
        self
    }

    pub fn with_energy<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_energy(levels);
        self
    }

    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_projects(projects);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_tags(tags);
        self
    }

    pub fn energy(&self) -> &BTreeSet<String> {
        &self.energy
    }

    pub fn projects(&self) -> &BTreeSet<String> {
        &self.projects
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Replaces the energy set, keeping only recognized levels.
    ///
    /// Matching is case-insensitive; the canonical label is stored.
    pub fn set_energy<I, S>(&mut self, levels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.energy = levels
            .into_iter()
            .filter_map(|level| canonical_energy(level.as_ref()))
            .map(str::to_string)
            .collect();
    }

    /// Adds or removes one energy level. Returns `false` for unknown levels.
    pub fn toggle_energy(&mut self, level: &str) -> bool {
        let Some(level) = canonical_energy(level) else {
            return false;
        };
        if !self.energy.remove(level) {
            self.energy.insert(level.to_string());
        }
        true
    }

    pub fn set_projects<I, S>(&mut self, projects: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.projects = projects
            .into_iter()
            .filter_map(|project| normalize_label(Some(project.as_ref())))
            .collect();
    }

    /// Adds or removes one project. Blank input is ignored.
    pub fn toggle_project(&mut self, project: &str) -> bool {
        let Some(project) = normalize_label(Some(project)) else {
            return false;
        };
        if !self.projects.remove(&project) {
            self.projects.insert(project);
        }
        true
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags
            .into_iter()
            .filter_map(|tag| normalize_tag(tag.as_ref()))
            .collect();
    }

    /// Adds every tag found in free-form input such as `"deep, quick;home"`.
    pub fn add_tags_from_input(&mut self, raw: &str) -> usize {
        let before = self.tags.len();
        self.tags.extend(parse_tag_input(raw));
        self.tags.len() - before
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        normalize_tag(tag).is_some_and(|tag| self.tags.remove(&tag))
    }

    /// Restores context, time budget and the priority toggle.
    pub fn reset_quick(&mut self, default_context: &str, default_minutes: Option<u32>) {
        self.active_context = default_context.to_string();
        self.selected_minutes = default_minutes;
        self.priority_only = false;
    }

    /// Clears energy, projects and tags along with the priority toggle.
    pub fn reset_advanced(&mut self) {
        self.energy.clear();
        self.projects.clear();
        self.tags.clear();
        self.priority_only = false;
    }

    /// Whether any advanced filter narrows the result.
    pub fn has_advanced_filters(&self) -> bool {
        !self.energy.is_empty() || !self.projects.is_empty() || !self.tags.is_empty()
    }
}

/// Splits comma, semicolon or newline separated tag input into normalized tags.
pub fn parse_tag_input(raw: &str) -> Vec<String> {
    TAG_SEPARATOR_RE
        .split(raw)
        .filter_map(normalize_tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_tag_input, TaskFilterSpec};

    #[test]
    fn default_spec_matches_find_screen_defaults() {
        let spec = TaskFilterSpec::default();
        assert_eq!(spec.active_context, "Personal");
        assert_eq!(spec.selected_minutes, Some(15));
        assert!(!spec.priority_only);
        assert!(!spec.has_advanced_filters());
    }

    #[test]
    fn energy_keeps_only_recognized_levels() {
        let spec = TaskFilterSpec::default().with_energy(["low", " High ", "Turbo"]);
        let levels = spec.energy().iter().cloned().collect::<Vec<_>>();
        assert_eq!(levels, vec!["High".to_string(), "Low".to_string()]);
    }

    #[test]
    fn toggles_add_then_remove() {
        let mut spec = TaskFilterSpec::default();
        assert!(spec.toggle_energy("medium"));
        assert!(spec.energy().contains("Medium"));
        assert!(spec.toggle_energy("Medium"));
        assert!(spec.energy().is_empty());
        assert!(!spec.toggle_energy("Turbo"));

        assert!(spec.toggle_project(" Learning "));
        assert!(spec.projects().contains("Learning"));
        assert!(!spec.toggle_project("   "));
    }

    #[test]
    fn tag_input_is_split_trimmed_and_lowercased() {
        assert_eq!(
            parse_tag_input(" Deep, quick;;HOME\n , "),
            vec!["deep".to_string(), "quick".to_string(), "home".to_string()]
        );

        let mut spec = TaskFilterSpec::default();
        assert_eq!(spec.add_tags_from_input("a, b, A"), 2);
        assert!(spec.remove_tag(" B "));
        assert_eq!(spec.tags().len(), 1);
    }

    #[test]
    fn resets_are_scoped() {
        let mut spec = TaskFilterSpec::new("Work", None)
            .priority_only(true)
            .with_tags(["x"])
            .with_projects(["Learning"]);

        spec.reset_quick("Personal", Some(15));
        assert_eq!(spec.active_context, "Personal");
        assert_eq!(spec.selected_minutes, Some(15));
        assert!(!spec.priority_only);
        assert!(spec.has_advanced_filters());

        spec.priority_only = true;
        spec.reset_advanced();
        assert!(!spec.has_advanced_filters());
        assert!(!spec.priority_only);
    }
}
