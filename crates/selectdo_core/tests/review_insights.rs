use selectdo_core::service::review::summarize;
use selectdo_core::{NewTask, Task, TaskKind, TimeBracket};

const RECOGNIZED: &[&str] = &["Work", "Personal"];

fn completed(title: &str, context: &str, minutes: u32, completed_at: i64) -> Task {
    let mut task =
        Task::create(NewTask::new(title, context, TaskKind::Atomic, minutes), 0).unwrap();
    task.mark_completed(completed_at);
    task
}

#[test]
fn empty_review_has_no_insights() {
    let summary = summarize(&[], RECOGNIZED);
    assert_eq!(summary.completed_count(), 0);
    assert_eq!(summary.most_productive_context, None);
    assert_eq!(summary.average_minutes, None);
    assert_eq!(summary.time_bracket, None);
}

#[test]
fn completed_list_is_most_recent_first() {
    let a = completed("A", "Work", 10, 100);
    let b = completed("B", "Work", 10, 300);
    let c = completed("C", "Personal", 10, 200);

    let summary = summarize(&[&a, &b, &c], RECOGNIZED);
    let titles = summary
        .completed
        .iter()
        .map(|task| task.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["B", "C", "A"]);
}

#[test]
fn most_productive_context_prefers_count_then_recognized_order() {
    let work = completed("Work", "Work", 10, 1);
    let home_one = completed("Home one", "Personal", 10, 2);
    let home_two = completed("Home two", "Personal", 10, 3);

    let summary = summarize(&[&work, &home_one, &home_two], RECOGNIZED);
    assert_eq!(summary.most_productive_context.as_deref(), Some("Personal"));

    let tie = summarize(&[&work, &home_one], RECOGNIZED);
    assert_eq!(tie.most_productive_context.as_deref(), Some("Work"));
}

#[test]
fn unrecognized_contexts_rank_after_recognized() {
    let garden = completed("Garden", "Garden", 10, 1);
    let errands = completed("Errands", "Errands", 10, 2);
    let personal = completed("Call", "Personal", 10, 3);

    let tie = summarize(&[&garden, &personal], RECOGNIZED);
    assert_eq!(tie.most_productive_context.as_deref(), Some("Personal"));

    let unknown_only = summarize(&[&garden, &errands], RECOGNIZED);
    assert_eq!(unknown_only.most_productive_context.as_deref(), Some("Errands"));
}

#[test]
fn time_bracket_uses_integer_average() {
    let quick = completed("Quick", "Work", 10, 1);
    let longer = completed("Longer", "Work", 29, 2);

    // (10 + 29) / 2 = 19 with integer division.
    let summary = summarize(&[&quick, &longer], RECOGNIZED);
    assert_eq!(summary.average_minutes, Some(19));
    assert_eq!(summary.time_bracket, Some(TimeBracket::Quick));

    let standard = completed("Standard", "Work", 30, 3);
    let summary = summarize(&[&standard], RECOGNIZED);
    assert_eq!(summary.time_bracket, Some(TimeBracket::Standard));

    let long = completed("Long", "Work", 45, 4);
    let summary = summarize(&[&long, &standard], RECOGNIZED);
    assert_eq!(summary.average_minutes, Some(37));
    assert_eq!(summary.time_bracket, Some(TimeBracket::Standard));

    let summary = summarize(&[&long], RECOGNIZED);
    assert_eq!(summary.time_bracket.map(TimeBracket::label), Some("Long"));
}
