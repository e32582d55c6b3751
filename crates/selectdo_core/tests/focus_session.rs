use selectdo_core::{
    format_clock, FinishReason, FocusController, FocusError, FocusStartPolicy, FocusState,
    NewTask, Task, TaskKind, TickOutcome,
};

fn open_task(title: &str, minutes: u32) -> Task {
    Task::create(NewTask::new(title, "Work", TaskKind::Standard, minutes), 1_000).unwrap()
}

#[test]
fn twenty_five_minutes_is_fifteen_hundred_seconds_and_ticks_to_finish() {
    let task = open_task("Write report", 25);
    let mut controller = FocusController::default();

    let session = controller.start(&task, 2_000).unwrap();
    assert_eq!(session.total_seconds(), 1_500);
    assert_eq!(session.remaining_seconds(), 1_500);
    assert_eq!(session.started_at(), 2_000);
    assert_eq!(controller.state(), FocusState::Running);

    for expected in (1..1_500).rev() {
        assert_eq!(
            controller.tick(),
            TickOutcome::Running {
                remaining_seconds: expected
            }
        );
    }

    match controller.tick() {
        TickOutcome::Finished(outcome) => {
            assert_eq!(outcome.reason, FinishReason::Elapsed);
            assert_eq!(outcome.task_id(), task.id);
            assert_eq!(outcome.session.remaining_seconds(), 0);
            assert_eq!(outcome.session.elapsed_seconds(), 1_500);
            assert!(!outcome.completes_task(false));
            assert!(outcome.completes_task(true));
        }
        other => panic!("expected finished session, got {other:?}"),
    }
    assert_eq!(controller.state(), FocusState::Idle);
    assert_eq!(controller.tick(), TickOutcome::Idle);
}

#[test]
fn advance_clamps_at_zero() {
    let task = open_task("Short", 1);
    let mut controller = FocusController::default();
    controller.start(&task, 0).unwrap();

    assert_eq!(
        controller.advance(45),
        TickOutcome::Running {
            remaining_seconds: 15
        }
    );
    match controller.advance(600) {
        TickOutcome::Finished(outcome) => {
            assert_eq!(outcome.session.remaining_seconds(), 0);
            assert_eq!(outcome.session.elapsed_seconds(), 60);
        }
        other => panic!("expected finished session, got {other:?}"),
    }
}

#[test]
fn completed_task_cannot_start() {
    let mut task = open_task("Already done", 10);
    task.mark_completed(5_000);
    let mut controller = FocusController::default();

    assert_eq!(
        controller.start(&task, 6_000).unwrap_err(),
        FocusError::TaskCompleted(task.id)
    );
    assert!(controller.session().is_none());
}

#[test]
fn reject_policy_keeps_running_session() {
    let first = open_task("First", 10);
    let second = open_task("Second", 20);
    let mut controller = FocusController::new(FocusStartPolicy::Reject);
    controller.start(&first, 0).unwrap();

    assert_eq!(
        controller.start(&second, 1).unwrap_err(),
        FocusError::SessionActive {
            active_task: first.id
        }
    );
    assert_eq!(controller.session().unwrap().task_id(), first.id);
}

#[test]
fn replace_policy_swaps_session() {
    let first = open_task("First", 10);
    let second = open_task("Second", 20);
    let mut controller = FocusController::new(FocusStartPolicy::Replace);
    controller.start(&first, 0).unwrap();
    controller.advance(30);

    let session = controller.start(&second, 1).unwrap();
    assert_eq!(session.task_id(), second.id);
    assert_eq!(session.remaining_seconds(), 1_200);
}

#[test]
fn session_holds_task_snapshot() {
    let mut task = open_task("Original title", 10);
    let mut controller = FocusController::default();
    controller.start(&task, 0).unwrap();

    task.title = "Renamed".to_string();
    task.minutes = 99;

    let session = controller.session().unwrap();
    assert_eq!(session.task().title, "Original title");
    assert_eq!(session.total_seconds(), 600);
}

#[test]
fn stop_discards_and_complete_requests_write_back() {
    let task = open_task("Stop me", 10);
    let mut controller = FocusController::default();

    assert!(controller.stop().is_none());
    controller.start(&task, 0).unwrap();
    let stopped = controller.stop().unwrap();
    assert_eq!(stopped.reason, FinishReason::Discarded);
    assert!(!stopped.completes_task(true));

    controller.start(&task, 0).unwrap();
    let done = controller.complete().unwrap();
    assert_eq!(done.reason, FinishReason::Completed);
    assert!(done.completes_task(false));
    assert_eq!(controller.state(), FocusState::Idle);
}

#[test]
fn progress_and_clock_track_elapsed_time() {
    let task = open_task("Half way", 2);
    let mut controller = FocusController::default();
    controller.start(&task, 0).unwrap();
    controller.advance(60);

    let session = controller.session().unwrap();
    assert_eq!(session.elapsed_seconds(), 60);
    assert!((session.progress() - 0.5).abs() < f64::EPSILON);
    assert_eq!(format_clock(session.remaining_seconds()), "01:00");
    assert_eq!(format_clock(1_500), "25:00");
}

#[test]
fn pause_toggle_requires_session() {
    let mut controller = FocusController::default();
    assert_eq!(controller.toggle_pause(), None);

    let task = open_task("Pause", 1);
    controller.start(&task, 0).unwrap();
    assert_eq!(controller.toggle_pause(), Some(true));
    assert_eq!(
        controller.advance(120),
        TickOutcome::Paused {
            remaining_seconds: 60
        }
    );
}
