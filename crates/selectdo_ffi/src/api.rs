//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the one app-wide planner and serialize every call through it.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported inside response envelopes, never thrown.
//! - Task ids cross the boundary as hyphenated UUID strings.

use selectdo_core::db::open_db;
use selectdo_core::model::task::recent_first;
use selectdo_core::{
    core_version as core_version_inner, format_clock, init_logging as init_logging_inner,
    init_logging_from_config, parse_tag_input as parse_tag_input_inner, ping as ping_inner,
    CoreConfig, FocusOutcome, FocusSession, NewTask, Planner, ReviewSummary,
    SqliteTaskRepository, Task, TaskEdit, TaskId, TaskKind, TickOutcome, TIME_OPTIONS,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const DB_FILE_NAME: &str = "selectdo.sqlite3";

static PLANNER: Mutex<Option<Planner<SqliteTaskRepository>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task projection for list and review screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub context: String,
    /// `atomic|standard|progress`.
    pub kind: String,
    pub minutes: u32,
    pub is_priority: bool,
    pub completed_at: Option<i64>,
    pub updated_at: i64,
    pub energy: Option<String>,
    pub project: Option<String>,
    pub tags: Vec<String>,
}

/// Generic action response envelope for task mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the mutation changed anything.
    pub ok: bool,
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: TaskId) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Find-screen filter state. Empty lists leave that filter off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilterInput {
    pub context: String,
    /// `None` means no time limit ("Custom").
    pub minutes: Option<u32>,
    pub priority_only: bool,
    pub energy: Vec<String>,
    pub projects: Vec<String>,
    pub tags: Vec<String>,
}

/// Find-screen response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindTasksResponse {
    pub items: Vec<TaskItem>,
    /// Filter actually applied, after normalization.
    pub filter: Option<TaskFilterInput>,
    pub reshuffle_token: u64,
    pub message: String,
}

impl FindTasksResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            filter: None,
            reshuffle_token: 0,
            message: message.into(),
        }
    }
}

/// Focus sheet state after one call.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusResponse {
    pub ok: bool,
    /// Whether a session is running (paused included).
    pub active: bool,
    pub task_id: Option<String>,
    pub title: Option<String>,
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub paused: bool,
    /// `0.0..=1.0`.
    pub progress: f64,
    /// Remaining time as `MM:SS`.
    pub clock: String,
    /// `elapsed|completed|discarded|replaced` when this call ended a session.
    pub finished_reason: Option<String>,
    pub message: String,
}

impl FocusResponse {
    fn idle(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            active: false,
            task_id: None,
            title: None,
            total_seconds: 0,
            remaining_seconds: 0,
            paused: false,
            progress: 0.0,
            clock: format_clock(0),
            finished_reason: None,
            message: message.into(),
        }
    }

    fn running(session: &FocusSession, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            active: true,
            task_id: Some(session.task_id().to_string()),
            title: Some(session.task().title.clone()),
            total_seconds: session.total_seconds(),
            remaining_seconds: session.remaining_seconds(),
            paused: session.is_paused(),
            progress: session.progress(),
            clock: format_clock(session.remaining_seconds()),
            finished_reason: None,
            message: message.into(),
        }
    }

    fn finished(outcome: &FocusOutcome) -> Self {
        let session = &outcome.session;
        Self {
            active: false,
            paused: false,
            finished_reason: Some(outcome.reason.as_str().to_string()),
            ..Self::running(session, "Focus session finished.")
        }
    }
}

/// Review screen envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResponse {
    pub completed: Vec<TaskItem>,
    pub most_productive_context: Option<String>,
    pub average_minutes: Option<u32>,
    /// `Quick|Standard|Long`.
    pub time_bracket: Option<String>,
    pub message: String,
}

/// Creates one open task.
///
/// `kind` accepts `atomic|standard|progress` in any case.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns created task ID on success.
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn task_add(
    title: String,
    context: String,
    kind: String,
    minutes: u32,
    is_priority: bool,
    energy: Option<String>,
    project: Option<String>,
    tags: Vec<String>,
) -> TaskActionResponse {
    let Some(kind) = TaskKind::parse(&kind) else {
        return TaskActionResponse::failure(format!("task_add failed: unknown kind `{kind}`"));
    };
    let mut draft = NewTask::new(title, context, kind, minutes)
        .priority(is_priority)
        .tags(tags);
    draft.energy = energy;
    draft.project = project;

    match with_planner(|planner| planner.store_mut().add(draft)) {
        Ok(Ok(id)) => TaskActionResponse::success("Task added.", id),
        Ok(Err(err)) => TaskActionResponse::failure(format!("task_add failed: {err}")),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    }
}

/// Marks a task completed.
#[flutter_rust_bridge::frb(sync)]
pub fn task_complete(task_id: String) -> TaskActionResponse {
    mutate_task("task_complete", &task_id, "Task completed.", |planner, id| {
        planner.store_mut().complete(id)
    })
}

/// Marks a completed task as not completed.
#[flutter_rust_bridge::frb(sync)]
pub fn task_reopen(task_id: String) -> TaskActionResponse {
    mutate_task("task_reopen", &task_id, "Task reopened.", |planner, id| {
        planner.store_mut().reopen(id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_priority(task_id: String) -> TaskActionResponse {
    mutate_task(
        "task_toggle_priority",
        &task_id,
        "Priority toggled.",
        |planner, id| planner.store_mut().toggle_priority(id),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    mutate_task("task_delete", &task_id, "Task deleted.", |planner, id| {
        planner.store_mut().delete(id)
    })
}

/// Applies an editor change. `None` leaves a field untouched; an empty
/// `energy` or `project` string clears it.
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn task_edit(
    task_id: String,
    title: Option<String>,
    context: Option<String>,
    kind: Option<String>,
    minutes: Option<u32>,
    is_priority: Option<bool>,
    energy: Option<String>,
    project: Option<String>,
    tags: Option<Vec<String>>,
) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(format!("task_edit failed: {err}")),
    };
    let kind = match kind.as_deref().map(|raw| TaskKind::parse(raw).ok_or(raw)) {
        None => None,
        Some(Ok(kind)) => Some(kind),
        Some(Err(raw)) => {
            return TaskActionResponse::failure(format!("task_edit failed: unknown kind `{raw}`"))
        }
    };
    let edit = TaskEdit {
        title,
        context,
        kind,
        minutes,
        is_priority,
        energy: energy.map(Some),
        project: project.map(Some),
        tags,
    };

    match with_planner(|planner| planner.store_mut().edit(id, &edit)) {
        Ok(Ok(true)) => TaskActionResponse::success("Task updated.", id),
        Ok(Ok(false)) => TaskActionResponse::failure("Nothing to update."),
        Ok(Err(err)) => TaskActionResponse::failure(format!("task_edit failed: {err}")),
        Err(err) => TaskActionResponse::failure(format!("task_edit failed: {err}")),
    }
}

/// Lists every task, most recently updated first.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> Vec<TaskItem> {
    with_planner(|planner| {
        let mut tasks = planner.store().tasks().iter().collect::<Vec<_>>();
        tasks.sort_by(|a, b| recent_first(a, b));
        tasks.into_iter().map(to_task_item).collect()
    })
    .unwrap_or_default()
}

/// Applies `filter` and returns the shuffled candidate list.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_find(filter: TaskFilterInput) -> FindTasksResponse {
    with_planner(|planner| {
        let spec = planner.filter_mut();
        spec.active_context = filter.context.trim().to_string();
        spec.selected_minutes = filter.minutes;
        spec.priority_only = filter.priority_only;
        spec.set_energy(&filter.energy);
        spec.set_projects(&filter.projects);
        spec.set_tags(&filter.tags);
        find_response(planner)
    })
    .unwrap_or_else(|err| FindTasksResponse::failure(format!("tasks_find failed: {err}")))
}

/// Re-derives the list with the current filter and a fresh order.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_reshuffle() -> FindTasksResponse {
    with_planner(|planner| {
        planner.reshuffle();
        find_response(planner)
    })
    .unwrap_or_else(|err| FindTasksResponse::failure(format!("tasks_reshuffle failed: {err}")))
}

/// Restores default context, time budget and priority toggle.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_reset_quick() -> FindTasksResponse {
    with_planner(|planner| {
        planner.reset_quick_filters();
        find_response(planner)
    })
    .unwrap_or_else(|err| FindTasksResponse::failure(format!("filter_reset_quick failed: {err}")))
}

/// Clears energy, project and tag filters.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_reset_advanced() -> FindTasksResponse {
    with_planner(|planner| {
        planner.reset_advanced_filters();
        find_response(planner)
    })
    .unwrap_or_else(|err| {
        FindTasksResponse::failure(format!("filter_reset_advanced failed: {err}"))
    })
}

/// Splits free-form tag input (`"a, b; c"`) into normalized tags.
#[flutter_rust_bridge::frb(sync)]
pub fn parse_tag_input(raw: String) -> Vec<String> {
    parse_tag_input_inner(&raw)
}

/// Time budget chips, in minutes.
#[flutter_rust_bridge::frb(sync)]
pub fn time_options() -> Vec<u32> {
    TIME_OPTIONS.to_vec()
}

/// Starts a focus session on an open task.
#[flutter_rust_bridge::frb(sync)]
pub fn focus_start(task_id: String) -> FocusResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(err) => return FocusResponse::idle(false, format!("focus_start failed: {err}")),
    };
    with_planner(|planner| match planner.start_focus(id) {
        Ok(session) => FocusResponse::running(session, "Focus session started."),
        Err(err) => match planner.focus_session() {
            Some(session) => FocusResponse {
                ok: false,
                ..FocusResponse::running(session, format!("focus_start failed: {err}"))
            },
            None => FocusResponse::idle(false, format!("focus_start failed: {err}")),
        },
    })
    .unwrap_or_else(|err| FocusResponse::idle(false, format!("focus_start failed: {err}")))
}

/// Current focus state without side effects.
#[flutter_rust_bridge::frb(sync)]
pub fn focus_status() -> FocusResponse {
    with_planner(|planner| focus_state(planner, "No focus session."))
        .unwrap_or_else(|err| FocusResponse::idle(false, format!("focus_status failed: {err}")))
}

/// One 1 Hz timer tick from the host.
#[flutter_rust_bridge::frb(sync)]
pub fn focus_tick() -> FocusResponse {
    focus_advance(1)
}

/// Delivers `seconds` of ticks at once (late or batched timers).
#[flutter_rust_bridge::frb(sync)]
pub fn focus_advance(seconds: u32) -> FocusResponse {
    with_planner(|planner| match planner.advance_focus(seconds) {
        TickOutcome::Finished(outcome) => FocusResponse::finished(&outcome),
        TickOutcome::Idle => FocusResponse::idle(true, "No focus session."),
        TickOutcome::Running { .. } | TickOutcome::Paused { .. } => {
            focus_state(planner, "No focus session.")
        }
    })
    .unwrap_or_else(|err| FocusResponse::idle(false, format!("focus_advance failed: {err}")))
}

#[flutter_rust_bridge::frb(sync)]
pub fn focus_toggle_pause() -> FocusResponse {
    with_planner(|planner| match planner.toggle_focus_pause() {
        Some(_) => focus_state(planner, "No focus session."),
        None => FocusResponse::idle(false, "No focus session."),
    })
    .unwrap_or_else(|err| FocusResponse::idle(false, format!("focus_toggle_pause failed: {err}")))
}

/// Stops and discards the session; the task stays open.
#[flutter_rust_bridge::frb(sync)]
pub fn focus_stop() -> FocusResponse {
    with_planner(|planner| match planner.stop_focus() {
        Some(outcome) => FocusResponse::finished(&outcome),
        None => FocusResponse::idle(false, "No focus session."),
    })
    .unwrap_or_else(|err| FocusResponse::idle(false, format!("focus_stop failed: {err}")))
}

/// Ends the session and marks its task completed.
#[flutter_rust_bridge::frb(sync)]
pub fn focus_complete() -> FocusResponse {
    with_planner(|planner| match planner.complete_focus() {
        Some(outcome) => FocusResponse::finished(&outcome),
        None => FocusResponse::idle(false, "No focus session."),
    })
    .unwrap_or_else(|err| FocusResponse::idle(false, format!("focus_complete failed: {err}")))
}

/// Review insights for tasks completed today.
#[flutter_rust_bridge::frb(sync)]
pub fn review_today() -> ReviewResponse {
    match with_planner(|planner| planner.review()) {
        Ok(summary) => to_review_response(summary),
        Err(err) => ReviewResponse {
            completed: Vec::new(),
            most_productive_context: None,
            average_minutes: None,
            time_bracket: None,
            message: format!("review_today failed: {err}"),
        },
    }
}

fn resolve_db_path(config: &CoreConfig) -> PathBuf {
    config
        .db_path
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
}

/// Starts file logging when the loaded config names a log directory.
///
/// A failure is logged and swallowed; the planner still opens.
fn start_config_logging(config: &CoreConfig) {
    if config.log_dir.is_none() {
        return;
    }
    if let Err(err) = init_logging_from_config(config) {
        log::warn!("event=ffi_logging_init module=ffi status=error error={err}");
    }
}

fn open_planner() -> Result<Planner<SqliteTaskRepository>, String> {
    let config = CoreConfig::load().map_err(|err| format!("config load failed: {err}"))?;
    start_config_logging(&config);
    let db_path = resolve_db_path(&config);
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let planner = Planner::new(SqliteTaskRepository::new(conn), config)
        .map_err(|err| format!("task load failed: {err}"))?;
    log::info!(
        "event=ffi_planner_open module=ffi status=ok db_path={}",
        db_path.display()
    );
    Ok(planner)
}

fn lock_planner() -> MutexGuard<'static, Option<Planner<SqliteTaskRepository>>> {
    // A panic inside an earlier call leaves consistent planner state behind.
    PLANNER.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_planner<T>(f: impl FnOnce(&mut Planner<SqliteTaskRepository>) -> T) -> Result<T, String> {
    let mut guard = lock_planner();
    if guard.is_none() {
        *guard = Some(open_planner()?);
    }
    match guard.as_mut() {
        Some(planner) => Ok(f(planner)),
        None => Err("planner unavailable".to_string()),
    }
}

fn mutate_task(
    op: &str,
    task_id: &str,
    success: &str,
    f: impl FnOnce(&mut Planner<SqliteTaskRepository>, TaskId) -> bool,
) -> TaskActionResponse {
    let id = match parse_task_id(task_id) {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(format!("{op} failed: {err}")),
    };
    match with_planner(|planner| f(planner, id)) {
        Ok(true) => TaskActionResponse::success(success, id),
        Ok(false) => TaskActionResponse::failure(format!("{op} skipped: no change for {id}")),
        Err(err) => TaskActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid task id `{raw}`"))
}

fn find_response(planner: &mut Planner<SqliteTaskRepository>) -> FindTasksResponse {
    let items = planner
        .find()
        .into_iter()
        .map(to_task_item)
        .collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No matching tasks.".to_string()
    } else {
        format!("Found {} task(s).", items.len())
    };
    let spec = planner.filter();
    FindTasksResponse {
        items,
        filter: Some(TaskFilterInput {
            context: spec.active_context.clone(),
            minutes: spec.selected_minutes,
            priority_only: spec.priority_only,
            energy: spec.energy().iter().cloned().collect(),
            projects: spec.projects().iter().cloned().collect(),
            tags: spec.tags().iter().cloned().collect(),
        }),
        reshuffle_token: planner.reshuffle_token(),
        message,
    }
}

fn focus_state(planner: &Planner<SqliteTaskRepository>, idle_message: &str) -> FocusResponse {
    match planner.focus_session() {
        Some(session) if session.is_paused() => FocusResponse::running(session, "Paused."),
        Some(session) => FocusResponse::running(session, "Running."),
        None => FocusResponse::idle(true, idle_message),
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        context: task.context.clone(),
        kind: task.kind.as_str().to_string(),
        minutes: task.minutes,
        is_priority: task.is_priority,
        completed_at: task.completed_at,
        updated_at: task.updated_at,
        energy: task.energy.clone(),
        project: task.project.clone(),
        tags: task.tags.clone(),
    }
}

fn to_review_response(summary: ReviewSummary) -> ReviewResponse {
    let message = if summary.completed.is_empty() {
        "No tasks completed yet.".to_string()
    } else {
        format!("{} task(s) completed today.", summary.completed.len())
    };
    ReviewResponse {
        completed: summary.completed.iter().map(to_task_item).collect(),
        most_productive_context: summary.most_productive_context,
        average_minutes: summary.average_minutes,
        time_bracket: summary.time_bracket.map(|bracket| bracket.label().to_string()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, filter_reset_advanced, focus_complete, focus_start, focus_status,
        focus_tick, focus_toggle_pause, init_logging, parse_tag_input, ping, review_today,
        task_add, task_complete, task_delete, task_edit, task_list, task_reopen,
        task_toggle_priority, tasks_find, tasks_reshuffle, time_options, TaskFilterInput,
    };
    use selectdo_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use selectdo_core::logging_status;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    static TEST_ROOT: OnceLock<TempDir> = OnceLock::new();

    /// Points the shared planner at a per-run temp database and log dir.
    ///
    /// Must run before the first planner call in every test that opens it.
    fn isolated_env() -> &'static TempDir {
        TEST_ROOT.get_or_init(|| {
            let root = tempfile::tempdir().expect("temp dir");
            std::env::set_var(ENV_DB_PATH, root.path().join("selectdo.sqlite3"));
            std::env::set_var(ENV_LOG_DIR, root.path().join("logs"));
            std::env::set_var(ENV_LOG_LEVEL, "debug");
            root
        })
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn static_helpers_expose_core_tables() {
        assert_eq!(time_options(), vec![5, 10, 15, 20, 25, 30, 45, 60]);
        assert_eq!(
            parse_tag_input("Deep; quick,".to_string()),
            vec!["deep".to_string(), "quick".to_string()]
        );
    }

    #[test]
    fn task_add_rejects_blank_title_and_unknown_kind() {
        isolated_env();
        let blank = task_add(
            "   ".to_string(),
            "Work".to_string(),
            "atomic".to_string(),
            5,
            false,
            None,
            None,
            Vec::new(),
        );
        assert!(!blank.ok);
        assert!(blank.message.contains("title"));

        let unknown = task_add(
            "Valid".to_string(),
            "Work".to_string(),
            "epic".to_string(),
            5,
            false,
            None,
            None,
            Vec::new(),
        );
        assert!(!unknown.ok);
        assert!(unknown.message.contains("epic"));
    }

    #[test]
    fn task_lifecycle_round_trips_through_planner() {
        isolated_env();
        let tag = unique_token("lifecycle");
        let created = task_add(
            "Lifecycle task".to_string(),
            "Work".to_string(),
            "Standard".to_string(),
            10,
            false,
            Some("High".to_string()),
            None,
            vec![tag.clone()],
        );
        assert!(created.ok, "{}", created.message);
        let id = created.task_id.expect("task_add should return task_id");

        let found = tasks_find(filter_for_tag("Work", &tag));
        assert_eq!(found.items.len(), 1, "{}", found.message);
        assert_eq!(found.items[0].energy.as_deref(), Some("High"));

        assert!(task_toggle_priority(id.clone()).ok);
        let edited = task_edit(
            id.clone(),
            Some("Lifecycle task renamed".to_string()),
            None,
            None,
            Some(20),
            None,
            Some(String::new()),
            None,
            None,
        );
        assert!(edited.ok, "{}", edited.message);

        let listed = task_list();
        let item = listed
            .iter()
            .find(|item| item.id == id)
            .expect("task should be listed");
        assert!(item.is_priority);
        assert_eq!(item.minutes, 20);
        assert_eq!(item.energy, None);
        assert_eq!(item.title, "Lifecycle task renamed");

        assert!(task_complete(id.clone()).ok);
        assert!(tasks_find(filter_for_tag("Work", &tag)).items.is_empty());
        assert!(review_today().completed.iter().any(|item| item.id == id));

        assert!(task_reopen(id.clone()).ok);
        assert!(task_delete(id.clone()).ok);
        assert!(!task_delete(id.clone()).ok);
        assert!(task_list().iter().all(|item| item.id != id));
    }

    #[test]
    fn planner_uses_isolated_database_and_configured_logging() {
        let root = isolated_env();
        let created = task_add(
            unique_token("isolated"),
            "Work".to_string(),
            "atomic".to_string(),
            5,
            false,
            Some("high".to_string()),
            None,
            Vec::new(),
        );
        assert!(created.ok, "{}", created.message);
        assert!(root.path().join("selectdo.sqlite3").exists());

        let (level, dir) = logging_status().expect("logging should be active");
        assert_eq!(level, "debug");
        assert_eq!(dir, root.path().join("logs"));

        let id = created.task_id.expect("task_add should return task_id");
        let item = task_list()
            .into_iter()
            .find(|item| item.id == id)
            .expect("task should be listed");
        assert_eq!(item.energy.as_deref(), Some("High"));
    }

    #[test]
    fn invalid_ids_are_reported() {
        isolated_env();
        let response = task_complete("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid task id"));
    }

    #[test]
    fn reshuffle_keeps_filter_and_bumps_token() {
        isolated_env();
        let tag = unique_token("reshuffle");
        for idx in 0..3 {
            let created = task_add(
                format!("Reshuffle {idx}"),
                "Personal".to_string(),
                "atomic".to_string(),
                5,
                false,
                None,
                None,
                vec![tag.clone()],
            );
            assert!(created.ok, "{}", created.message);
        }

        let first = tasks_find(filter_for_tag("Personal", &tag));
        assert_eq!(first.items.len(), 3, "{}", first.message);
        let second = tasks_reshuffle();
        assert!(second.reshuffle_token > first.reshuffle_token);

        let cleared = filter_reset_advanced();
        let filter = cleared.filter.expect("filter should be reported");
        assert!(filter.tags.is_empty());
    }

    #[test]
    fn focus_flow_completes_task() {
        isolated_env();
        let created = task_add(
            unique_token("focus"),
            "Work".to_string(),
            "standard".to_string(),
            25,
            false,
            None,
            None,
            Vec::new(),
        );
        let id = created.task_id.expect("task_add should return task_id");

        let started = focus_start(id.clone());
        assert!(started.ok, "{}", started.message);
        assert_eq!(started.total_seconds, 1_500);
        assert_eq!(started.clock, "25:00");

        let ticked = focus_tick();
        assert_eq!(ticked.remaining_seconds, 1_499);

        assert!(focus_toggle_pause().paused);
        assert_eq!(focus_tick().remaining_seconds, 1_499);
        assert!(!focus_toggle_pause().paused);

        let done = focus_complete();
        assert_eq!(done.finished_reason.as_deref(), Some("completed"));
        assert!(!focus_status().active);

        let item = task_list()
            .into_iter()
            .find(|item| item.id == id)
            .expect("task should be listed");
        assert!(item.completed_at.is_some());
    }

    fn filter_for_tag(context: &str, tag: &str) -> TaskFilterInput {
        TaskFilterInput {
            context: context.to_string(),
            minutes: None,
            priority_only: false,
            energy: Vec::new(),
            projects: Vec::new(),
            tags: vec![tag.to_string()],
        }
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
