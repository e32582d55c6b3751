//! Focus session state machine.
//!
//! # Responsibility
//! - Track the single countdown bound to one task snapshot.
//! - Report how a session ended so the caller can write completion back.
//!
//! # Invariants
//! - At most one session is active per controller.
//! - The session holds a copy of the task; later edits never reach it.
//! - `remaining_seconds` only decreases and never goes below zero.
//! - `Finished` is transient: it is returned as a `FocusOutcome` and the
//!   controller is back to `Idle` in the same call.

use crate::model::task::{Task, TaskId};
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// What `start` does while another session is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusStartPolicy {
    /// Refuse with `FocusError::SessionActive`.
    #[default]
    Reject,
    /// Discard the running session and start the new one.
    Replace,
}

impl FocusStartPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Replace => "replace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "replace" => Some(Self::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusError {
    TaskNotFound(TaskId),
    TaskCompleted(TaskId),
    SessionActive { active_task: TaskId },
}

impl Display for FocusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::TaskCompleted(id) => write!(f, "task already completed: {id}"),
            Self::SessionActive { active_task } => {
                write!(f, "a focus session is already running for task {active_task}")
            }
        }
    }
}

impl Error for FocusError {}

/// Controller state as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    Running,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Countdown reached zero.
    Elapsed,
    /// User marked the task complete.
    Completed,
    /// User stopped and discarded the session.
    Discarded,
    /// A new session replaced this one.
    Replaced,
}

impl FinishReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elapsed => "elapsed",
            Self::Completed => "completed",
            Self::Discarded => "discarded",
            Self::Replaced => "replaced",
        }
    }
}

/// One running countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSession {
    id: Uuid,
    task: Task,
    started_at: i64,
    total_seconds: u32,
    remaining_seconds: u32,
    paused: bool,
}

impl FocusSession {
    fn new(task: &Task, now_ms: i64) -> Self {
        let total_seconds = task.minutes.saturating_mul(60);
        Self {
            id: Uuid::new_v4(),
            task: task.clone(),
            started_at: now_ms,
            total_seconds,
            remaining_seconds: total_seconds,
            paused: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Task snapshot taken at start.
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fraction of the countdown already spent, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        f64::from(self.elapsed_seconds()) / f64::from(self.total_seconds)
    }
}

/// A finished session and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusOutcome {
    pub session: FocusSession,
    pub reason: FinishReason,
}

impl FocusOutcome {
    pub fn task_id(&self) -> TaskId {
        self.session.task_id()
    }

    /// Whether the bound task should be marked completed.
    pub fn completes_task(&self, complete_on_elapse: bool) -> bool {
        match self.reason {
            FinishReason::Completed => true,
            FinishReason::Elapsed => complete_on_elapse,
            FinishReason::Discarded | FinishReason::Replaced => false,
        }
    }
}

/// Result of delivering timer ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session; the tick was ignored.
    Idle,
    /// Session is paused; nothing changed.
    Paused { remaining_seconds: u32 },
    Running { remaining_seconds: u32 },
    Finished(FocusOutcome),
}

/// Owner of the single active focus session.
#[derive(Debug, Clone, Default)]
pub struct FocusController {
    policy: FocusStartPolicy,
    active: Option<FocusSession>,
}

impl FocusController {
    pub fn new(policy: FocusStartPolicy) -> Self {
        Self {
            policy,
            active: None,
        }
    }

    pub fn policy(&self) -> FocusStartPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FocusStartPolicy) {
        self.policy = policy;
    }

    pub fn state(&self) -> FocusState {
        if self.active.is_some() {
            FocusState::Running
        } else {
            FocusState::Idle
        }
    }

    pub fn session(&self) -> Option<&FocusSession> {
        self.active.as_ref()
    }

    /// `Idle -> Running` for an open task.
    ///
    /// # Errors
    /// - `TaskCompleted` when the task is not open.
    /// - `SessionActive` when a session runs and the policy is `Reject`.
    pub fn start(&mut self, task: &Task, now_ms: i64) -> Result<&FocusSession, FocusError> {
        if !task.is_open() {
            return Err(FocusError::TaskCompleted(task.id));
        }

        if let Some(current) = self.active.as_ref() {
            match self.policy {
                FocusStartPolicy::Reject => {
                    return Err(FocusError::SessionActive {
                        active_task: current.task_id(),
                    });
                }
                FocusStartPolicy::Replace => {
                    self.finish(FinishReason::Replaced);
                }
            }
        }

        let session = FocusSession::new(task, now_ms);
        info!(
            "event=focus_start module=focus status=ok session_id={} task_id={} total_seconds={}",
            session.id, session.task.id, session.total_seconds
        );
        Ok(self.active.insert(session))
    }

    /// One timer tick (1 Hz).
    pub fn tick(&mut self) -> TickOutcome {
        self.advance(1)
    }

    /// Delivers `seconds` worth of ticks at once, e.g. after the host was
    /// suspended. Clamped at zero; reaching zero finishes with `Elapsed`.
    pub fn advance(&mut self, seconds: u32) -> TickOutcome {
        let Some(session) = self.active.as_mut() else {
            return TickOutcome::Idle;
        };

        if session.paused {
            return TickOutcome::Paused {
                remaining_seconds: session.remaining_seconds,
            };
        }

        session.remaining_seconds = session.remaining_seconds.saturating_sub(seconds);
        if session.remaining_seconds > 0 {
            return TickOutcome::Running {
                remaining_seconds: session.remaining_seconds,
            };
        }

        match self.finish(FinishReason::Elapsed) {
            Some(outcome) => TickOutcome::Finished(outcome),
            None => TickOutcome::Idle,
        }
    }

    /// Flips pause. Returns the new paused flag, or `None` when idle.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        let session = self.active.as_mut()?;
        session.paused = !session.paused;
        Some(session.paused)
    }

    /// Stop and discard; the task stays open.
    pub fn stop(&mut self) -> Option<FocusOutcome> {
        self.finish(FinishReason::Discarded)
    }

    /// Ends the session as completed. The caller writes completion back.
    pub fn complete(&mut self) -> Option<FocusOutcome> {
        self.finish(FinishReason::Completed)
    }

    fn finish(&mut self, reason: FinishReason) -> Option<FocusOutcome> {
        let session = self.active.take()?;
        info!(
            "event=focus_finish module=focus status=ok session_id={} task_id={} reason={} elapsed_seconds={}",
            session.id,
            session.task.id,
            reason.as_str(),
            session.elapsed_seconds()
        );
        Some(FocusOutcome { session, reason })
    }
}

/// Formats seconds as `MM:SS`; minutes are not wrapped into hours.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::{format_clock, FocusController, FocusStartPolicy, TickOutcome};
    use crate::model::task::{NewTask, Task, TaskKind};

    #[test]
    fn format_clock_pads_fields() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(7_200), "120:00");
    }

    #[test]
    fn paused_session_ignores_ticks() {
        let task = Task::create(NewTask::new("Stretch", "Personal", TaskKind::Atomic, 1), 0)
            .expect("valid task");
        let mut controller = FocusController::new(FocusStartPolicy::Reject);
        controller.start(&task, 0).expect("start");

        assert_eq!(controller.toggle_pause(), Some(true));
        assert_eq!(
            controller.tick(),
            TickOutcome::Paused {
                remaining_seconds: 60
            }
        );
        assert_eq!(controller.toggle_pause(), Some(false));
        assert_eq!(
            controller.tick(),
            TickOutcome::Running {
                remaining_seconds: 59
            }
        );
    }
}
