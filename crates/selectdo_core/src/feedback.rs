//! Fire-and-forget user feedback (haptics, sounds, toasts).
//!
//! The core only reports what happened; the host decides how it feels.
//! Sink failures never affect store state.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store events worth a feedback pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    /// Light pulse after a task is added.
    Added,
    /// Success pulse after a task is completed.
    Completed,
    /// Light pulse after the priority flag flips.
    PriorityToggled,
    /// Light pulse after a task is deleted.
    Deleted,
    /// Light pulse when a focus session starts.
    FocusStarted,
}

impl FeedbackEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Completed => "completed",
            Self::PriorityToggled => "priority_toggled",
            Self::Deleted => "deleted",
            Self::FocusStarted => "focus_started",
        }
    }
}

/// Failure reported by a sink. Logged at debug level and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackError(pub String);

impl Display for FeedbackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "feedback failed: {}", self.0)
    }
}

impl Error for FeedbackError {}

/// Feedback collaborator.
pub trait FeedbackSink: Send {
    fn emit(&self, event: FeedbackEvent) -> Result<(), FeedbackError>;
}

/// Sink that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn emit(&self, _event: FeedbackEvent) -> Result<(), FeedbackError> {
        Ok(())
    }
}
