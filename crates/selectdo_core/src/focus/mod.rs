//! Focus/pomodoro session controller.

mod controller;

pub use controller::{
    format_clock, FinishReason, FocusController, FocusError, FocusOutcome, FocusSession,
    FocusStartPolicy, FocusState, TickOutcome,
};
