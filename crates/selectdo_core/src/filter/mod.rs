//! Find-screen filtering: the `TaskFilterSpec` value object and the engine
//! that turns the task collection into an ordered candidate list.

pub mod engine;
pub mod spec;
