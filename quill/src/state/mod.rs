//! Session data model: planner goal, expert learning path, writer artifact.
//!
//! [`SessionState`] is the only record the workflow passes between nodes. Each
//! agent owns one sub-state and the engine owns the whole record for one turn.

mod expert;
mod planner;
mod session;
mod writer;

pub use expert::{validate_step_numbers, ExpertState, ExpertStep, StepStatus, ValidationError};
pub use planner::{DifficultyLevel, PlannerDelta, PlannerState, NOT_PROVIDED};
pub use session::SessionState;
pub use writer::WriterState;
