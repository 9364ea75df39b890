//! Agent and workflow error types.
//!
//! Returned by the agent ports and by `TutorialWorkflow::run`. Nodes recover the
//! agent-level failures locally (see [`AgentError::is_recoverable`]); everything
//! else propagates to the caller with nothing checkpointed.

use thiserror::Error;

use crate::llm::LlmError;
use crate::memory::CheckpointError;
use crate::state::ValidationError;

/// Agent execution error.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Model invocation failed (backend unreachable, timeout, or schema violation).
    #[error("model: {0}")]
    Model(#[from] LlmError),

    /// Planner extraction returned data that could not be turned into a planner delta.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Learning-path output was not a JSON array of contiguous steps.
    #[error("learning path generation failed: {0}")]
    LearningPathGeneration(String),

    /// Step content output was missing or malformed.
    #[error("step content generation failed: {0}")]
    StepContentGeneration(String),

    /// The writer could not assemble a tutorial (e.g. empty reply).
    #[error("writer failed: {0}")]
    Writer(String),

    /// Data-model contract violation. Fatal; never repaired.
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    /// Checkpoint store failure.
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl AgentError {
    /// True when a node may swallow the error and re-prompt the user.
    ///
    /// Transport failures (`Unavailable`, `Timeout`) are not recoverable: the turn
    /// fails as a whole and the caller may retry it.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AgentError::Extraction(_)
            | AgentError::LearningPathGeneration(_)
            | AgentError::StepContentGeneration(_)
            | AgentError::Writer(_) => true,
            AgentError::Model(e) => e.is_schema_violation(),
            AgentError::Validation(_) | AgentError::Checkpoint(_) => false,
        }
    }
}
