//! Agent ports: planner, expert, writer.
//!
//! Each port wraps the model client and does three things for its node: build a
//! prompt from state, turn the model output into a typed value, and hand it back
//! for the node to apply. Ports never touch `SessionState` directly.
//!
//! The traits are the seams the workflow depends on; `PlannerService`,
//! `ExpertService` and `WriterService` are the model-backed implementations.

pub mod expert;
pub mod planner;
pub mod writer;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::{ExpertState, ExpertStep, PlannerState, WriterState};

pub use expert::ExpertService;
pub use planner::PlannerService;
pub use writer::WriterService;

/// Gathers the learning goal from the conversation.
#[async_trait]
pub trait PlannerAgent: Send + Sync {
    /// Returns `state` with any fields found in `user_message` filled in. Set
    /// fields are never overwritten.
    async fn extract_info(
        &self,
        user_message: &str,
        state: &PlannerState,
    ) -> Result<PlannerState, AgentError>;

    /// System prompt asking for whatever is still missing.
    fn create_system_message(&self, state: &PlannerState) -> String;

    /// Next assistant reply for the conversation.
    async fn generate_response(
        &self,
        system_message: &str,
        history: &[Message],
    ) -> Result<String, AgentError>;
}

/// Builds the learning path and the content of each step.
#[async_trait]
pub trait ExpertAgent: Send + Sync {
    /// All steps `pending`, numbered `1..=N`.
    async fn generate_learning_path(
        &self,
        planner: &PlannerState,
    ) -> Result<Vec<ExpertStep>, AgentError>;

    /// `step` with content filled in and marked completed.
    async fn generate_step_content(
        &self,
        expert: &ExpertState,
        step: &ExpertStep,
    ) -> Result<ExpertStep, AgentError>;
}

/// Turns a completed learning path into one tutorial.
#[async_trait]
pub trait WriterAgent: Send + Sync {
    async fn generate_tutorial(&self, expert: &ExpertState) -> Result<WriterState, AgentError>;

    async fn generate_title(
        &self,
        tutorial: &str,
        expert: &ExpertState,
    ) -> Result<String, AgentError>;

    async fn generate_keywords(&self, title: &str, tutorial: &str)
        -> Result<Vec<String>, AgentError>;
}

/// Fills `{name}` placeholders in one pass over `template`. Substituted values
/// are never scanned again; unknown placeholders are kept as written.
pub(crate) fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Model schema violations become the caller's agent error; transport errors pass through.
pub(crate) fn recoverable_or_model(
    err: crate::llm::LlmError,
    wrap: fn(String) -> AgentError,
) -> AgentError {
    if err.is_schema_violation() {
        wrap(err.to_string())
    } else {
        AgentError::Model(err)
    }
}

#[cfg(test)]
mod tests {
    use super::fill_template;

    #[test]
    fn fill_template_substitutes_known_keys() {
        let out = fill_template("Step {number}: {title}", &[("number", "2"), ("title", "Loops")]);
        assert_eq!(out, "Step 2: Loops");
    }

    /// **Scenario**: values that contain placeholders stay literal.
    #[test]
    fn fill_template_does_not_rescan_values() {
        let out = fill_template(
            "{goal}|{completed}",
            &[("goal", "say {completed} twice"), ("completed", "done")],
        );
        assert_eq!(out, "say {completed} twice|done");
    }

    #[test]
    fn fill_template_keeps_unknown_and_unbalanced_braces() {
        let out = fill_template("fn main() { {x} {y", &[("x", "1")]);
        assert_eq!(out, "fn main() { 1 {y");
    }
}
