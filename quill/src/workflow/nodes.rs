//! Node bodies: `(SessionState, agent) -> NodeOutcome`.
//!
//! Recoverable agent errors are handled here and surface as `Failed` with a
//! notice for the user. Anything else is returned as `Err` and aborts the turn.

use tracing::debug;

use crate::agent::planner::prompt::fallback_question;
use crate::agent::{ExpertAgent, PlannerAgent, WriterAgent};
use crate::error::AgentError;
use crate::message::Message;
use crate::state::{ExpertState, PlannerState, SessionState, WriterState};

use super::node::NodeOutcome;

pub const LEARNING_PATH_FAILED: &str =
    "I couldn't put together a learning path this time. Send any message and I'll try again.";

pub const WRITER_FAILED: &str =
    "I couldn't assemble the final tutorial this time. Send any message and I'll try again.";

pub fn step_failed_notice(step_number: u32, title: &str) -> String {
    format!(
        "I couldn't write step {} ({}) this time. Send any message and I'll try again.",
        step_number, title
    )
}

fn recoverable(err: AgentError) -> Result<String, AgentError> {
    if err.is_recoverable() {
        Ok(err.to_string())
    } else {
        Err(err)
    }
}

/// Planner: extract, then ask for whatever is still missing.
///
/// A fulfilled planner passes through untouched. When extraction fails the
/// user is re-prompted from the unchanged state.
pub async fn planner_node(
    mut state: SessionState,
    agent: &dyn PlannerAgent,
) -> Result<NodeOutcome, AgentError> {
    let planner = state.planner.get_or_insert_with(PlannerState::new).clone();
    if planner.is_fulfilled() {
        debug!("planner already fulfilled; passing through");
        return Ok(NodeOutcome::Advanced(state));
    }

    let user_message = state.last_user_message().unwrap_or_default().to_string();
    let (planner, failure) = match agent.extract_info(&user_message, &planner).await {
        Ok(updated) => (updated, None),
        Err(e) => (planner, Some(recoverable(e)?)),
    };

    let system_message = agent.create_system_message(&planner);
    let reply = agent.generate_response(&system_message, &state.messages).await?;
    let reply = if reply.trim().is_empty() {
        fallback_question(&planner)
    } else {
        reply
    };
    state.planner = Some(planner);
    state.push_assistant(reply);

    Ok(match failure {
        Some(reason) => NodeOutcome::Failed(state, reason),
        None => NodeOutcome::Advanced(state),
    })
}

fn learning_path_summary(expert: &ExpertState) -> String {
    let mut out = format!(
        "Here is your learning path for {} ({}):\n",
        expert.subject, expert.difficulty_level
    );
    for step in expert.learning_path() {
        out.push_str(&format!("\n{}. {}", step.step_number, step.title));
        if let Some(minutes) = step.estimated_time {
            out.push_str(&format!(" (~{} min)", minutes));
        }
    }
    if let Some(total) = expert.total_estimated_time() {
        out.push_str(&format!("\n\nEstimated total: {} min.", total));
    }
    out.push_str("\n\nSend any message to start with step 1.");
    out
}

/// Expert: one unit of work per visit.
///
/// Without a path, generate it and halt. With one, write the current step. A
/// completed path passes through so the writer can be retried.
pub async fn expert_node(
    mut state: SessionState,
    agent: &dyn ExpertAgent,
) -> Result<NodeOutcome, AgentError> {
    let mut expert = match state.expert.take() {
        Some(e) => e,
        None => {
            let Some(e) = state.planner.as_ref().and_then(ExpertState::from_planner) else {
                let planner = state.planner.clone().unwrap_or_default();
                state.push_assistant(fallback_question(&planner));
                return Ok(NodeOutcome::Failed(state, "subject and level unknown".into()));
            };
            e
        }
    };

    if expert.learning_path().is_empty() {
        let planner = state.planner.clone().unwrap_or_default();
        match agent.generate_learning_path(&planner).await {
            Ok(steps) => {
                expert.set_learning_path(steps)?;
                state.push_assistant(learning_path_summary(&expert));
                state.expert = Some(expert);
                Ok(NodeOutcome::Halted(state))
            }
            Err(e) => {
                let reason = recoverable(e)?;
                state.push_assistant(LEARNING_PATH_FAILED);
                state.expert = Some(expert);
                Ok(NodeOutcome::Failed(state, reason))
            }
        }
    } else if let Some(step) = expert.current_step().cloned() {
        match agent.generate_step_content(&expert, &step).await {
            Ok(done) => {
                let message = format!(
                    "## Step {}: {}\n\n{}",
                    done.step_number,
                    done.title,
                    done.content.as_deref().unwrap_or_default()
                );
                expert.replace_step(done)?;
                let progress = format!(
                    "\n\n_Progress: {:.0}% ({} of {} steps)_",
                    expert.progress(),
                    expert.completed_steps().count(),
                    expert.learning_path().len()
                );
                state.push_assistant(message + &progress);
                state.expert = Some(expert);
                Ok(NodeOutcome::Advanced(state))
            }
            Err(e) => {
                let reason = recoverable(e)?;
                state.push_assistant(step_failed_notice(step.step_number, &step.title));
                state.expert = Some(expert);
                Ok(NodeOutcome::Failed(state, reason))
            }
        }
    } else {
        debug!("learning path complete; passing through");
        state.expert = Some(expert);
        Ok(NodeOutcome::Advanced(state))
    }
}

/// Writer: tutorial, then title, then keywords. Resets the session on success.
///
/// Returns the artifact alongside the outcome because the reset clears it from
/// the state.
pub async fn writer_node(
    mut state: SessionState,
    agent: &dyn WriterAgent,
) -> Result<(NodeOutcome, Option<WriterState>), AgentError> {
    let Some(expert) = state.expert.clone().filter(ExpertState::is_completed) else {
        return Ok((
            NodeOutcome::Failed(state, "learning path not complete".into()),
            None,
        ));
    };

    let mut artifact = match agent.generate_tutorial(&expert).await {
        Ok(w) => w,
        Err(e) => {
            let reason = recoverable(e)?;
            state.push_assistant(WRITER_FAILED);
            return Ok((NodeOutcome::Failed(state, reason), None));
        }
    };
    let tutorial = artifact.tutorial.clone().unwrap_or_default();

    let title = match agent.generate_title(&tutorial, &expert).await {
        Ok(t) => t,
        Err(e) => {
            let reason = recoverable(e)?;
            debug!(%reason, "title generation failed; using subject");
            expert.subject.clone()
        }
    };
    let keywords = match agent.generate_keywords(&title, &tutorial).await {
        Ok(k) if !k.is_empty() => Some(k),
        Ok(_) => None,
        Err(e) => {
            let reason = recoverable(e)?;
            debug!(%reason, "keyword generation failed; continuing without");
            None
        }
    };
    artifact.title = Some(title.clone());
    artifact.keywords = keywords;

    state.messages = vec![Message::assistant(format!(
        "# {}\n\n{}",
        title, tutorial
    ))];
    state.reset_agents();
    Ok((NodeOutcome::Advanced(state), Some(artifact)))
}
