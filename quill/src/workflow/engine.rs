//! Turn execution: load, run nodes until halt or terminal, save.

use std::sync::Arc;

use serde::Serialize;

use crate::agent::{
    ExpertAgent, ExpertService, PlannerAgent, PlannerService, WriterAgent, WriterService,
};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::memory::{CheckpointListItem, Checkpointer};
use crate::message::Message;
use crate::state::{SessionState, WriterState};

use super::logging::{
    log_node_complete, log_node_recovered, log_node_start, log_route, log_turn_complete,
    log_turn_error, log_turn_start,
};
use super::node::{NodeFailure, NodeId, NodeOutcome, Route};
use super::nodes::{expert_node, planner_node, writer_node};
use super::router::route_after;

/// What happened during one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    /// State after the turn (already saved when returned from `run_with_report`).
    pub state: SessionState,
    /// Finished tutorial, when the writer completed in this turn.
    pub artifact: Option<WriterState>,
    /// Nodes run, in order.
    pub visited: Vec<NodeId>,
    /// Failures recovered in this turn.
    pub failures: Vec<NodeFailure>,
    /// Assistant messages produced in this turn.
    pub new_messages: Vec<Message>,
    /// Id of the checkpoint written at the end of the turn.
    pub checkpoint_id: Option<String>,
}

impl TurnReport {
    /// Text of the assistant messages produced in this turn.
    pub fn replies(&self) -> impl Iterator<Item = &str> {
        self.new_messages.iter().map(Message::content)
    }
}

/// Planner → expert → writer state machine with checkpointed resume.
///
/// One instance can serve many sessions. Turns for the same session id must not
/// run concurrently; the engine takes no locks.
///
/// **Interaction**: The CLI builds one per process with `from_llm`; tests inject
/// agents or a `MockLlm` and a `MemorySaver`.
pub struct TutorialWorkflow {
    planner: Arc<dyn PlannerAgent>,
    expert: Arc<dyn ExpertAgent>,
    writer: Arc<dyn WriterAgent>,
    checkpointer: Arc<dyn Checkpointer<SessionState>>,
}

impl TutorialWorkflow {
    pub fn new(
        planner: Arc<dyn PlannerAgent>,
        expert: Arc<dyn ExpertAgent>,
        writer: Arc<dyn WriterAgent>,
        checkpointer: Arc<dyn Checkpointer<SessionState>>,
    ) -> Self {
        Self {
            planner,
            expert,
            writer,
            checkpointer,
        }
    }

    /// All three agents backed by the same model client.
    pub fn from_llm(
        llm: Arc<dyn LlmClient>,
        checkpointer: Arc<dyn Checkpointer<SessionState>>,
    ) -> Self {
        Self::new(
            Arc::new(PlannerService::new(llm.clone())),
            Arc::new(ExpertService::new(llm.clone())),
            Arc::new(WriterService::new(llm)),
            checkpointer,
        )
    }

    pub fn checkpointer(&self) -> &Arc<dyn Checkpointer<SessionState>> {
        &self.checkpointer
    }

    /// Runs one turn and returns the saved state.
    pub async fn run(
        &self,
        session_id: &str,
        user_message: &str,
    ) -> Result<SessionState, AgentError> {
        Ok(self.run_with_report(session_id, user_message).await?.state)
    }

    /// Runs one turn: load (or start empty), run, save.
    ///
    /// Nothing is saved when the turn fails.
    pub async fn run_with_report(
        &self,
        session_id: &str,
        user_message: &str,
    ) -> Result<TurnReport, AgentError> {
        let state = self.load(session_id).await?;
        log_turn_start(session_id, state.messages.len());
        let mut report = match self.run_turn(state, user_message).await {
            Ok(r) => r,
            Err(e) => {
                log_turn_error(session_id, &e);
                return Err(e);
            }
        };
        let checkpoint_id = self.checkpointer.save(session_id, &report.state).await?;
        log_turn_complete(session_id, &report.visited, Some(&checkpoint_id));
        report.checkpoint_id = Some(checkpoint_id);
        Ok(report)
    }

    /// Runs one turn on an in-memory state. The store is not touched.
    pub async fn run_turn(
        &self,
        mut state: SessionState,
        user_message: &str,
    ) -> Result<TurnReport, AgentError> {
        state.push_user(user_message);

        let mut visited = Vec::new();
        let mut failures = Vec::new();
        let mut new_messages = Vec::new();
        let mut artifact = None;
        let mut node = NodeId::ENTRY;

        loop {
            log_node_start(node);
            visited.push(node);
            let mut before = state.messages.len();

            let outcome = match node {
                NodeId::Planner => planner_node(state, self.planner.as_ref()).await?,
                NodeId::Expert => expert_node(state, self.expert.as_ref()).await?,
                NodeId::Writer => {
                    let (outcome, written) = writer_node(state, self.writer.as_ref()).await?;
                    if written.is_some() {
                        // History was replaced by the final message.
                        before = 0;
                        artifact = written;
                    }
                    outcome
                }
            };

            let after = &outcome.state().messages;
            let added = &after[before.min(after.len())..];
            let added_count = added.len();
            new_messages.extend(added.iter().filter(|m| m.is_assistant()).cloned());

            let (next_state, route) = match outcome {
                NodeOutcome::Advanced(s) => {
                    log_node_complete(node, "advanced", added_count);
                    let route = route_after(node, &s);
                    (s, route)
                }
                NodeOutcome::Halted(s) => {
                    log_node_complete(node, "halted", added_count);
                    (s, Route::Halt)
                }
                NodeOutcome::Failed(s, reason) => {
                    log_node_recovered(node, &reason);
                    failures.push(NodeFailure { node, reason });
                    (s, Route::Halt)
                }
            };
            state = next_state;
            log_route(node, route);

            match route {
                Route::Goto(next) => node = next,
                Route::Halt | Route::End => break,
            }
        }

        Ok(TurnReport {
            state,
            artifact,
            visited,
            failures,
            new_messages,
            checkpoint_id: None,
        })
    }

    /// Latest saved state, or an empty one for a new session.
    pub async fn load(&self, session_id: &str) -> Result<SessionState, AgentError> {
        Ok(self.checkpointer.load(session_id).await?.unwrap_or_default())
    }

    pub async fn history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, AgentError> {
        Ok(self.checkpointer.list(session_id, limit).await?)
    }

    /// Forgets the session entirely.
    pub async fn reset(&self, session_id: &str) -> Result<(), AgentError> {
        Ok(self.checkpointer.delete(session_id).await?)
    }
}
