//! Structured logging for workflow execution.

use super::node::{NodeId, Route};
use crate::error::AgentError;

pub fn log_turn_start(session_id: &str, message_count: usize) {
    tracing::info!(session_id, message_count, "Starting turn");
}

pub fn log_turn_complete(session_id: &str, visited: &[NodeId], checkpoint_id: Option<&str>) {
    tracing::info!(session_id, ?visited, checkpoint_id, "Turn complete");
}

pub fn log_turn_error(session_id: &str, error: &AgentError) {
    tracing::error!(session_id, %error, "Turn failed; nothing saved");
}

pub fn log_node_start(node: NodeId) {
    tracing::debug!(node = %node, "Starting node execution");
}

pub fn log_node_complete(node: NodeId, outcome: &'static str, added_messages: usize) {
    tracing::debug!(node = %node, outcome, added_messages, "Node execution complete");
}

pub fn log_route(from: NodeId, route: Route) {
    tracing::debug!(from = %from, ?route, "Route chosen");
}

pub fn log_node_recovered(node: NodeId, reason: &str) {
    tracing::warn!(node = %node, reason, "Node failed; user re-prompted");
}
