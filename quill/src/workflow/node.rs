//! Node identities, routes and node outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::SessionState;

/// The three nodes of the tutorial workflow. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeId {
    Planner,
    Expert,
    Writer,
}

impl NodeId {
    /// Every turn starts here.
    pub const ENTRY: NodeId = NodeId::Planner;

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::Planner => "planner",
            NodeId::Expert => "expert",
            NodeId::Writer => "writer",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to go after a node.
///
/// - **Goto(id)**: run that node next, in the same turn.
/// - **Halt**: end the turn and wait for the user.
/// - **End**: terminal reached; the turn is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Goto(NodeId),
    Halt,
    End,
}

/// Result of running one node.
///
/// `Advanced` lets the router decide what comes next. `Halted` ends the turn
/// whatever the router would say. `Failed` ends the turn after a recovered
/// failure; the state already carries the notice for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    Advanced(SessionState),
    Halted(SessionState),
    Failed(SessionState, String),
}

impl NodeOutcome {
    pub fn state(&self) -> &SessionState {
        match self {
            NodeOutcome::Advanced(s) | NodeOutcome::Halted(s) | NodeOutcome::Failed(s, _) => s,
        }
    }
}

/// A failure a node recovered from during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailure {
    pub node: NodeId,
    pub reason: String,
}
