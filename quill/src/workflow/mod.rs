//! Tutorial workflow: planner → expert → writer as an explicit state machine.
//!
//! - `planner` → [`planner_router`]: fulfilled planner → `expert`, else halt.
//! - `expert` → [`expert_router`]: completed path → `writer`, else halt. One unit
//!   of work per visit (the whole step list once, then one step at a time).
//! - `writer` → terminal. Writes the tutorial, then resets the session.
//!
//! Recoverable agent failures end the turn with a notice (`NodeOutcome::Failed`);
//! transport, validation and checkpoint errors abort it and nothing is saved.

mod engine;
mod logging;
mod node;
mod nodes;
mod router;

pub use engine::{TurnReport, TutorialWorkflow};
pub use node::{NodeFailure, NodeId, NodeOutcome, Route};
pub use nodes::{
    expert_node, planner_node, step_failed_notice, writer_node, LEARNING_PATH_FAILED,
    WRITER_FAILED,
};
pub use router::{expert_router, planner_router, route_after, writer_router};
