//! Conditional edges. Pure functions of the session state.

use crate::state::SessionState;

use super::node::{NodeId, Route};

/// Fulfilled planner → expert, else wait for the user.
pub fn planner_router(state: &SessionState) -> Route {
    match &state.planner {
        Some(p) if p.is_fulfilled() => Route::Goto(NodeId::Expert),
        _ => Route::Halt,
    }
}

/// Completed learning path → writer, else wait for the user.
pub fn expert_router(state: &SessionState) -> Route {
    match &state.expert {
        Some(e) if e.is_completed() => Route::Goto(NodeId::Writer),
        _ => Route::Halt,
    }
}

/// Writer always ends the turn.
pub fn writer_router(_state: &SessionState) -> Route {
    Route::End
}

pub fn route_after(node: NodeId, state: &SessionState) -> Route {
    match node {
        NodeId::Planner => planner_router(state),
        NodeId::Expert => expert_router(state),
        NodeId::Writer => writer_router(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DifficultyLevel, ExpertState, ExpertStep, PlannerState, StepStatus};

    fn fulfilled() -> PlannerState {
        let mut p = PlannerState {
            subject: Some("Rust".into()),
            level: Some(DifficultyLevel::Beginner),
            ..Default::default()
        };
        p.fill_not_provided();
        p
    }

    #[test]
    fn planner_router_halts_until_fulfilled() {
        let mut s = SessionState::new();
        assert_eq!(planner_router(&s), Route::Halt);
        s.planner = Some(PlannerState {
            subject: Some("Rust".into()),
            level: Some(DifficultyLevel::Beginner),
            ..Default::default()
        });
        assert_eq!(planner_router(&s), Route::Halt);
        s.planner = Some(fulfilled());
        assert_eq!(planner_router(&s), Route::Goto(NodeId::Expert));
    }

    /// **Scenario**: a fulfilled planner routes to expert whatever the message history holds.
    #[test]
    fn planner_router_ignores_history() {
        let mut s = SessionState::new();
        s.planner = Some(fulfilled());
        for i in 0..5 {
            if i % 2 == 0 {
                s.push_user(format!("user {}", i));
            } else {
                s.push_assistant(format!("assistant {}", i));
            }
            assert_eq!(planner_router(&s), Route::Goto(NodeId::Expert));
            assert_eq!(planner_router(&s), planner_router(&s));
        }
    }

    #[test]
    fn expert_router_needs_completed_non_empty_path() {
        let mut s = SessionState::new();
        assert_eq!(expert_router(&s), Route::Halt);
        s.expert = Some(ExpertState::new("Rust", DifficultyLevel::Beginner));
        assert_eq!(expert_router(&s), Route::Halt);

        let mut e = ExpertState::with_learning_path(
            "Rust",
            DifficultyLevel::Beginner,
            vec![ExpertStep::new(1, "a"), ExpertStep::new(2, "b")],
        )
        .unwrap();
        e.update_step_status(1, StepStatus::Completed).unwrap();
        s.expert = Some(e.clone());
        assert_eq!(expert_router(&s), Route::Halt);
        e.update_step_status(2, StepStatus::Completed).unwrap();
        s.expert = Some(e);
        assert_eq!(expert_router(&s), Route::Goto(NodeId::Writer));
    }

    #[test]
    fn writer_routes_to_end() {
        assert_eq!(route_after(NodeId::Writer, &SessionState::new()), Route::End);
    }
}
