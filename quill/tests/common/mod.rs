//! Shared fixtures for workflow integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use quill::{
    DifficultyLevel, ExpertState, ExpertStep, LlmClient, MemorySaver, MockLlm, PlannerState,
    SessionState, StepStatus, TutorialWorkflow,
};
use serde_json::{json, Value};

pub fn python_beginner() -> PlannerState {
    PlannerState {
        subject: Some("Python".into()),
        level: Some(DifficultyLevel::Beginner),
        ..Default::default()
    }
}

/// Subject and level set, optional fields marked not provided.
pub fn fulfilled_planner() -> PlannerState {
    let mut p = python_beginner();
    p.fill_not_provided();
    p
}

/// JSON the expert returns for a path of `n` steps.
pub fn learning_path_json(n: u32) -> String {
    let steps: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "step_number": i,
                "title": format!("Topic {}", i),
                "description": format!("What topic {} covers", i),
                "estimated_time": 10 * i,
            })
        })
        .collect();
    format!("```json\n{}\n```", Value::Array(steps))
}

/// Expert state with `n` steps; the first `completed` have content.
pub fn expert_with_progress(n: u32, completed: u32) -> ExpertState {
    let steps = (1..=n)
        .map(|i| ExpertStep::new(i, format!("Topic {}", i)).with_description(format!("About {}", i)))
        .collect();
    let mut expert = ExpertState::with_learning_path("Python", DifficultyLevel::Beginner, steps)
        .expect("valid path");
    for i in 1..=completed {
        let mut step = expert.step(i).expect("step exists").clone();
        step.content = Some(format!("Step {} body", i));
        step.set_status(StepStatus::Completed);
        expert.replace_step(step).expect("replace");
    }
    expert
}

/// Session ready for the expert: fulfilled planner plus the given expert state.
pub fn session_with_expert(expert: ExpertState) -> SessionState {
    SessionState {
        messages: vec![],
        planner: Some(fulfilled_planner()),
        expert: Some(expert),
        writer: None,
    }
}

pub fn workflow(llm: Arc<MockLlm>) -> (TutorialWorkflow, Arc<MemorySaver<SessionState>>) {
    let store = Arc::new(MemorySaver::<SessionState>::new());
    let llm: Arc<dyn LlmClient> = llm;
    let wf = TutorialWorkflow::from_llm(llm, store.clone());
    (wf, store)
}
