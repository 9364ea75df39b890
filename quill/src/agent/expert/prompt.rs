//! Expert prompts.

use crate::agent::fill_template;
use crate::state::{ExpertState, ExpertStep, PlannerState, NOT_PROVIDED};

/// Upper bound on learning path length.
pub const MAX_STEPS: usize = 20;

pub const LEARNING_PATH_SYSTEM: &str = r#"You are a senior engineer and teacher. Design a practical learning path for the goal below.

Output format: a JSON array and nothing else. Each element is an object:
{"step_number": <integer starting at 1>, "title": "<short title>", "description": "<one or two sentences>", "estimated_time": <minutes as integer>}

Rules:
- Number the steps 1, 2, 3, ... without gaps.
- At most 20 steps.
- Do not include setup or installation steps; assume the environment is ready.
- Order the steps so each builds on the previous ones.
- Match the depth to the learner's level."#;

pub const STEP_CONTENT_PROMPT: &str = r#"You are writing one chapter of a tutorial. Earlier chapters are already written; build on them and do not repeat them.

Goal:
{goal}

Chapters already written:
{completed}

Write the chapter for this step:
Step {number}: {title}
{description}

Return "content" with the full chapter in Markdown (explanations and code examples) "prerequisites" with a short note on what the reader should know before this chapter and "estimated_time" with the minutes a reader needs for it."#;

fn push_line(out: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| *v != NOT_PROVIDED && !v.trim().is_empty()) {
        out.push(format!("- {}: {}", label, v));
    }
}

/// Goal summary shared by the learning-path and step prompts.
pub fn goal_lines(
    subject: &str,
    level: &str,
    project_type: Option<&str>,
    environment: Option<&str>,
    instructions: Option<&str>,
) -> String {
    let mut lines = vec![format!("- subject: {}", subject), format!("- level: {}", level)];
    push_line(&mut lines, "project", project_type);
    push_line(&mut lines, "environment", environment);
    push_line(&mut lines, "extra instructions", instructions);
    lines.join("\n")
}

pub fn learning_path_request(planner: &PlannerState) -> String {
    let level = planner.level.map(|l| l.to_string()).unwrap_or_default();
    goal_lines(
        planner.subject.as_deref().unwrap_or_default(),
        &level,
        planner.project_type.as_deref(),
        planner.environment.as_deref(),
        planner.instructions.as_deref(),
    )
}

pub fn step_content_prompt(expert: &ExpertState, step: &ExpertStep) -> String {
    let goal = goal_lines(
        &expert.subject,
        expert.difficulty_level.as_str(),
        expert.project_type.as_deref(),
        expert.environment.as_deref(),
        expert.instructions.as_deref(),
    );
    let completed: Vec<String> = expert
        .completed_steps()
        .map(|s| {
            format!(
                "## Step {}: {}\n{}\n\n{}",
                s.step_number,
                s.title,
                s.description.as_deref().unwrap_or_default(),
                s.content.as_deref().unwrap_or_default()
            )
        })
        .collect();
    let completed = if completed.is_empty() {
        "(none yet)".to_string()
    } else {
        completed.join("\n\n")
    };
    fill_template(
        STEP_CONTENT_PROMPT,
        &[
            ("goal", goal.as_str()),
            ("completed", completed.as_str()),
            ("number", step.step_number.to_string().as_str()),
            ("title", step.title.as_str()),
            ("description", step.description.as_deref().unwrap_or_default()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DifficultyLevel, StepStatus};

    /// **Scenario**: placeholder text typed by the user or written by the model stays literal.
    #[test]
    fn step_prompt_keeps_placeholder_text_from_inputs() {
        let steps = vec![
            ExpertStep::new(1, "Format strings").with_description("Use {title} and {goal}"),
            ExpertStep::new(2, "Next"),
        ];
        let mut expert =
            ExpertState::with_learning_path("Rust", DifficultyLevel::Beginner, steps).unwrap();
        expert.instructions = Some("mention {completed} literally".into());
        let mut done = expert.step(1).unwrap().clone();
        done.content = Some("println!(\"{number}\")".into());
        done.set_status(StepStatus::Completed);
        expert.replace_step(done).unwrap();

        let prompt = step_content_prompt(&expert, expert.step(2).unwrap());

        assert!(prompt.contains("- extra instructions: mention {completed} literally"));
        assert!(prompt.contains("Use {title} and {goal}"));
        assert!(prompt.contains("println!(\"{number}\")"));
        assert!(prompt.contains("Step 2: Next"));
        assert_eq!(prompt.matches("- subject: Rust").count(), 1);
    }
}
