//! Expert agent: designs the learning path, then writes it one step at a time.

pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::agent::{recoverable_or_model, ExpertAgent};
use crate::error::AgentError;
use crate::llm::{strip_code_fence, LlmClient, OutputSchema, SchemaField};
use crate::message::Message;
use crate::state::{
    validate_step_numbers, ExpertState, ExpertStep, PlannerState, StepStatus,
};

use prompt::{LEARNING_PATH_SYSTEM, MAX_STEPS};

pub fn step_content_schema() -> OutputSchema {
    OutputSchema::new("step_content")
        .field(SchemaField::string("content", "Full chapter text in Markdown").required())
        .field(SchemaField::string(
            "prerequisites",
            "What the reader should know before this chapter",
        ))
        .field(SchemaField::integer(
            "estimated_time",
            "Minutes a reader needs for this chapter",
        ))
}

#[derive(Deserialize)]
struct RawStep {
    step_number: u32,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    estimated_time: Option<Value>,
}

/// Estimates above a week are treated as unknown.
const MAX_STEP_MINUTES: u32 = 7 * 24 * 60;

/// Minutes from `45`, `45.0`, `"45"` or `"45 minutes"`.
fn parse_minutes(v: &Value) -> Option<u32> {
    let minutes = match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    };
    minutes.filter(|m| *m <= MAX_STEP_MINUTES)
}

/// Parses the learning-path reply: a JSON array (optionally fenced) of steps
/// numbered `1..=N`. Longer paths are cut to [`MAX_STEPS`].
pub fn parse_learning_path(raw: &str) -> Result<Vec<ExpertStep>, AgentError> {
    let body = strip_code_fence(raw);
    let parsed: Vec<RawStep> = serde_json::from_str(body)
        .map_err(|e| AgentError::LearningPathGeneration(format!("not a JSON array of steps: {}", e)))?;
    if parsed.is_empty() {
        return Err(AgentError::LearningPathGeneration("empty learning path".into()));
    }
    let mut steps: Vec<ExpertStep> = parsed
        .into_iter()
        .map(|r| ExpertStep {
            step_number: r.step_number,
            title: r.title.trim().to_string(),
            description: r.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            content: None,
            prerequisites: None,
            estimated_time: r.estimated_time.as_ref().and_then(parse_minutes),
            status: StepStatus::Pending,
            completed_at: None,
        })
        .collect();
    if let Some(untitled) = steps.iter().find(|s| s.title.is_empty()) {
        return Err(AgentError::LearningPathGeneration(format!(
            "step {} has no title",
            untitled.step_number
        )));
    }
    validate_step_numbers(&steps).map_err(|e| AgentError::LearningPathGeneration(e.to_string()))?;
    steps.sort_by_key(|s| s.step_number);
    steps.truncate(MAX_STEPS);
    Ok(steps)
}

/// Model-backed [`ExpertAgent`].
pub struct ExpertService {
    llm: Arc<dyn LlmClient>,
}

impl ExpertService {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ExpertAgent for ExpertService {
    async fn generate_learning_path(
        &self,
        planner: &PlannerState,
    ) -> Result<Vec<ExpertStep>, AgentError> {
        let messages = [
            Message::system(LEARNING_PATH_SYSTEM),
            Message::user(prompt::learning_path_request(planner)),
        ];
        let response = self.llm.invoke(&messages).await?;
        let steps = parse_learning_path(&response.content)?;
        debug!(steps = steps.len(), "learning path generated");
        Ok(steps)
    }

    async fn generate_step_content(
        &self,
        expert: &ExpertState,
        step: &ExpertStep,
    ) -> Result<ExpertStep, AgentError> {
        let prompt = prompt::step_content_prompt(expert, step);
        let obj = self
            .llm
            .invoke_structured(&prompt, &step_content_schema())
            .await
            .map_err(|e| recoverable_or_model(e, AgentError::StepContentGeneration))?;

        let content = obj
            .get("content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                AgentError::StepContentGeneration(format!("step {}: empty content", step.step_number))
            })?;
        let prerequisites = obj
            .get("prerequisites")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let mut done = step.clone();
        done.content = Some(content.to_string());
        done.prerequisites = prerequisites;
        if done.estimated_time.is_none() {
            done.estimated_time = obj.get("estimated_time").and_then(parse_minutes);
        }
        done.set_status(StepStatus::Completed);
        debug!(step = done.step_number, content_len = content.len(), "step content generated");
        Ok(done)
    }
}
