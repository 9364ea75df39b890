//! Writer agent: weaves the completed steps into one tutorial, then names and tags it.

pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::agent::{recoverable_or_model, WriterAgent};
use crate::error::AgentError;
use crate::llm::{LlmClient, OutputSchema, SchemaField};
use crate::message::Message;
use crate::state::{ExpertState, WriterState};

pub fn keywords_schema() -> OutputSchema {
    OutputSchema::new("tutorial_keywords")
        .field(SchemaField::string_list("keywords", "Search keywords for the tutorial").required())
}

/// First non-empty line, without heading marks or surrounding quotes.
pub fn clean_title(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .trim_start_matches('#')
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*')
        .trim()
        .to_string()
}

/// Trims, drops blanks and case-insensitive duplicates; first spelling wins.
pub fn clean_keywords(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}

/// Model-backed [`WriterAgent`].
pub struct WriterService {
    llm: Arc<dyn LlmClient>,
}

impl WriterService {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl WriterAgent for WriterService {
    async fn generate_tutorial(&self, expert: &ExpertState) -> Result<WriterState, AgentError> {
        let messages = [
            Message::system(prompt::TUTORIAL_SYSTEM),
            Message::user(prompt::tutorial_request(expert)),
        ];
        let response = self.llm.invoke(&messages).await?;
        let tutorial = response.content.trim();
        if tutorial.is_empty() {
            return Err(AgentError::Writer("model returned an empty tutorial".into()));
        }
        debug!(tutorial_len = tutorial.len(), "tutorial generated");
        Ok(WriterState {
            subject: Some(expert.subject.clone()),
            difficulty_level: Some(expert.difficulty_level),
            title: None,
            tutorial: Some(tutorial.to_string()),
            keywords: None,
            created_at: Some(Utc::now()),
        })
    }

    async fn generate_title(
        &self,
        tutorial: &str,
        expert: &ExpertState,
    ) -> Result<String, AgentError> {
        let messages = [Message::user(prompt::title_prompt(tutorial, expert))];
        let response = self.llm.invoke(&messages).await?;
        let title = clean_title(&response.content);
        if title.is_empty() {
            return Err(AgentError::Writer("model returned an empty title".into()));
        }
        Ok(title)
    }

    async fn generate_keywords(
        &self,
        title: &str,
        tutorial: &str,
    ) -> Result<Vec<String>, AgentError> {
        let obj = self
            .llm
            .invoke_structured(&prompt::keywords_prompt(title, tutorial), &keywords_schema())
            .await
            .map_err(|e| recoverable_or_model(e, AgentError::Writer))?;
        let raw = match obj.get("keywords") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        };
        Ok(clean_keywords(raw))
    }
}
