//! Model invocation port used by every agent.
//!
//! Two capabilities: plain chat ([`LlmClient::invoke`]) and schema-constrained
//! output ([`LlmClient::invoke_structured`]). The structured call has a default
//! implementation on top of `invoke`, so a backend only has to speak chat.
//!
//! Implementations: `ChatOpenAI` (OpenAI-compatible API), `MockLlm` (scripted,
//! for tests), and `RetryingLlm` (wraps another client with a retry policy).

mod mock;
mod openai;
mod retry;
mod schema;

pub use mock::{LlmCall, MockLlm, MockReply};
pub use openai::ChatOpenAI;
pub use retry::{RetryPolicy, RetryingLlm};
pub use schema::{FieldType, OutputSchema, SchemaField};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::message::Message;

/// Model call failure.
///
/// `Unavailable` and `Timeout` are transport problems: the turn fails and the
/// caller may retry. `SchemaViolation` means the model answered with something
/// unusable; agents recover from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("model timed out: {0}")]
    Timeout(String),
    #[error("schema violation: {0}")]
    SchemaViolation(String),
}

impl LlmError {
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, LlmError::SchemaViolation(_))
    }

    /// Worth retrying with the same request.
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Unavailable(_) | LlmError::Timeout(_))
    }
}

/// Token usage for one model call (prompt + completion).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from a chat call.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Token usage, when the backend reports it.
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

/// Model client: send messages, get text; or send a prompt plus schema, get an object.
///
/// **Interaction**: Held as `Arc<dyn LlmClient>` by the planner, expert and writer
/// services. Built once at process start.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat completion over `messages` (system first, then history).
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError>;

    /// Structured call: returns an object that satisfies `schema`.
    ///
    /// Default: adds a JSON-only system instruction, calls `invoke`, strips a code
    /// fence if present, parses, then [`OutputSchema::coerce`]s the result.
    async fn invoke_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Map<String, Value>, LlmError> {
        let messages = vec![
            Message::system(structured_instruction(schema)),
            Message::user(prompt),
        ];
        let response = self.invoke(&messages).await?;
        let value = parse_json_object(&response.content)?;
        schema.coerce(value)
    }
}

/// System instruction sent with every default structured call.
pub fn structured_instruction(schema: &OutputSchema) -> String {
    format!(
        "Respond with a single JSON object and nothing else. No prose, no Markdown. \
         The object must conform to this JSON Schema:\n{}",
        schema.to_json_schema()
    )
}

/// Removes one surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a model reply into a JSON object, tolerating a code fence or leading prose.
pub fn parse_json_object(text: &str) -> Result<Value, LlmError> {
    let body = strip_code_fence(text);
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(body) {
        return Ok(v);
    }
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str::<Value>(&body[start..=end])
            .ok()
            .filter(Value::is_object)
            .ok_or_else(|| LlmError::SchemaViolation(format!("not a JSON object: {}", preview(body)))),
        _ => Err(LlmError::SchemaViolation(format!(
            "not a JSON object: {}",
            preview(body)
        ))),
    }
}

fn preview(s: &str) -> String {
    const MAX: usize = 80;
    match s.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
