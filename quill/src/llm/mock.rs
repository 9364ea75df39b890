//! Scripted model client for tests and offline runs.
//!
//! Replies are consumed in FIFO order, one per call, whatever the call kind. When
//! the script runs out the fallback text is returned. Every call is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{parse_json_object, LlmClient, LlmError, LlmResponse, OutputSchema};
use crate::message::Message;

/// One scripted reply.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Raw text. A structured call parses it, so malformed JSON yields a schema violation.
    Text(String),
    /// A JSON value. `invoke` returns it serialized; structured calls coerce it.
    Structured(Value),
    /// An error returned as-is.
    Fail(LlmError),
}

/// What the mock was asked.
#[derive(Clone, Debug, PartialEq)]
pub enum LlmCall {
    Chat(Vec<Message>),
    Structured { prompt: String, schema: String },
}

impl LlmCall {
    /// All prompt text of the call, for `contains` assertions.
    pub fn text(&self) -> String {
        match self {
            LlmCall::Chat(messages) => messages
                .iter()
                .map(Message::content)
                .collect::<Vec<_>>()
                .join("\n"),
            LlmCall::Structured { prompt, .. } => prompt.clone(),
        }
    }
}

/// Deterministic [`LlmClient`] driven by a reply script.
pub struct MockLlm {
    script: Mutex<VecDeque<MockReply>>,
    fallback: String,
    calls: Mutex<Vec<LlmCall>>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: "OK".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock that answers every call with `content`.
    pub fn always(content: impl Into<String>) -> Self {
        Self::new().with_fallback(content)
    }

    pub fn with_fallback(mut self, content: impl Into<String>) -> Self {
        self.fallback = content.into();
        self
    }

    pub fn then_text(self, content: impl Into<String>) -> Self {
        self.push(MockReply::Text(content.into()));
        self
    }

    pub fn then_json(self, value: Value) -> Self {
        self.push(MockReply::Structured(value));
        self
    }

    pub fn then_fail(self, err: LlmError) -> Self {
        self.push(MockReply::Fail(err));
        self
    }

    pub fn push(&self, reply: MockReply) {
        lock(&self.script).push_back(reply);
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    fn next(&self, call: LlmCall) -> MockReply {
        lock(&self.calls).push(call);
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(self.fallback.clone()))
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        match self.next(LlmCall::Chat(messages.to_vec())) {
            MockReply::Text(s) => Ok(LlmResponse::text(s)),
            MockReply::Structured(v) => Ok(LlmResponse::text(v.to_string())),
            MockReply::Fail(e) => Err(e),
        }
    }

    async fn invoke_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Map<String, Value>, LlmError> {
        let call = LlmCall::Structured {
            prompt: prompt.to_string(),
            schema: schema.name.clone(),
        };
        match self.next(call) {
            MockReply::Text(s) => schema.coerce(parse_json_object(&s)?),
            MockReply::Structured(v) => schema.coerce(v),
            MockReply::Fail(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::SchemaField;
    use serde_json::json;

    fn schema() -> OutputSchema {
        OutputSchema::new("t").field(SchemaField::string("a", "a").required())
    }

    #[tokio::test]
    async fn replies_in_order_then_fallback() {
        let llm = MockLlm::always("done")
            .then_text("first")
            .then_fail(LlmError::Timeout("slow".into()));
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "first");
        assert!(matches!(llm.invoke(&[]).await, Err(LlmError::Timeout(_))));
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "done");
        assert_eq!(llm.call_count(), 3);
    }

    /// **Scenario**: a text reply consumed by a structured call is parsed; garbage is a violation.
    #[tokio::test]
    async fn structured_call_parses_text_replies() {
        let llm = MockLlm::new()
            .then_text(r#"{"a": "x"}"#)
            .then_text("not json")
            .then_json(json!({"b": 1}));
        assert_eq!(llm.invoke_structured("p", &schema()).await.unwrap()["a"], "x");
        assert!(llm.invoke_structured("p", &schema()).await.unwrap_err().is_schema_violation());
        assert!(llm.invoke_structured("p", &schema()).await.unwrap_err().is_schema_violation());
        assert!(matches!(&llm.calls()[0], LlmCall::Structured { schema, .. } if schema == "t"));
    }
}
