//! OpenAI Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Works against any OpenAI-compatible endpoint. API key and base URL come from
//! `OPENAI_API_KEY` / `OPENAI_BASE_URL` by default, or from an explicit
//! [`OpenAIConfig`]. Structured calls send the schema as a `json_schema`
//! response format and still run the reply through [`OutputSchema::coerce`].
//!
//! Every request runs under a timeout; expiry is `LlmError::Timeout`. Any other
//! API or transport failure is `LlmError::Unavailable`.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::llm::{
    parse_json_object, structured_instruction, LlmClient, LlmError, LlmResponse, LlmUsage,
    OutputSchema,
};
use crate::message::Message;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI Chat Completions client.
///
/// **Interaction**: Built once by the CLI from `Settings`, wrapped in `RetryingLlm`,
/// then shared as `Arc<dyn LlmClient>` by the three agent services.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::default(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Config from an optional key and base URL; `None` keeps the library defaults.
    pub fn config(api_key: Option<&str>, base_url: Option<&str>) -> OpenAIConfig {
        let mut config = OpenAIConfig::new();
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        if let Some(base) = base_url {
            config = config.with_api_base(base.trim_end_matches('/'));
        }
        config
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_to_request(messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m {
                Message::System(s) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessage::from(s.as_str()),
                ),
                Message::User(s) => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessage::from(s.as_str()),
                ),
                Message::Assistant(s) => ChatCompletionRequestMessage::Assistant(s.as_str().into()),
            })
            .collect()
    }

    fn build_request(
        &self,
        messages: &[Message],
        response_format: Option<ResponseFormat>,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages));
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        if let Some(format) = response_format {
            args.response_format(format);
        }
        args.build()
            .map_err(|e| LlmError::Unavailable(format!("OpenAI request build failed: {}", e)))
    }

    async fn send(&self, request: CreateChatCompletionRequest) -> Result<LlmResponse, LlmError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        debug!(
            trace_id = %trace_id,
            model = %self.model,
            message_count = request.messages.len(),
            temperature = ?self.temperature,
            structured = request.response_format.is_some(),
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, request = %js, "OpenAI request body");
        }

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                LlmError::Timeout(format!("no response within {}s", self.timeout.as_secs()))
            })?
            .map_err(|e| classify_api_error(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, response = %js, "OpenAI response body");
        }

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Unavailable("OpenAI returned no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        debug!(trace_id = %trace_id, content_len = content.len(), ?usage, "OpenAI chat done");
        Ok(LlmResponse { content, usage })
    }
}

/// `json_schema` response format for `schema`. Not strict, so optional fields
/// may be left out.
fn schema_response_format(schema: &OutputSchema) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: None,
            name: schema.name.clone(),
            schema: Some(schema.to_json_schema()),
            strict: Some(false),
        },
    }
}

/// Maps an API error string; some proxies surface timeouts as plain errors.
fn classify_api_error(message: String) -> LlmError {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        LlmError::Timeout(message)
    } else {
        LlmError::Unavailable(message)
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let request = self.build_request(messages, None)?;
        self.send(request).await
    }

    async fn invoke_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<Map<String, Value>, LlmError> {
        let messages = [
            Message::system(structured_instruction(schema)),
            Message::user(prompt),
        ];
        let request = self.build_request(&messages, Some(schema_response_format(schema)))?;
        let response = self.send(request).await?;
        schema.coerce(parse_json_object(&response.content)?)
    }
}
