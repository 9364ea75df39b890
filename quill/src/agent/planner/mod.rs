//! Planner agent: pulls the learning goal out of the conversation.
//!
//! Extraction is a structured call over the latest user message. The result is
//! cleaned up here (blank strings dropped, level synonyms mapped, the "N/A"
//! sentinel kept away from subject and level) before it is merged into the
//! state with fill-only semantics.

pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::agent::{recoverable_or_model, PlannerAgent};
use crate::error::AgentError;
use crate::llm::{LlmClient, OutputSchema, SchemaField};
use crate::message::Message;
use crate::state::{DifficultyLevel, PlannerDelta, PlannerState, NOT_PROVIDED};

/// Replies that mean "stop asking, go ahead" when they make up the whole
/// message. Apostrophes are removed before matching.
const PROCEED_PHRASES: &[&str] = &[
    "ok",
    "okay",
    "continue",
    "proceed",
    "go ahead",
    "go on",
    "lets go",
    "lets start",
    "start",
    "skip",
    "skip it",
    "skip the rest",
    "thats all",
    "that is all",
    "nothing else",
    "no preference",
    "prosseguir",
    "continuar",
    "pode seguir",
    "pode continuar",
    "pode ir",
    "só isso",
    "so isso",
];

/// Words allowed around a proceed phrase ("ok, please continue").
const FILLER_WORDS: &[&str] = &["please", "just", "sure", "yes", "sim", "then", "now", "por", "favor"];

/// Schema for the extraction call.
pub fn extraction_schema() -> OutputSchema {
    OutputSchema::new("planner_extraction")
        .field(SchemaField::string("subject", "Topic the user wants to learn"))
        .field(SchemaField::string("level", "User's experience level, as stated"))
        .field(SchemaField::string("project_type", "What the user wants to build"))
        .field(SchemaField::string("environment", "Tools, editor or platform"))
        .field(SchemaField::string("instructions", "Any other wishes for the tutorial"))
        .field(
            SchemaField::string(
                "intent",
                "\"proceed\" when the message only asks to skip the remaining questions, else \"answer\"",
            )
            .one_of(&["answer", "proceed"]),
        )
}

/// Maps a free-form level to a [`DifficultyLevel`]. English and Portuguese
/// synonyms, common misspellings and slang are accepted; anything else is `None`.
pub fn normalize_level(raw: &str) -> Option<DifficultyLevel> {
    let lowered = raw.trim().to_lowercase();
    if let Ok(level) = lowered.parse::<DifficultyLevel>() {
        return Some(level);
    }
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .find_map(level_word)
}

fn level_word(word: &str) -> Option<DifficultyLevel> {
    match word {
        "beginner" | "beginners" | "begginer" | "beginer" | "basic" | "basics" | "novice"
        | "newbie" | "noob" | "iniciante" | "básico" | "basico" | "starter" => {
            Some(DifficultyLevel::Beginner)
        }
        "intermediate" | "intermidiate" | "intermediat" | "intermediario" | "intermediário"
        | "mid" | "medium" | "médio" | "medio" => Some(DifficultyLevel::Intermediate),
        "advanced" | "advanded" | "advaned" | "advance" | "avancado" | "avançado" | "expert"
        | "ninja" | "pro" | "senior" => Some(DifficultyLevel::Advanced),
        _ => None,
    }
}

/// True when the whole message asks to move on without answering more
/// questions. A proceed word inside an answer ("Next.js", "I don't want to
/// skip") does not count.
pub fn wants_to_proceed(message: &str) -> bool {
    let normalized = message.trim().to_lowercase().replace(['\'', '\u{2019}'], "");
    let words: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let mut rest = words.as_slice();
    let mut matched = false;
    while !rest.is_empty() {
        if let Some(len) = longest_phrase_at(rest) {
            matched = true;
            rest = &rest[len..];
        } else if FILLER_WORDS.contains(&rest[0]) {
            rest = &rest[1..];
        } else {
            return false;
        }
    }
    matched
}

fn longest_phrase_at(words: &[&str]) -> Option<usize> {
    PROCEED_PHRASES
        .iter()
        .map(|p| p.split(' ').collect::<Vec<_>>())
        .filter(|p| words.starts_with(p))
        .map(|p| p.len())
        .max()
}

/// The extraction classified the message as a request to skip ahead.
fn extraction_says_proceed(obj: &Map<String, Value>) -> bool {
    obj.get("intent").and_then(Value::as_str) == Some("proceed")
}

fn is_sentinel(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case(NOT_PROVIDED)
        || v.eq_ignore_ascii_case("n.a.")
        || v.eq_ignore_ascii_case("none")
        || v.eq_ignore_ascii_case("null")
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn optional_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    text_field(obj, key).map(|v| {
        if is_sentinel(&v) {
            NOT_PROVIDED.to_string()
        } else {
            v
        }
    })
}

/// Turns a coerced extraction object into a delta.
pub fn delta_from_extraction(obj: &Map<String, Value>) -> PlannerDelta {
    PlannerDelta {
        subject: text_field(obj, "subject").filter(|s| !is_sentinel(s)),
        level: text_field(obj, "level").and_then(|l| normalize_level(&l)),
        project_type: optional_field(obj, "project_type"),
        environment: optional_field(obj, "environment"),
        instructions: optional_field(obj, "instructions"),
    }
}

/// Model-backed [`PlannerAgent`].
pub struct PlannerService {
    llm: Arc<dyn LlmClient>,
}

impl PlannerService {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PlannerAgent for PlannerService {
    async fn extract_info(
        &self,
        user_message: &str,
        state: &PlannerState,
    ) -> Result<PlannerState, AgentError> {
        let prompt = prompt::extraction_prompt(user_message, state);
        let obj = self
            .llm
            .invoke_structured(&prompt, &extraction_schema())
            .await
            .map_err(|e| recoverable_or_model(e, AgentError::Extraction))?;

        let delta = delta_from_extraction(&obj);
        let mut next = state.clone();
        let filled = next.apply(delta);
        let proceed = (wants_to_proceed(user_message) || extraction_says_proceed(&obj))
            && next.fill_not_provided();
        debug!(?filled, proceed, valid = next.is_valid(), fulfilled = next.is_fulfilled(), "planner extraction");
        Ok(next)
    }

    fn create_system_message(&self, state: &PlannerState) -> String {
        prompt::conversation_prompt(state)
    }

    async fn generate_response(
        &self,
        system_message: &str,
        history: &[Message],
    ) -> Result<String, AgentError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_message));
        messages.extend(history.iter().filter(|m| !matches!(m, Message::System(_))).cloned());
        let response = self.llm.invoke(&messages).await?;
        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_level_accepts_synonyms_and_typos() {
        assert_eq!(normalize_level("Iniciante"), Some(DifficultyLevel::Beginner));
        assert_eq!(normalize_level("begginer"), Some(DifficultyLevel::Beginner));
        assert_eq!(normalize_level("intermediário"), Some(DifficultyLevel::Intermediate));
        assert_eq!(normalize_level("avançado"), Some(DifficultyLevel::Advanced));
        assert_eq!(normalize_level("ninja"), Some(DifficultyLevel::Advanced));
        assert_eq!(normalize_level("a complete newbie"), Some(DifficultyLevel::Beginner));
        assert_eq!(normalize_level("wizard"), None);
        assert_eq!(normalize_level(""), None);
    }

    #[test]
    fn wants_to_proceed_accepts_whole_message_phrases() {
        for msg in [
            "OK",
            "please continue",
            "Go ahead!",
            "ok, go ahead",
            "yes, proceed",
            "That's all.",
            "pode seguir, por favor",
            "só isso",
            "skip the rest",
        ] {
            assert!(wants_to_proceed(msg), "{}", msg);
        }
    }

    /// **Scenario**: proceed words inside an answer are not a request to skip.
    #[test]
    fn wants_to_proceed_ignores_words_inside_answers() {
        for msg in [
            "I want to learn Next.js, beginner",
            "yes, I want to add my environment",
            "I don't want to skip",
            "sim, uso o VS Code",
            "ok so I use neovim",
            "please",
            "",
            "tokio",
        ] {
            assert!(!wants_to_proceed(msg), "{}", msg);
        }
    }

    #[test]
    fn extraction_intent_is_restricted_to_known_values() {
        let schema = extraction_schema();
        let obj = schema.coerce(json!({"intent": "Proceed"})).unwrap();
        assert!(extraction_says_proceed(&obj));
        assert!(schema.coerce(json!({"intent": "maybe"})).unwrap_err().is_schema_violation());
        assert!(!extraction_says_proceed(&schema.coerce(json!({})).unwrap()));
    }

    /// **Scenario**: sentinel for subject/level is dropped; for optional fields it is canonical.
    #[test]
    fn delta_drops_sentinel_for_required_fields() {
        let obj = json!({
            "subject": "N/A",
            "level": "n/a",
            "project_type": "none",
            "environment": "  ",
            "instructions": "short chapters"
        });
        let delta = delta_from_extraction(obj.as_object().unwrap());
        assert_eq!(delta.subject, None);
        assert_eq!(delta.level, None);
        assert_eq!(delta.project_type.as_deref(), Some(NOT_PROVIDED));
        assert_eq!(delta.environment, None);
        assert_eq!(delta.instructions.as_deref(), Some("short chapters"));
    }

    #[test]
    fn conversation_prompt_lists_missing_fields() {
        let state = PlannerState {
            subject: Some("Rust".into()),
            ..Default::default()
        };
        let p = prompt::conversation_prompt(&state);
        assert!(p.contains("- subject: Rust"));
        assert!(p.contains("- level"));
        assert!(!p.contains("continue\" to skip"));
    }
}
