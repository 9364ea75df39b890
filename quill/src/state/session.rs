//! Shared record threaded through every node of a turn and checkpointed between turns.

use serde::{Deserialize, Serialize};

use super::{ExpertState, PlannerState, WriterState};
use crate::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub planner: Option<PlannerState>,
    #[serde(default)]
    pub expert: Option<ExpertState>,
    #[serde(default)]
    pub writer: Option<WriterState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::User(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn last_assistant_message(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Drops the agent sub-states; messages are kept.
    pub fn reset_agents(&mut self) {
        self.planner = None;
        self.expert = None;
        self.writer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DifficultyLevel;

    /// **Scenario**: a checkpoint written before any agent ran deserializes with absent sub-states.
    #[test]
    fn deserialize_minimal_session() {
        let s: SessionState =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(s.last_user_message(), Some("hi"));
        assert!(s.planner.is_none() && s.expert.is_none() && s.writer.is_none());
    }

    #[test]
    fn reset_agents_keeps_messages() {
        let mut s = SessionState::new();
        s.push_user("q");
        s.push_assistant("a");
        s.planner = Some(PlannerState {
            subject: Some("Rust".into()),
            level: Some(DifficultyLevel::Beginner),
            ..Default::default()
        });
        s.writer = Some(WriterState::default());
        s.reset_agents();
        assert_eq!(s.messages.len(), 2);
        assert_eq!(s.last_assistant_message(), Some("a"));
        assert!(s.planner.is_none() && s.writer.is_none());
    }
}
