//! Writer state: the finished tutorial.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::planner::DifficultyLevel;

/// Final artifact. Written once, after every step of the path is complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriterState {
    pub subject: Option<String>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub title: Option<String>,
    pub tutorial: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl WriterState {
    pub fn has_tutorial(&self) -> bool {
        self.tutorial.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Title or subject, whichever is set first.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.subject.as_deref())
    }
}
