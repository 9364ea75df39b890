//! Expert state: the learning path and per-step progress.
//!
//! Step numbers are validated on every write. A non-empty path always holds the
//! numbers `1..=N` exactly once, stored in order, so step `n` sits at index `n - 1`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::planner::{DifficultyLevel, PlannerState};

/// Contract violation on the learning path. Never repaired at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("step numbers start at 1")]
    StepNumberZero,
    #[error("duplicate step number {0}")]
    DuplicateStepNumber(u32),
    #[error("step numbers must be contiguous from 1")]
    NonContiguousStepNumbers,
    #[error("no step numbered {0}")]
    UnknownStep(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// One step of a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertStep {
    pub step_number: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub prerequisites: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub estimated_time: Option<u32>,
    #[serde(default)]
    pub status: StepStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExpertStep {
    /// A pending step with only number and title set.
    pub fn new(step_number: u32, title: impl Into<String>) -> Self {
        Self {
            step_number,
            title: title.into(),
            description: None,
            content: None,
            prerequisites: None,
            estimated_time: None,
            status: StepStatus::Pending,
            completed_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_estimated_time(mut self, minutes: u32) -> Self {
        self.estimated_time = Some(minutes);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    /// Sets the status; completion stamps `completed_at`, anything else clears it.
    pub fn set_status(&mut self, status: StepStatus) {
        self.status = status;
        self.completed_at = match status {
            StepStatus::Completed => Some(self.completed_at.unwrap_or_else(Utc::now)),
            _ => None,
        };
    }
}

/// Checks that the numbers are exactly `1..=N`.
pub fn validate_step_numbers(steps: &[ExpertStep]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(steps.len());
    for step in steps {
        if step.step_number == 0 {
            return Err(ValidationError::StepNumberZero);
        }
        if !seen.insert(step.step_number) {
            return Err(ValidationError::DuplicateStepNumber(step.step_number));
        }
    }
    let max = seen.iter().copied().max().unwrap_or(0);
    if max as usize != steps.len() {
        return Err(ValidationError::NonContiguousStepNumbers);
    }
    Ok(())
}

/// The expert's view of the session: goal (copied from the planner) plus the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExpertStateRepr")]
pub struct ExpertState {
    pub subject: String,
    pub difficulty_level: DifficultyLevel,
    learning_path: Vec<ExpertStep>,
    pub project_type: Option<String>,
    pub environment: Option<String>,
    pub instructions: Option<String>,
    pub prerequisites: Option<Vec<String>>,
    pub objectives: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// Unvalidated wire form; every deserialized `ExpertState` goes through `TryFrom`.
#[derive(Deserialize)]
struct ExpertStateRepr {
    subject: String,
    difficulty_level: DifficultyLevel,
    #[serde(default)]
    learning_path: Vec<ExpertStep>,
    #[serde(default)]
    project_type: Option<String>,
    #[serde(default)]
    environment: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    prerequisites: Option<Vec<String>>,
    #[serde(default)]
    objectives: Option<Vec<String>>,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
}

impl TryFrom<ExpertStateRepr> for ExpertState {
    type Error = ValidationError;

    fn try_from(repr: ExpertStateRepr) -> Result<Self, Self::Error> {
        let mut state = ExpertState {
            subject: repr.subject,
            difficulty_level: repr.difficulty_level,
            learning_path: Vec::new(),
            project_type: repr.project_type,
            environment: repr.environment,
            instructions: repr.instructions,
            prerequisites: repr.prerequisites,
            objectives: repr.objectives,
            created_at: repr.created_at,
            last_updated_at: repr.last_updated_at,
        };
        let stamp = state.last_updated_at;
        state.set_learning_path(repr.learning_path)?;
        state.last_updated_at = stamp;
        Ok(state)
    }
}

impl ExpertState {
    /// Empty path for the given goal.
    pub fn new(subject: impl Into<String>, difficulty_level: DifficultyLevel) -> Self {
        let now = Utc::now();
        Self {
            subject: subject.into(),
            difficulty_level,
            learning_path: Vec::new(),
            project_type: None,
            environment: None,
            instructions: None,
            prerequisites: None,
            objectives: None,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Copies the goal out of a planner. `None` unless the planner is valid.
    pub fn from_planner(planner: &PlannerState) -> Option<Self> {
        let subject = planner.subject.as_ref()?;
        let level = planner.level?;
        let mut state = Self::new(subject.clone(), level);
        state.project_type = planner.project_type.clone();
        state.environment = planner.environment.clone();
        state.instructions = planner.instructions.clone();
        Some(state)
    }

    /// Builds a state with a path in one go; fails like [`ExpertState::set_learning_path`].
    pub fn with_learning_path(
        subject: impl Into<String>,
        difficulty_level: DifficultyLevel,
        steps: Vec<ExpertStep>,
    ) -> Result<Self, ValidationError> {
        let mut state = Self::new(subject, difficulty_level);
        state.set_learning_path(steps)?;
        Ok(state)
    }

    pub fn learning_path(&self) -> &[ExpertStep] {
        &self.learning_path
    }

    /// Replaces the whole path. Steps may arrive in any order; they are stored sorted.
    pub fn set_learning_path(&mut self, mut steps: Vec<ExpertStep>) -> Result<(), ValidationError> {
        validate_step_numbers(&steps)?;
        steps.sort_by_key(|s| s.step_number);
        self.learning_path = steps;
        self.touch();
        Ok(())
    }

    pub fn step(&self, step_number: u32) -> Option<&ExpertStep> {
        let idx = (step_number as usize).checked_sub(1)?;
        self.learning_path.get(idx)
    }

    /// Writes `step` at `step_number - 1`; the number must already exist.
    pub fn replace_step(&mut self, step: ExpertStep) -> Result<(), ValidationError> {
        let idx = self.index_of(step.step_number)?;
        self.learning_path[idx] = step;
        self.touch();
        Ok(())
    }

    pub fn update_step_status(
        &mut self,
        step_number: u32,
        status: StepStatus,
    ) -> Result<(), ValidationError> {
        let idx = self.index_of(step_number)?;
        self.learning_path[idx].set_status(status);
        self.touch();
        Ok(())
    }

    /// Puts every step back to pending. Generated content is kept.
    pub fn reset_learning_path(&mut self) {
        for step in &mut self.learning_path {
            step.set_status(StepStatus::Pending);
        }
        self.touch();
    }

    /// First step still to do (pending or in progress).
    pub fn current_step(&self) -> Option<&ExpertStep> {
        self.learning_path
            .iter()
            .find(|s| matches!(s.status, StepStatus::Pending | StepStatus::InProgress))
    }

    /// First pending step; in-progress steps are skipped.
    pub fn next_available_step(&self) -> Option<&ExpertStep> {
        self.learning_path
            .iter()
            .find(|s| s.status == StepStatus::Pending)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = &ExpertStep> {
        self.learning_path.iter().filter(|s| s.is_completed())
    }

    /// Percentage of completed steps; 0.0 for an empty path.
    pub fn progress(&self) -> f64 {
        if self.learning_path.is_empty() {
            return 0.0;
        }
        let done = self.completed_steps().count();
        done as f64 / self.learning_path.len() as f64 * 100.0
    }

    /// Sum of the estimates that are set, in minutes.
    pub fn total_estimated_time(&self) -> Option<u32> {
        self.learning_path
            .iter()
            .filter_map(|s| s.estimated_time)
            .fold(None, |acc, t| Some(acc.unwrap_or(0u32).saturating_add(t)))
    }

    /// Non-empty and every step completed.
    pub fn is_completed(&self) -> bool {
        !self.learning_path.is_empty() && self.learning_path.iter().all(|s| s.is_completed())
    }

    fn index_of(&self, step_number: u32) -> Result<usize, ValidationError> {
        match (step_number as usize).checked_sub(1) {
            Some(idx) if idx < self.learning_path.len() => Ok(idx),
            _ => Err(ValidationError::UnknownStep(step_number)),
        }
    }

    fn touch(&mut self) {
        self.last_updated_at = Utc::now();
    }
}
