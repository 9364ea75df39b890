//! Planner state: the learning goal gathered from the user, one field at a time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Written into optional planner fields when the user asks to proceed without them.
pub const NOT_PROVIDED: &str = "N/A";

/// Proficiency level of the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of the canonical names only. Synonyms are the extraction step's job.
impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!(
                "unknown level: {} (use beginner, intermediate, or advanced)",
                other
            )),
        }
    }
}

/// Fields extracted from one user message. `None` means "not mentioned".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerDelta {
    pub subject: Option<String>,
    pub level: Option<DifficultyLevel>,
    pub project_type: Option<String>,
    pub environment: Option<String>,
    pub instructions: Option<String>,
}

impl PlannerDelta {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.level.is_none()
            && self.project_type.is_none()
            && self.environment.is_none()
            && self.instructions.is_none()
    }
}

/// The learning goal: what, for whom, which project, which tools, extra wishes.
///
/// Fill-only: [`PlannerState::apply`] writes a field only while it is blank, so a
/// value once set survives every later extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerState {
    pub subject: Option<String>,
    pub level: Option<DifficultyLevel>,
    pub project_type: Option<String>,
    pub environment: Option<String>,
    pub instructions: Option<String>,
}

impl PlannerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subject and level are known; enough to build a learning path.
    pub fn is_valid(&self) -> bool {
        self.subject.is_some() && self.level.is_some()
    }

    /// All five fields are present (possibly as [`NOT_PROVIDED`]).
    pub fn is_fulfilled(&self) -> bool {
        self.is_valid()
            && self.project_type.is_some()
            && self.environment.is_some()
            && self.instructions.is_some()
    }

    /// Copies the delta's fields into blank slots. Returns the names of the fields filled.
    pub fn apply(&mut self, delta: PlannerDelta) -> Vec<&'static str> {
        let mut filled = Vec::new();
        if fill(&mut self.subject, delta.subject) {
            filled.push("subject");
        }
        if self.level.is_none() && delta.level.is_some() {
            self.level = delta.level;
            filled.push("level");
        }
        if fill(&mut self.project_type, delta.project_type) {
            filled.push("project_type");
        }
        if fill(&mut self.environment, delta.environment) {
            filled.push("environment");
        }
        if fill(&mut self.instructions, delta.instructions) {
            filled.push("instructions");
        }
        filled
    }

    /// Marks every blank optional field as [`NOT_PROVIDED`]. No-op unless `is_valid()`.
    ///
    /// Subject and level are never auto-filled.
    pub fn fill_not_provided(&mut self) -> bool {
        if !self.is_valid() {
            return false;
        }
        let mut changed = false;
        for slot in [
            &mut self.project_type,
            &mut self.environment,
            &mut self.instructions,
        ] {
            changed |= fill(slot, Some(NOT_PROVIDED.to_string()));
        }
        changed
    }

    /// Names of the fields still blank, in schema order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.subject.is_none() {
            missing.push("subject");
        }
        if self.level.is_none() {
            missing.push("level");
        }
        if self.project_type.is_none() {
            missing.push("project_type");
        }
        if self.environment.is_none() {
            missing.push("environment");
        }
        if self.instructions.is_none() {
            missing.push("instructions");
        }
        missing
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) -> bool {
    match (slot.as_ref(), value) {
        (None, Some(v)) if !v.trim().is_empty() => {
            *slot = Some(v.trim().to_string());
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_beginner() -> PlannerState {
        PlannerState {
            subject: Some("Python".into()),
            level: Some(DifficultyLevel::Beginner),
            ..Default::default()
        }
    }

    #[test]
    fn level_from_str_accepts_canonical_names_only() {
        assert_eq!("Beginner".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Beginner));
        assert_eq!(" advanced ".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Advanced));
        assert!("ninja".parse::<DifficultyLevel>().is_err());
    }

    #[test]
    fn valid_needs_subject_and_level() {
        let mut p = PlannerState::new();
        assert!(!p.is_valid());
        p.subject = Some("Rust".into());
        assert!(!p.is_valid());
        p.level = Some(DifficultyLevel::Advanced);
        assert!(p.is_valid());
        assert!(!p.is_fulfilled());
    }

    /// **Scenario**: a later delta that omits or changes a field never clears or overwrites it.
    #[test]
    fn apply_only_fills_blanks() {
        let mut p = python_beginner();
        let filled = p.apply(PlannerDelta {
            subject: Some("Go".into()),
            level: Some(DifficultyLevel::Advanced),
            project_type: Some("web api".into()),
            ..Default::default()
        });
        assert_eq!(filled, vec!["project_type"]);
        assert_eq!(p.subject.as_deref(), Some("Python"));
        assert_eq!(p.level, Some(DifficultyLevel::Beginner));

        let filled = p.apply(PlannerDelta::default());
        assert!(filled.is_empty());
        assert_eq!(p.project_type.as_deref(), Some("web api"));
    }

    #[test]
    fn apply_ignores_blank_strings() {
        let mut p = PlannerState::new();
        p.apply(PlannerDelta {
            subject: Some("   ".into()),
            ..Default::default()
        });
        assert!(p.subject.is_none());
    }

    #[test]
    fn fill_not_provided_requires_valid_and_spares_set_fields() {
        let mut p = PlannerState::new();
        assert!(!p.fill_not_provided());
        assert!(p.missing_fields().len() == 5);

        let mut p = python_beginner();
        p.environment = Some("VS Code".into());
        assert!(p.fill_not_provided());
        assert!(p.is_fulfilled());
        assert_eq!(p.project_type.as_deref(), Some(NOT_PROVIDED));
        assert_eq!(p.environment.as_deref(), Some("VS Code"));
        assert_eq!(p.instructions.as_deref(), Some(NOT_PROVIDED));
    }

    #[test]
    fn fulfilled_implies_valid_for_every_field_combination() {
        for mask in 0u8..32 {
            let p = PlannerState {
                subject: (mask & 1 != 0).then(|| "s".to_string()),
                level: (mask & 2 != 0).then_some(DifficultyLevel::Intermediate),
                project_type: (mask & 4 != 0).then(|| "p".to_string()),
                environment: (mask & 8 != 0).then(|| "e".to_string()),
                instructions: (mask & 16 != 0).then(|| "i".to_string()),
            };
            assert!(!p.is_fulfilled() || p.is_valid(), "mask {}", mask);
            assert_eq!(p.is_fulfilled(), mask == 31);
        }
    }
}
