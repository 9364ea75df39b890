//! Planner prompts.

use crate::agent::fill_template;
use crate::state::{PlannerState, NOT_PROVIDED};

/// Instruction for the extraction call. `{known}` and `{message}` are filled in.
pub const EXTRACTION_PROMPT: &str = r#"You read one message from a person who wants a tutorial and pull out the details of their learning goal.

Fields:
- subject: the technology, language or topic they want to learn.
- level: how experienced they are. Report it as they said it; "beginner", "intermediate" or "advanced" if you can tell.
- project_type: what they want to build while learning (e.g. "REST API", "CLI tool", "website").
- environment: tools, editor, operating system or platform they will use.
- instructions: any other wishes about the tutorial (tone, length, focus).
- intent: "proceed" when the message only asks to continue, proceed or skip the remaining questions; "answer" otherwise.

Rules:
- Only report what the message actually says. Leave a field out (or null) when it is not mentioned.
- Never guess and never repeat a value that is already known.
- When intent is "proceed", report "N/A" for project_type, environment and instructions that are still unknown. Never use "N/A" for subject or level.

Already known:
{known}

Message:
{message}"#;

/// System prompt for the conversational reply. `{known}` and `{missing}` are filled in.
pub const CONVERSATION_PROMPT: &str = r#"You are the planning assistant of a tutorial writing team. Your job is to learn what the user wants to study before the expert designs a learning path.

What we know so far:
{known}

Still missing:
{missing}

Ask for the missing information in a short, friendly message. Ask about one or two things at a time, most important first (subject, then level, then the rest). {skip_hint}Do not write the tutorial yourself and do not make up answers for the user. Reply in the language the user writes in."#;

const SKIP_HINT: &str = "Subject and level are known, so tell the user they may say \"continue\" to skip the remaining questions. ";

fn describe(value: Option<&str>) -> Option<String> {
    match value {
        Some(v) if v == NOT_PROVIDED => Some("(not needed)".to_string()),
        Some(v) => Some(v.to_string()),
        None => None,
    }
}

/// Bullet list of the fields that are set.
pub fn known_fields(state: &PlannerState) -> String {
    let level = state.level.map(|l| l.to_string());
    let fields = [
        ("subject", describe(state.subject.as_deref())),
        ("level", level),
        ("project_type", describe(state.project_type.as_deref())),
        ("environment", describe(state.environment.as_deref())),
        ("instructions", describe(state.instructions.as_deref())),
    ];
    let lines: Vec<String> = fields
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| format!("- {}: {}", name, v)))
        .collect();
    if lines.is_empty() {
        "- nothing yet".to_string()
    } else {
        lines.join("\n")
    }
}

pub fn extraction_prompt(user_message: &str, state: &PlannerState) -> String {
    fill_template(
        EXTRACTION_PROMPT,
        &[("known", known_fields(state).as_str()), ("message", user_message)],
    )
}

pub fn conversation_prompt(state: &PlannerState) -> String {
    let missing = state.missing_fields();
    let missing = if missing.is_empty() {
        "- nothing".to_string()
    } else {
        missing
            .iter()
            .map(|f| format!("- {}", f))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let skip_hint = if state.is_valid() { SKIP_HINT } else { "" };
    fill_template(
        CONVERSATION_PROMPT,
        &[
            ("known", known_fields(state).as_str()),
            ("missing", missing.as_str()),
            ("skip_hint", skip_hint),
        ],
    )
}

/// Reply used when the model answers with nothing.
pub fn fallback_question(state: &PlannerState) -> String {
    match state.missing_fields().first().copied() {
        Some("subject") => "What would you like to learn?".to_string(),
        Some("level") => "How would you describe your level: beginner, intermediate or advanced?"
            .to_string(),
        Some("project_type") => {
            "What kind of project would you like to build? (say \"continue\" to skip)".to_string()
        }
        Some("environment") => {
            "Which tools or environment will you use? (say \"continue\" to skip)".to_string()
        }
        Some(_) => {
            "Anything else the tutorial should cover? (say \"continue\" to skip)".to_string()
        }
        None => "Great, I have everything I need.".to_string(),
    }
}
