//! Writer prompts.

use crate::agent::fill_template;
use crate::state::{ExpertState, NOT_PROVIDED};

pub const TUTORIAL_SYSTEM: &str = r#"You are a technical writer. You receive the chapters of a tutorial, written separately by an expert. Combine them into one coherent tutorial in Markdown.

Rules:
- Keep all technical substance: every explanation, command and code example must survive, verbatim where possible.
- Add a short introduction and a conclusion, and smooth transitions between chapters.
- Keep the chapter order.
- Do not add a title; it is written separately.
- Write for the stated level."#;

pub const TITLE_PROMPT: &str = r#"Write a title for the tutorial below. It should be specific, at most 80 characters, and in the tutorial's language. Reply with the title only, no quotes, no Markdown.

Subject: {subject} ({level})

Tutorial:
{tutorial}"#;

pub const KEYWORDS_PROMPT: &str = r#"List 3 to 8 search keywords for this tutorial: technologies, concepts and techniques it covers. Lowercase, no duplicates.

Title: {title}

Tutorial:
{tutorial}"#;

/// Tutorial excerpt cap for the title and keyword prompts, in characters.
const EXCERPT_CHARS: usize = 6000;

pub fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Goal header followed by every step's title, description and content, in order.
pub fn tutorial_request(expert: &ExpertState) -> String {
    let mut out = format!(
        "Subject: {}\nLevel: {}\n",
        expert.subject, expert.difficulty_level
    );
    for (label, value) in [
        ("Project", expert.project_type.as_deref()),
        ("Environment", expert.environment.as_deref()),
        ("Instructions", expert.instructions.as_deref()),
    ] {
        if let Some(v) = value.filter(|v| *v != NOT_PROVIDED) {
            out.push_str(&format!("{}: {}\n", label, v));
        }
    }
    for step in expert.learning_path() {
        out.push_str(&format!("\n## Step {}: {}\n", step.step_number, step.title));
        if let Some(d) = &step.description {
            out.push_str(&format!("{}\n", d));
        }
        if let Some(c) = &step.content {
            out.push_str(&format!("\n{}\n", c));
        }
    }
    out
}

pub fn title_prompt(tutorial: &str, expert: &ExpertState) -> String {
    fill_template(
        TITLE_PROMPT,
        &[
            ("subject", expert.subject.as_str()),
            ("level", expert.difficulty_level.as_str()),
            ("tutorial", excerpt(tutorial)),
        ],
    )
}

pub fn keywords_prompt(title: &str, tutorial: &str) -> String {
    fill_template(
        KEYWORDS_PROMPT,
        &[("title", title), ("tutorial", excerpt(tutorial))],
    )
}
