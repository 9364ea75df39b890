//! Markdown export of a finished tutorial.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use quill::WriterState;

/// Lowercase ASCII words joined by `-`. Falls back to `tutorial`.
pub fn slugify(title: &str) -> String {
    let slug = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "tutorial".to_string()
    } else {
        slug
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Front matter plus the tutorial body.
pub fn tutorial_markdown(artifact: &WriterState, exported_at: DateTime<Utc>) -> String {
    let created_at = artifact.created_at.unwrap_or(exported_at);
    let mut out = String::from("---\n");
    if let Some(title) = artifact.display_title() {
        out.push_str(&format!("title: {}\n", quoted(title)));
    }
    if let Some(subject) = &artifact.subject {
        out.push_str(&format!("subject: {}\n", quoted(subject)));
    }
    if let Some(level) = artifact.difficulty_level {
        out.push_str(&format!("level: {}\n", level));
    }
    if let Some(keywords) = artifact.keywords.as_ref().filter(|k| !k.is_empty()) {
        let list: Vec<String> = keywords.iter().map(|k| quoted(k)).collect();
        out.push_str(&format!("keywords: [{}]\n", list.join(", ")));
    }
    out.push_str(&format!(
        "created_at: {}\n---\n\n",
        created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    if let Some(title) = artifact.display_title() {
        out.push_str(&format!("# {}\n\n", title));
    }
    out.push_str(artifact.tutorial.as_deref().unwrap_or_default().trim());
    out.push('\n');
    out
}

/// Writes `<dir>/<slug>.md`, adding `-2`, `-3`, ... when the name is taken.
pub fn export_tutorial(dir: &Path, artifact: &WriterState) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let stem = slugify(artifact.display_title().unwrap_or_default());
    let mut path = dir.join(format!("{}.md", stem));
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("{}-{}.md", stem, n));
        n += 1;
    }
    std::fs::write(&path, tutorial_markdown(artifact, Utc::now()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quill::DifficultyLevel;

    fn artifact() -> WriterState {
        WriterState {
            subject: Some("Rust".into()),
            difficulty_level: Some(DifficultyLevel::Intermediate),
            title: Some("Rust \"Ownership\" in Practice".into()),
            tutorial: Some("## Step 1\n\nBorrowing.\n".into()),
            keywords: Some(vec!["rust".into(), "ownership".into()]),
            created_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
        }
    }

    #[test]
    fn slugify_keeps_ascii_words() {
        assert_eq!(slugify("Rust \"Ownership\" in Practice!"), "rust-ownership-in-practice");
        assert_eq!(slugify("  ***  "), "tutorial");
    }

    #[test]
    fn markdown_has_front_matter_and_body() {
        let md = tutorial_markdown(&artifact(), Utc::now());
        assert!(md.starts_with("---\ntitle: \"Rust \\\"Ownership\\\" in Practice\"\n"));
        assert!(md.contains("subject: \"Rust\"\n"));
        assert!(md.contains("level: intermediate\n"));
        assert!(md.contains("keywords: [\"rust\", \"ownership\"]\n"));
        assert!(md.contains("created_at: 2026-03-01T12:00:00Z\n---\n\n# Rust"));
        assert!(md.ends_with("Borrowing.\n"));
    }

    /// **Scenario**: no keywords and no title; the subject becomes the heading.
    #[test]
    fn markdown_without_optional_fields() {
        let mut a = artifact();
        a.title = None;
        a.keywords = None;
        let md = tutorial_markdown(&a, Utc::now());
        assert!(!md.contains("keywords:"));
        assert!(md.contains("title: \"Rust\"\n"));
        assert!(md.contains("# Rust\n\n## Step 1"));
    }

    #[test]
    fn export_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let first = export_tutorial(dir.path(), &artifact()).unwrap();
        let second = export_tutorial(dir.path(), &artifact()).unwrap();
        assert!(first.ends_with("rust-ownership-in-practice.md"));
        assert!(second.ends_with("rust-ownership-in-practice-2.md"));
        assert!(std::fs::read_to_string(second).unwrap().contains("Borrowing."));
    }
}
