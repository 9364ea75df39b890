//! Runtime settings resolved from the environment after [`crate::load_and_apply`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_RETRIES: usize = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("no data directory for the checkpoint database; set QUILL_CHECKPOINT_DB")]
    NoDataDir,
}

/// Model and storage settings used by the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `OPENAI_API_KEY`. When unset the client falls back to its own env lookup.
    pub api_key: Option<String>,
    /// `OPENAI_BASE_URL`, for OpenAI-compatible servers.
    pub base_url: Option<String>,
    /// `QUILL_MODEL`.
    pub model: String,
    /// `QUILL_TEMPERATURE`.
    pub temperature: f32,
    /// `QUILL_LLM_TIMEOUT_SECS`, per model call.
    pub llm_timeout: Duration,
    /// `QUILL_LLM_MAX_RETRIES`, for transient model failures.
    pub llm_max_retries: usize,
    /// `QUILL_CHECKPOINT_DB`.
    pub checkpoint_db: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let checkpoint_db = match get("QUILL_CHECKPOINT_DB") {
            Some(p) => PathBuf::from(p),
            None => default_checkpoint_db(get("XDG_DATA_HOME"))?,
        };
        let temperature: f32 = parse_or("QUILL_TEMPERATURE", get("QUILL_TEMPERATURE"), 0.0)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(SettingsError::Invalid {
                key: "QUILL_TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be between 0 and 2".into(),
            });
        }
        let timeout_secs = parse_or(
            "QUILL_LLM_TIMEOUT_SECS",
            get("QUILL_LLM_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL"),
            model: get("QUILL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            llm_timeout: Duration::from_secs(timeout_secs),
            llm_max_retries: parse_or(
                "QUILL_LLM_MAX_RETRIES",
                get("QUILL_LLM_MAX_RETRIES"),
                DEFAULT_MAX_RETRIES,
            )?,
            checkpoint_db,
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| SettingsError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn default_checkpoint_db(xdg_data_home: Option<String>) -> Result<PathBuf, SettingsError> {
    let base = xdg_data_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(dirs::data_dir)
        .ok_or(SettingsError::NoDataDir)?;
    Ok(base.join("quill").join("sessions.db"))
}
