//! Configuration for Quill.
//!
//! [`load_and_apply`] fills the process environment from a project `.env` and
//! `$XDG_CONFIG_HOME/<app>/config.toml` (`[env]` table). Priority: **existing env > .env >
//! config.toml**. [`Settings::from_env`] then reads the values the CLI needs.

mod config_file;
mod dotenv;
mod settings;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use config_file::config_path;
pub use settings::{
    Settings, SettingsError, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("config path: {0}")]
    ConfigPath(String),
    #[error("read config.toml: {0}")]
    ConfigRead(std::io::Error),
    #[error("parse config.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// `.env` values over `config.toml` values.
fn merge(
    config: HashMap<String, String>,
    dotenv: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = config;
    merged.extend(dotenv);
    merged
}

/// Sets each key that is not already in the environment. Returns the keys set.
fn apply_missing(values: HashMap<String, String>) -> Vec<String> {
    let mut applied = Vec::new();
    for (key, value) in values {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        applied.push(key);
    }
    applied
}

/// Loads `config.toml` for `app_name` and `.env` from `dotenv_dir` (default: current
/// directory) and applies keys missing from the environment.
pub fn load_and_apply(app_name: &str, dotenv_dir: Option<&Path>) -> Result<(), LoadError> {
    let config = config_file::load_env_map(&config_path(app_name)?)?;
    let dotenv = dotenv::load_env_map(dotenv_dir).map_err(LoadError::DotenvRead)?;
    apply_missing(merge(config, dotenv));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn dotenv_overrides_config_file() {
        let merged = merge(
            map(&[("A", "from_toml"), ("B", "from_toml")]),
            map(&[("A", "from_dotenv")]),
        );
        assert_eq!(merged["A"], "from_dotenv");
        assert_eq!(merged["B"], "from_toml");
    }

    #[test]
    fn existing_env_wins() {
        env::set_var("QUILL_CONFIG_TEST_EXISTING", "from_env");
        let applied = apply_missing(map(&[
            ("QUILL_CONFIG_TEST_EXISTING", "from_file"),
            ("QUILL_CONFIG_TEST_NEW", "from_file"),
        ]));
        assert_eq!(env::var("QUILL_CONFIG_TEST_EXISTING").as_deref(), Ok("from_env"));
        assert_eq!(env::var("QUILL_CONFIG_TEST_NEW").as_deref(), Ok("from_file"));
        assert_eq!(applied, vec!["QUILL_CONFIG_TEST_NEW".to_string()]);
        env::remove_var("QUILL_CONFIG_TEST_EXISTING");
        env::remove_var("QUILL_CONFIG_TEST_NEW");
    }

    #[test]
    fn load_and_apply_reads_dotenv_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "QUILL_CONFIG_TEST_DOTENV=yes\n").unwrap();
        load_and_apply("quill-config-test-nonexistent-app", Some(dir.path())).unwrap();
        assert_eq!(env::var("QUILL_CONFIG_TEST_DOTENV").as_deref(), Ok("yes"));
        env::remove_var("QUILL_CONFIG_TEST_DOTENV");
    }

    #[test]
    fn load_and_apply_without_files_is_ok() {
        let empty = tempfile::tempdir().unwrap();
        assert!(load_and_apply("quill-config-test-nonexistent-app", Some(empty.path())).is_ok());
    }
}
