//! `[env]` table of `<config dir>/<app>/config.toml`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LoadError;

/// `$XDG_CONFIG_HOME` when set to an absolute path, else the platform config dir.
pub(crate) fn config_home() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(dirs::config_dir)
}

pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let home = config_home()
        .ok_or_else(|| LoadError::ConfigPath("no config directory for this platform".into()))?;
    Ok(home.join(app_name).join("config.toml"))
}

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
}

/// Reads the `[env]` table. A missing file or section is an empty map.
pub fn load_env_map(path: &Path) -> Result<HashMap<String, String>, LoadError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(LoadError::ConfigRead)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file.env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn reads_env_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "[env]\nQUILL_MODEL = \"gpt-4o\"\nQUILL_LLM_MAX_RETRIES = \"4\"\n",
        );
        let map = load_env_map(&path).unwrap();
        assert_eq!(map["QUILL_MODEL"], "gpt-4o");
        assert_eq!(map["QUILL_LLM_MAX_RETRIES"], "4");
    }

    #[test]
    fn missing_file_or_section_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(&dir.path().join("nope.toml")).unwrap().is_empty());
        let path = write(dir.path(), "[other]\nkey = \"ignored\"\n");
        assert!(load_env_map(&path).unwrap().is_empty());
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "not valid [[[\n");
        assert!(matches!(load_env_map(&path), Err(LoadError::ConfigParse(_))));
    }

    #[test]
    fn config_path_ends_with_app_file() {
        let path = config_path("quill-test-app").unwrap();
        assert!(path.ends_with("quill-test-app/config.toml"));
    }
}
