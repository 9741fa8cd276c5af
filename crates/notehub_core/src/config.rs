//! Runtime configuration for embedding callers and the CLI.
//!
//! Values resolve in this order, later sources winning:
//! built-in defaults, an optional JSON file, then `NOTEHUB_*` environment
//! variables. Blank environment values are ignored.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_DB_PATH: &str = "NOTEHUB_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTEHUB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEHUB_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "notehub.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "notehub-logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Must be absolute when passed to logging init.
    pub log_dir: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp = std::env::temp_dir();
        Self {
            db_path: temp.join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: temp.join(DEFAULT_LOG_DIR_NAME),
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Reads a JSON file (missing keys keep their defaults), then applies the
    /// process environment on top.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = non_blank(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = non_blank(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_live_in_temp_dir() {
        let config = CoreConfig::default();
        assert_eq!(config.db_path, std::env::temp_dir().join("notehub.sqlite3"));
        assert!(config.log_dir.is_absolute());
    }

    #[test]
    fn env_overrides_replace_defaults_and_blank_values_are_ignored() {
        let config = CoreConfig::default().with_overrides(lookup_from(&[
            (ENV_DB_PATH, "  /srv/notes.db "),
            (ENV_LOG_LEVEL, "   "),
            (ENV_LOG_DIR, "/var/log/notehub"),
        ]));

        assert_eq!(config.db_path, PathBuf::from("/srv/notes.db"));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/notehub"));
    }

    #[test]
    fn json_keeps_defaults_for_missing_keys() {
        let config = CoreConfig::from_json_str(r#"{ "log_level": "warn" }"#).expect("valid json");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.db_path, CoreConfig::default().db_path);
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{ not json").expect("write temp file");

        let err = CoreConfig::from_json_file(file.path()).expect_err("parse should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = CoreConfig::from_json_file(dir.path().join("absent.json"))
            .expect_err("read should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
