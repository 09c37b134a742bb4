//! Tenant runtime configuration.
//!
//! # Responsibility
//! - Describe where one tenant database lives and how core logs.
//! - Load that description from a JSON file with defaults for every field.
//!
//! # Invariants
//! - Missing fields fall back to [`CoreConfig::default`].
//! - Unknown fields are rejected so typos surface at startup.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE_NAME: &str = "schoolerp_tenant.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Tenant database file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl CoreConfig {
    /// Loads a config file. Relative `db_path` values stay relative to the
    /// caller's working directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_DB_FILE_NAME};
    use std::path::PathBuf;

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let config = CoreConfig::from_json_str(r#"{"db_path": "/srv/demo.sqlite3"}"#)
            .expect("partial config should parse");
        assert_eq!(config.db_path, PathBuf::from("/srv/demo.sqlite3"));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(CoreConfig::from_json_str(r#"{"db_host": "10.0.0.1"}"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = CoreConfig::load(dir.path().join("missing.json"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tenant.json");
        std::fs::write(&path, r#"{"log_level": "warn"}"#).expect("write config");
        let config = CoreConfig::load(&path).expect("config should load");
        assert_eq!(config.log_level, "warn");
    }
}
