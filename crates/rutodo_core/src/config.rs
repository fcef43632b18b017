//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Resolve those values from `RUTODO_*` environment variables.
//!
//! # Invariants
//! - Blank variables behave as if unset.
//! - Resolution never touches the file system.

use crate::db::MigrationPolicy;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "RUTODO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "RUTODO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RUTODO_LOG_DIR";
pub const ENV_DESTRUCTIVE_MIGRATION: &str = "RUTODO_DESTRUCTIVE_MIGRATION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBool { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool { key, value } => write!(
                f,
                "`{key}` must be one of 1|true|yes|on|0|false|no|off, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// `None` keeps the database in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Recreate tables when an older schema is found.
    pub destructive_migration: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            destructive_migration: true,
        }
    }
}

impl CoreConfig {
    /// Builds config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = value(ENV_DESTRUCTIVE_MIGRATION) {
            config.destructive_migration = parse_bool(ENV_DESTRUCTIVE_MIGRATION, &raw)?;
        }
        Ok(config)
    }

    pub fn migration_policy(&self) -> MigrationPolicy {
        if self.destructive_migration {
            MigrationPolicy::Destructive
        } else {
            MigrationPolicy::Strict
        }
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ConfigError, ENV_DB_PATH, ENV_DESTRUCTIVE_MIGRATION, ENV_LOG_LEVEL};
    use crate::db::MigrationPolicy;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).expect("defaults should load");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.migration_policy(), MigrationPolicy::Destructive);
    }

    #[test]
    fn values_are_trimmed_and_blank_values_ignored() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "  /tmp/rutodo.sqlite3 "),
            (ENV_LOG_LEVEL, "   "),
            (ENV_DESTRUCTIVE_MIGRATION, "Off"),
        ]))
        .expect("config should load");

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/rutodo.sqlite3")));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.migration_policy(), MigrationPolicy::Strict);
    }

    #[test]
    fn invalid_bool_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_DESTRUCTIVE_MIGRATION, "maybe")]))
            .expect_err("unknown bool must fail");
        assert!(matches!(err, ConfigError::InvalidBool { value, .. } if value == "maybe"));
    }
}
