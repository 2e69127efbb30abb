//! Configuration - layered defaults, user config file and environment

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::core::error::ShopError;

/// Environment variable overriding the database path
pub const ENV_DB: &str = "HUNTER_DB";

/// Environment variable overriding the log filter
pub const ENV_LOG: &str = "HUNTER_LOG";

const CONFIG_FILE: &str = "config.yaml";
const DB_FILE: &str = "hunter.db";

/// Runtime configuration
///
/// Resolution order, later wins: built-in defaults, `config.yaml` in the
/// platform config directory, environment variables, CLI flags (applied by the
/// caller).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,
    /// `tracing` filter directive, e.g. `info` or `hunter=debug`
    pub log_level: String,
}

/// On-disk shape; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_data_dir().join(DB_FILE),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the user config file and environment
    pub fn load() -> Result<Self, ShopError> {
        let mut config = Config::default();
        if let Some(path) = user_config_path() {
            if path.exists() {
                config.merge_file(&path)?;
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Merge a YAML config file over the current values
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ShopError> {
        let content = std::fs::read_to_string(path)?;
        self.merge_yaml(&content)
            .map_err(|e| ShopError::Config(format!("{}: {}", path.display(), e)))
    }

    fn merge_yaml(&mut self, content: &str) -> Result<(), String> {
        if content.trim().is_empty() {
            return Ok(());
        }
        let file: ConfigFile = serde_yml::from_str(content).map_err(|e| e.to_string())?;
        if let Some(db) = file.database {
            self.database = db;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.database = PathBuf::from(db);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "hunter")
}

/// Path of the user config file, if a home directory is known
pub fn user_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join(CONFIG_FILE))
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.database.ends_with(DB_FILE));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_yaml_partial() {
        let mut config = Config::default();
        config
            .merge_yaml("log_level: debug\n")
            .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.database, Config::default().database);
    }

    #[test]
    fn test_merge_yaml_rejects_unknown_keys() {
        let mut config = Config::default();
        assert!(config.merge_yaml("tax: 7\n").is_err());
    }

    #[test]
    fn test_merge_empty_file() {
        let mut config = Config::default();
        config.merge_yaml("  \n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DB, "/tmp/shop.db"), (ENV_LOG, "hunter=trace")]);
        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.log_level, "hunter=trace");
    }

    #[test]
    fn test_merge_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "database: /srv/hunter.db\n").unwrap();
        let mut config = Config::default();
        config.merge_file(&path).unwrap();
        assert_eq!(config.database, PathBuf::from("/srv/hunter.db"));
    }
}
