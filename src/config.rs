//! Configuration module for gator.
//!
//! The configuration is a JSON document kept in the user's home directory.
//! Besides the database location it stores the name of the user that is
//! currently logged in, so `login` and `register` rewrite the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::feed::IngestPolicy;
use crate::{GatorError, Result};

/// File name of the configuration inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".gatorconfig.json";

/// Feed fetcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Total request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum accepted response body in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
}

fn default_request_timeout_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "gator".to_string()
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            max_feed_size_bytes: default_max_feed_size(),
        }
    }
}

/// Ingestion configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Which entries of a fetched document become posts.
    #[serde(default)]
    pub policy: IngestPolicy,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; logs always go to stderr as well.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Database connection string.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Name of the logged in user; empty when nobody is logged in.
    #[serde(default)]
    pub current_user_name: String,
    /// Feed fetcher configuration.
    #[serde(default)]
    pub fetcher: FetcherConfig,
    /// Ingestion configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_db_url() -> String {
    "sqlite://gator.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: default_db_url(),
            current_user_name: String::new(),
            fetcher: FetcherConfig::default(),
            ingest: IngestConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Default location of the configuration file (`$HOME/.gatorconfig.json`).
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .ok_or_else(|| GatorError::Config("cannot determine home directory".to_string()))?;
        Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GatorError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| GatorError::Config(format!("config parse error: {e}")))
    }

    /// Write the whole configuration back to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GatorError::Config(format!("config encode error: {e}")))?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Set the current user and persist the change.
    pub fn set_user<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<()> {
        self.current_user_name = name.to_string();
        self.save(path)
    }

    /// Name of the logged in user, if any.
    pub fn current_user(&self) -> Option<&str> {
        let name = self.current_user_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.db_url, "sqlite://gator.db");
        assert_eq!(config.current_user(), None);
        assert_eq!(config.fetcher.request_timeout_ms, 1000);
        assert_eq!(config.fetcher.user_agent, "gator");
        assert_eq!(config.ingest.policy, IngestPolicy::First);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{"db_url":"sqlite://feeds.db","current_user_name":"kahya"}"#;
        let config = Config::parse(json).unwrap();

        assert_eq!(config.db_url, "sqlite://feeds.db");
        assert_eq!(config.current_user(), Some("kahya"));
        assert_eq!(config.fetcher, FetcherConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "db_url": "sqlite::memory:",
            "current_user_name": "",
            "fetcher": { "request_timeout_ms": 2500, "user_agent": "test-agent" },
            "ingest": { "policy": "all" },
            "logging": { "level": "debug", "file": "logs/gator.log" }
        }"#;
        let config = Config::parse(json).unwrap();

        assert_eq!(config.current_user(), None);
        assert_eq!(config.fetcher.request_timeout_ms, 2500);
        assert_eq!(config.fetcher.user_agent, "test-agent");
        assert_eq!(config.fetcher.max_feed_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.ingest.policy, IngestPolicy::All);
        assert_eq!(config.logging.file.as_deref(), Some("logs/gator.log"));
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("{ not json");
        assert!(result.is_err());
        if let Err(GatorError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent-gator-config.json");
        assert!(matches!(result, Err(GatorError::Io(_))));
    }

    #[test]
    fn test_set_user_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.save(&path).unwrap();
        config.set_user("lane", &path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.current_user(), Some("lane"));
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_current_user_ignores_whitespace() {
        let config = Config {
            current_user_name: "   ".to_string(),
            ..Config::default()
        };
        assert_eq!(config.current_user(), None);
    }
}
