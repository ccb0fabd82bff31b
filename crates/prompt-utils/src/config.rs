//! Configuration management utilities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Prefix of every environment variable read by [`Config::from_env`]
pub const ENV_PREFIX: &str = "PROMPT_RS_";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {detail}")]
    InvalidValue { key: String, detail: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected pretty or json")),
        }
    }
}

/// Edit-session cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of recent templates
    pub max_size: usize,
    /// Entry lifetime in seconds; `None` keeps entries until evicted
    pub ttl_secs: Option<u64>,
    /// Directory for the persisted cache; `None` keeps it in memory
    pub storage_dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: 50,
            ttl_secs: None,
            storage_dir: Some(PathBuf::from(".prompt-rs/cache")),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    pub cache: CacheSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "prompt-rs".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            cache: CacheSettings::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `PROMPT_RS_*` environment variables
    ///
    /// Recognized: `APP_NAME`, `ENVIRONMENT`, `LOG_LEVEL`, `LOG_FORMAT`,
    /// `CACHE_MAX_SIZE`, `CACHE_TTL_SECS` and `CACHE_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env(|key| std::env::var(key).ok())
    }

    /// Load a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.trim().is_empty())
        };

        if let Some(value) = var("APP_NAME") {
            self.app_name = value;
        }
        if let Some(value) = var("ENVIRONMENT") {
            self.environment = value;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log_level = value;
        }
        if let Some(value) = var("LOG_FORMAT") {
            self.log_format = value
                .parse()
                .map_err(|detail| invalid("LOG_FORMAT", detail))?;
        }
        if let Some(value) = var("CACHE_MAX_SIZE") {
            self.cache.max_size = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid("CACHE_MAX_SIZE", e.to_string()))?;
        }
        if let Some(value) = var("CACHE_TTL_SECS") {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid("CACHE_TTL_SECS", e.to_string()))?;
            self.cache.ttl_secs = (secs > 0).then_some(secs);
        }
        if let Some(value) = var("CACHE_DIR") {
            self.cache.storage_dir = Some(PathBuf::from(value));
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid("app_name must not be empty".to_string()));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level must not be empty".to_string()));
        }
        if self.cache.max_size == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_size must be greater than 0".to_string(),
            ));
        }
        if self.cache.ttl_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "cache.ttl_secs must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &str, detail: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{ENV_PREFIX}{name}"),
        detail: detail.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_env(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::default().merge_env(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "prompt-rs");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.cache.max_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = with_env(&[
            ("PROMPT_RS_LOG_LEVEL", "debug"),
            ("PROMPT_RS_LOG_FORMAT", "JSON"),
            ("PROMPT_RS_CACHE_MAX_SIZE", "5"),
            ("PROMPT_RS_CACHE_TTL_SECS", "60"),
            ("PROMPT_RS_CACHE_DIR", "/tmp/prompts"),
            ("PROMPT_RS_ENVIRONMENT", ""),
        ])
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.cache.max_size, 5);
        assert_eq!(config.cache.ttl_secs, Some(60));
        assert_eq!(config.cache.storage_dir, Some(PathBuf::from("/tmp/prompts")));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let err = with_env(&[("PROMPT_RS_CACHE_MAX_SIZE", "many")]).unwrap_err();
        assert!(err.to_string().contains("PROMPT_RS_CACHE_MAX_SIZE"));

        let err = with_env(&[("PROMPT_RS_CACHE_MAX_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        assert!(with_env(&[("PROMPT_RS_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt-rs.json");
        std::fs::write(&path, r#"{ "log_format": "json", "cache": { "max_size": 10 } }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.cache.max_size, 10);
        assert_eq!(config.app_name, "prompt-rs");
        assert!(config.cache.storage_dir.is_some());
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!(" Json ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Json.to_string(), "json");
    }
}
