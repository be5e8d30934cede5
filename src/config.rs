use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::steps::DEFAULT_MAX_RESULTS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for the concrete reasoning and search clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub tavily_api_key: String,
    pub tavily_url: String,
    pub search_depth: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            tavily_api_key: String::new(),
            tavily_url: "https://api.tavily.com/search".into(),
            search_depth: "basic".into(),
            max_results: DEFAULT_MAX_RESULTS,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("openai_api_key"));
        }
        if self.tavily_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("tavily_api_key"));
        }
        if self.max_results == 0 {
            return Err(ConfigError::Invalid {
                name: "max_results",
                reason: "must be at least 1".into(),
            });
        }
        if !matches!(self.search_depth.as_str(), "basic" | "advanced") {
            return Err(ConfigError::Invalid {
                name: "search_depth",
                reason: format!("expected basic or advanced, got {}", self.search_depth),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> Config {
        Config {
            openai_api_key: "sk-test".into(),
            tavily_api_key: "tvly-test".into(),
            ..Config::default()
        }
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_results, 3);
        assert_eq!(config.search_depth, "basic");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"model":"gpt-4o","max_results":5}"#).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_results, 5);
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn validate_requires_keys() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::Missing("openai_api_key"))
        ));
        let config = Config {
            openai_api_key: "k".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("tavily_api_key"))
        ));
        assert!(keyed().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero = Config {
            max_results: 0,
            ..keyed()
        };
        assert!(matches!(
            zero.validate(),
            Err(ConfigError::Invalid {
                name: "max_results",
                ..
            })
        ));

        let deep = Config {
            search_depth: "deep".into(),
            ..keyed()
        };
        assert!(deep.validate().unwrap_err().to_string().contains("got deep"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent_dir_xyz_abc/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
