//! Configuration for the qirk CLI.
//!
//! Settings are layered, highest precedence first:
//! 1. Command-line flags
//! 2. Environment variables (`QIRK_` prefix)
//! 3. Configuration file (YAML, `--config`)
//! 4. Default values

use std::path::Path;

use qirk_eval::EvalConfig;
use serde::{Deserialize, Serialize};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Evaluation settings
    pub eval: EvalSettings,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Evaluation limits plus the entry point to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalSettings {
    /// `max_steps` and `max_call_depth`
    #[serde(flatten)]
    pub limits: EvalConfig,

    /// Function to evaluate instead of the module's entry point
    pub entry_point: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file (if any), then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        let config = config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// Only variables that are set take effect. `lookup` resolves a variable
    /// name to its value.
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QIRK_MAX_STEPS") {
            self.eval.limits.max_steps = Some(parse_env("QIRK_MAX_STEPS", &v)?);
        }
        if let Some(v) = lookup("QIRK_MAX_CALL_DEPTH") {
            self.eval.limits.max_call_depth = parse_env("QIRK_MAX_CALL_DEPTH", &v)?;
        }
        if let Some(v) = lookup("QIRK_ENTRY_POINT") {
            self.eval.entry_point = Some(v);
        }
        if let Some(v) = lookup("QIRK_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        if self.eval.limits.max_steps == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_steps must be greater than 0".to_string(),
            ));
        }
        if self.eval.limits.max_call_depth == 0 {
            return Err(ConfigError::ValidationError(
                "max_call_depth must be greater than 0".to_string(),
            ));
        }
        if let Some(name) = &self.eval.entry_point {
            if name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "entry_point must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key}: invalid value `{value}`")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use qirk_eval::DEFAULT_MAX_CALL_DEPTH;

    fn env(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.eval.limits.max_steps, None);
        assert_eq!(config.eval.limits.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial() {
        let config =
            Config::from_yaml("eval:\n  max_steps: 5000\n  entry_point: kernel\n").unwrap();
        assert_eq!(config.eval.limits.max_steps, Some(5000));
        assert_eq!(config.eval.limits.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(config.eval.entry_point.as_deref(), Some("kernel"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_yaml_invalid_level() {
        let err = Config::from_yaml("logging:\n  level: loud\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_yaml_malformed() {
        let err = Config::from_yaml("eval: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_yaml("eval:\n  max_steps: 10\nlogging:\n  level: info\n")
            .unwrap()
            .merge_env(env(&[("QIRK_MAX_STEPS", "99"), ("QIRK_LOG_LEVEL", "debug")]))
            .unwrap();
        assert_eq!(config.eval.limits.max_steps, Some(99));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_absent_keeps_values() {
        let config = Config::from_yaml("eval:\n  max_call_depth: 8\n")
            .unwrap()
            .merge_env(env(&[]))
            .unwrap();
        assert_eq!(config.eval.limits.max_call_depth, 8);
    }

    #[test]
    fn test_env_invalid_number() {
        let err = Config::default()
            .merge_env(env(&[("QIRK_MAX_CALL_DEPTH", "deep")]))
            .unwrap_err();
        assert!(err.to_string().contains("QIRK_MAX_CALL_DEPTH"));
    }

    #[test]
    fn test_validate_zero_limits() {
        let mut config = Config::default();
        config.eval.limits.max_call_depth = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.eval.limits.max_steps = Some(0);
        assert!(config.validate().is_err());
    }
}
