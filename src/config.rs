//! Engine configuration, persisted as TOML.
//!
//! ```toml
//! epsilon = 0.2
//! disclosure = "proximity"   # or "reachability"
//! ```

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Proximity tolerance used by the default open-question rule.
pub const DEFAULT_EPSILON: f64 = 0.2;

/// Errors from loading engine configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read engine config: {path}")]
    #[diagnostic(
        code(lateral::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse engine config {path}: {message}")]
    #[diagnostic(
        code(lateral::config::parse),
        help("Check the TOML syntax. Known keys are `epsilon` and `disclosure`.")
    )]
    Parse { path: String, message: String },

    #[error("epsilon must be a finite number greater than zero, got {value}")]
    #[diagnostic(
        code(lateral::config::epsilon),
        help("A belief opens a question when it lies strictly within epsilon of the effect value; 0.2 is the usual choice.")
    )]
    InvalidEpsilon { value: f64 },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which rule refreshes the open-question list after each answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disclosure {
    /// Open a question when graded belief is within epsilon of one of its effect values.
    #[default]
    Proximity,
    /// Open a question when its effect touches descriptors reachable through
    /// the active paradigm's relation graph.
    Reachability,
}

impl std::fmt::Display for Disclosure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proximity => write!(f, "proximity"),
            Self::Reachability => write!(f, "reachability"),
        }
    }
}

/// Runtime knobs for the belief engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default)]
    pub disclosure: Disclosure,
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            disclosure: Disclosure::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml_str: &str) -> ConfigResult<Self> {
        Self::parse(toml_str, "(inline)")
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(toml_str: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::InvalidEpsilon {
                value: self.epsilon,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.epsilon, DEFAULT_EPSILON);
        assert_eq!(config.disclosure, Disclosure::Proximity);
    }

    #[test]
    fn reachability_rule_parses() {
        let config = EngineConfig::from_toml_str("disclosure = \"reachability\"\nepsilon = 0.1").unwrap();
        assert_eq!(config.disclosure, Disclosure::Reachability);
        assert_eq!(config.epsilon, 0.1);
    }

    #[test]
    fn non_positive_epsilon_is_rejected() {
        let err = EngineConfig::from_toml_str("epsilon = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEpsilon { .. }));
    }

    #[test]
    fn unknown_rule_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("disclosure = \"telepathy\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "epsilon = 0.3\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.epsilon, 0.3);
    }
}
