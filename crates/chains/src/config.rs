//! Resolver configuration.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding [`ResolverConfig::max_conflict_retries`].
pub const MAX_CONFLICT_RETRIES_ENV: &str = "QUESTGRAPH_MAX_CONFLICT_RETRIES";

const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Errors loading a configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file {}", path.display())]
    #[diagnostic(code(questgraph::config::io))]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid configuration.
    #[error("Invalid config file {}: {message}", path.display())]
    #[diagnostic(
        code(questgraph::config::parse),
        help("Config files are TOML, or JSON when the extension is .json")
    )]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value '{value}' for {key}")]
    #[diagnostic(code(questgraph::config::env))]
    InvalidEnv {
        /// Environment variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Tunables of the chain resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverConfig {
    /// Extra attempts after a store conflict before giving up.
    pub max_conflict_retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

impl ResolverConfig {
    /// Total attempts a mutation may make.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_conflict_retries.saturating_add(1)
    }

    /// Load from a TOML file, or JSON if the extension is `.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Apply overrides from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for unparsable values.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = std::env::var(MAX_CONFLICT_RETRIES_ENV) {
            self.max_conflict_retries =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: MAX_CONFLICT_RETRIES_ENV,
                    value,
                })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.max_attempts(), 4);
    }

    #[test]
    fn test_load_toml() {
        let file = write_temp(".toml", "maxConflictRetries = 7\n");
        let config = ResolverConfig::from_path(file.path()).unwrap();
        assert_eq!(config.max_conflict_retries, 7);
    }

    #[test]
    fn test_load_json_with_missing_fields() {
        let file = write_temp(".json", "{}");
        let config = ResolverConfig::from_path(file.path()).unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        let file = write_temp(".toml", "maxConflictRetries = \"many\"\n");
        let err = ResolverConfig::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ResolverConfig::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_var(MAX_CONFLICT_RETRIES_ENV, Some("0"), || {
            let config = ResolverConfig::default().with_env_overrides().unwrap();
            assert_eq!(config.max_conflict_retries, 0);
            assert_eq!(config.max_attempts(), 1);
        });

        temp_env::with_var(MAX_CONFLICT_RETRIES_ENV, Some("lots"), || {
            let err = ResolverConfig::default().with_env_overrides().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnv { .. }));
        });
    }
}
