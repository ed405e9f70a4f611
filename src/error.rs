//! Configuration error types

use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse a configuration source
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// The root of a schema is not a record
    #[error("Configuration root must be a record, got {0}")]
    NotARecord(&'static str),

    /// A required value has neither a supplied value nor a default
    #[error("Missing required configuration value `{key}` (field `{field}`, type {kind})")]
    MissingRequiredValue {
        /// Fully-qualified flat-store key that was looked up
        key: String,
        /// Declared field name in the record
        field: &'static str,
        /// Human-readable declared type
        kind: &'static str,
    },

    /// The resolved value tree did not match the target record
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(String),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVarError(String),
}

impl ConfigError {
    /// Create a new file not found error
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        ConfigError::ParseError(message.into())
    }

    /// Create a new missing required value error
    pub fn missing_required<S: Into<String>>(
        key: S,
        field: &'static str,
        kind: &'static str,
    ) -> Self {
        ConfigError::MissingRequiredValue {
            key: key.into(),
            field,
            kind,
        }
    }
}
