//! Configuration loader
//!
//! This module provides the [`Loader`] struct that ties the pipeline
//! together: reflect the target record's schema, drain the registered
//! sources into the flat store, resolve the store against the schema, and
//! deserialize the resolved tree into the caller's record.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::error::ConfigError;
use crate::resolve::resolve;
use crate::schema::{Configurable, reflect};
use crate::source::{DotenvFile, EnvSource, Source, TomlFile, aggregate};

/// Environment variable selecting the active profile
const PROFILE_ENV: &str = "LAMINA_PROFILE";

/// Deployment profile selecting the `{profile}.toml` layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Development profile
    #[default]
    Development,
    /// Test profile
    Test,
    /// Staging profile
    Staging,
    /// Production profile
    Production,
}

impl Profile {
    /// Read the profile from the `LAMINA_PROFILE` environment variable
    ///
    /// Returns `Development` if the variable is not set or cannot be parsed.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Convert the profile to a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Test => "test",
            Profile::Staging => "staging",
            Profile::Production => "production",
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "test" => Ok(Profile::Test),
            "staging" | "stage" => Ok(Profile::Staging),
            "production" | "prod" => Ok(Profile::Production),
            _ => Err(ConfigError::EnvVarError(format!(
                "Invalid profile '{}'. Valid values are: development, test, staging, production",
                s
            ))),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader over an ordered list of sources
///
/// Later sources override earlier ones, matched case-insensitively. A
/// typical chain drains a structured file (lowest precedence), a dotenv
/// file, then the process environment (highest precedence).
#[derive(Default)]
pub struct Loader {
    sources: Vec<Box<dyn Source>>,
}

impl Loader {
    /// Create a loader with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; it overrides everything registered before it
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Layered loading from a configuration directory
    ///
    /// Drains, in order of increasing priority:
    /// 1. `default.toml` - base configuration (required)
    /// 2. `{profile}.toml` - profile-specific configuration (optional)
    /// 3. `local.toml` - local overrides (optional)
    /// 4. `.env` in the working directory (optional)
    /// 5. Process environment variables
    ///
    /// The profile is read from `LAMINA_PROFILE`.
    pub fn layered<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let profile = Profile::from_env();
        tracing::debug!(profile = %profile, dir = %dir.display(), "layered configuration");
        Self::new()
            .with_source(TomlFile::new(dir.join("default.toml")))
            .with_source(TomlFile::optional(dir.join(format!("{profile}.toml"))))
            .with_source(TomlFile::optional(dir.join("local.toml")))
            .with_source(DotenvFile::optional(".env"))
            .with_source(EnvSource::process())
    }

    /// Load a record from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if a required source is missing or unparsable, the
    /// record's shape is not a record, a required value has neither a
    /// supplied value nor a default, or the resolved tree does not match
    /// the record.
    pub fn load<T>(&self) -> Result<T, ConfigError>
    where
        T: Configurable + DeserializeOwned,
    {
        let nodes = reflect(&T::shape())?;
        let store = aggregate(&self.sources)?;
        tracing::debug!(
            fields = nodes.len(),
            keys = store.len(),
            "resolving configuration"
        );
        let tree = resolve(&nodes, &store)?;
        serde_json::from_value(tree).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }
}
