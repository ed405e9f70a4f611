//! Process-environment source
//!
//! The environment is modeled as an injected collaborator: the default
//! constructor snapshots `std::env::vars()` at drain time, and tests (or
//! embedders) can supply a synthetic environment with [`EnvSource::from_iter`].

use crate::error::ConfigError;
use crate::source::Source;
use crate::store::FlatMap;

/// Environment variable source
#[derive(Debug, Default)]
pub struct EnvSource {
    prefix: Option<String>,
    vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
    /// Read from the process environment
    pub fn process() -> Self {
        Self::default()
    }

    /// Read from a synthetic environment instead of the process one
    pub fn from_iter<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: None,
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Only take variables starting with `prefix` (matched case-insensitively)
    /// and strip it before insertion, e.g. `APP_SERVER__PORT` with prefix
    /// `APP_` lands as `SERVER__PORT`.
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl Source for EnvSource {
    fn name(&self) -> &str {
        if self.vars.is_some() {
            "environment (synthetic)"
        } else {
            "environment"
        }
    }

    fn populate(&self, store: &mut FlatMap) -> Result<(), ConfigError> {
        let vars: Vec<(String, String)> = match &self.vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        };
        for (key, value) in vars {
            match &self.prefix {
                Some(prefix) => {
                    if key.len() >= prefix.len()
                        && key.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
                    {
                        store.insert(key[prefix.len()..].to_string(), value);
                    }
                }
                None => store.insert(key, value),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_environment() {
        let mut store = FlatMap::new();
        EnvSource::from_iter([("SERVER__PORT", "9090"), ("SERVER__HOST", "h")])
            .populate(&mut store)
            .unwrap();
        assert_eq!(store.get("server__port"), Some("9090"));
        assert_eq!(store.get("server__host"), Some("h"));
    }

    #[test]
    fn test_prefix_is_stripped() {
        let mut store = FlatMap::new();
        EnvSource::from_iter([
            ("APP_SERVER__PORT", "9090"),
            ("app_server__host", "h"),
            ("OTHER_KEY", "ignored"),
        ])
        .with_prefix("APP_")
        .populate(&mut store)
        .unwrap();

        assert_eq!(store.get("server__port"), Some("9090"));
        assert_eq!(store.get("server__host"), Some("h"));
        assert_eq!(store.get("other_key"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_process_environment_snapshot() {
        // PATH is present in any test environment.
        let mut store = FlatMap::new();
        EnvSource::process().populate(&mut store).unwrap();
        assert!(store.contains("PATH"));
    }
}
