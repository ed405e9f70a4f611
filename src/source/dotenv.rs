//! Dotenv-style file source
//!
//! Reads `KEY=VALUE` lines without touching the process environment. The
//! `overload` toggle mirrors the classic dotenv contract: when off, a key
//! already present in the process environment is skipped, so the process
//! value keeps precedence even in chains that never drain an env source.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::source::Source;
use crate::store::FlatMap;

/// Dotenv file source
#[derive(Debug)]
pub struct DotenvFile {
    path: PathBuf,
    required: bool,
    overload: bool,
}

impl DotenvFile {
    /// A file that must exist; loading fails otherwise
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
            overload: false,
        }
    }

    /// A file that is silently skipped when absent
    pub fn optional<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: false,
            overload: false,
        }
    }

    /// Insert values even for keys set in the process environment
    pub fn overload(mut self) -> Self {
        self.overload = true;
        self
    }
}

impl Source for DotenvFile {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("dotenv file")
    }

    fn populate(&self, store: &mut FlatMap) -> Result<(), ConfigError> {
        if !self.path.exists() {
            if self.required {
                return Err(ConfigError::file_not_found(format!(
                    "Required dotenv file not found: {}",
                    self.path.display()
                )));
            }
            return Ok(());
        }

        let entries = dotenvy::from_path_iter(&self.path).map_err(|e| {
            ConfigError::parse(format!("{}: {e}", self.path.display()))
        })?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                ConfigError::parse(format!("{}: {e}", self.path.display()))
            })?;
            if !self.overload && std::env::var_os(&key).is_some() {
                tracing::trace!(key = %key, "dotenv key shadowed by process environment");
                continue;
            }
            store.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_reads_key_value_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "APP__HOST=example.com\n# comment\nAPP__PORT=9090\n").unwrap();

        let mut store = FlatMap::new();
        DotenvFile::new(&path).populate(&mut store).unwrap();

        assert_eq!(store.get("app__host"), Some("example.com"));
        assert_eq!(store.get("app__port"), Some("9090"));
    }

    #[test]
    fn test_optional_file_missing_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut store = FlatMap::new();
        DotenvFile::optional(dir.path().join(".env"))
            .populate(&mut store)
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_required_file_missing_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut store = FlatMap::new();
        let err = DotenvFile::new(dir.path().join(".env"))
            .populate(&mut store)
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_process_environment_shadows_unless_overloaded() {
        // PATH is set in any test environment.
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "PATH=/tmp/nowhere\nDOTENV_ONLY__FLAG=1\n").unwrap();

        let mut store = FlatMap::new();
        DotenvFile::new(&path).populate(&mut store).unwrap();
        assert_eq!(store.get("path"), None);
        assert_eq!(store.get("dotenv_only__flag"), Some("1"));

        let mut store = FlatMap::new();
        DotenvFile::new(&path).overload().populate(&mut store).unwrap();
        assert_eq!(store.get("path"), Some("/tmp/nowhere"));
    }
}
