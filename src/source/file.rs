//! Structured-file sources
//!
//! Read a TOML or JSON file and flatten its nested structure into the flat
//! store: tables/objects become `__`-joined segments, arrays become integer
//! index segments, scalars are rendered to their string form for the
//! coercer.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConfigError;
use crate::source::Source;
use crate::store::{FlatMap, join};

/// TOML file source
#[derive(Debug)]
pub struct TomlFile {
    path: PathBuf,
    required: bool,
}

impl TomlFile {
    /// A file that must exist; loading fails otherwise
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// A file that is silently skipped when absent
    pub fn optional<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: false,
        }
    }
}

impl Source for TomlFile {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("toml file")
    }

    fn populate(&self, store: &mut FlatMap) -> Result<(), ConfigError> {
        let Some(contents) = read(&self.path, self.required)? else {
            return Ok(());
        };
        let value: toml::Value = toml::from_str(&contents).map_err(|e| {
            ConfigError::parse(format!("{}: {e}", self.path.display()))
        })?;
        flatten("", &toml_to_json(value), store);
        Ok(())
    }
}

/// JSON file source
#[derive(Debug)]
pub struct JsonFile {
    path: PathBuf,
    required: bool,
}

impl JsonFile {
    /// A file that must exist; loading fails otherwise
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: true,
        }
    }

    /// A file that is silently skipped when absent
    pub fn optional<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required: false,
        }
    }
}

impl Source for JsonFile {
    fn name(&self) -> &str {
        self.path.to_str().unwrap_or("json file")
    }

    fn populate(&self, store: &mut FlatMap) -> Result<(), ConfigError> {
        let Some(contents) = read(&self.path, self.required)? else {
            return Ok(());
        };
        let value: Value = serde_json::from_str(&contents).map_err(|e| {
            ConfigError::parse(format!("{}: {e}", self.path.display()))
        })?;
        flatten("", &value, store);
        Ok(())
    }
}

fn read(path: &Path, required: bool) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        if required {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|e| ConfigError::parse(format!("{}: {e}", path.display())))
}

fn flatten(prefix: &str, value: &Value, store: &mut FlatMap) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&join(prefix, key), child, store);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&join(prefix, &index.to_string()), child, store);
            }
        }
        Value::String(s) => store.insert(prefix, s.clone()),
        Value::Number(n) => store.insert(prefix, n.to_string()),
        Value::Bool(b) => store.insert(prefix, b.to_string()),
        Value::Null => {}
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
        toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(toml_to_json).collect())
        }
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
    }
}
