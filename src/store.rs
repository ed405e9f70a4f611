//! Flat key/value store shared by all configuration sources
//!
//! Every source flattens its own nested structure into keys joined with
//! [`SEPARATOR`] before inserting here. Keys are compared case-insensitively
//! for lookup, prefix scanning, and override: inserting a key that
//! case-insensitively matches an existing entry replaces both the value and
//! the stored canonical casing.

use std::collections::HashMap;

/// Separator joining hierarchical key segments in the flat store
///
/// A nested key like `server.port` is addressed as `SERVER__PORT`
/// (case-insensitive).
pub const SEPARATOR: &str = "__";

/// Join two key segments with the hierarchical separator.
///
/// An empty prefix yields the segment unchanged, so the synthetic root does
/// not contribute a leading separator.
pub fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{segment}")
    }
}

#[derive(Debug, Clone)]
struct Entry {
    /// Key casing as last written
    key: String,
    value: String,
}

/// Case-insensitive flat mapping from hierarchical key to raw string value
///
/// Insertion order is irrelevant; later writes win regardless of casing.
#[derive(Debug, Clone, Default)]
pub struct FlatMap {
    // Keyed by the lower-cased form of the key.
    entries: HashMap<String, Entry>,
}

impl FlatMap {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key/value pair, replacing any case-insensitive match
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        self.entries.insert(
            key.to_lowercase(),
            Entry {
                key,
                value: value.into(),
            },
        );
    }

    /// Look up a value by key, matched case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_lowercase())
            .map(|e| e.value.as_str())
    }

    /// Whether a key is present, matched case-insensitively
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    /// Scan for keys starting with `prefix`, matched case-insensitively.
    ///
    /// Yields the lower-cased remainder of each matching key (the part after
    /// the prefix) together with its value. Iteration order is unspecified.
    pub fn scan_prefix<'a>(
        &'a self,
        prefix: &str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let prefix = prefix.to_lowercase();
        self.entries.iter().filter_map(move |(lower, entry)| {
            lower
                .strip_prefix(&prefix)
                .map(|rest| (rest, entry.value.as_str()))
        })
    }

    /// Number of entries in the store
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries with their canonical (last-written) casing
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|e| (e.key.as_str(), e.value.as_str()))
    }
}
