//! Value resolution
//!
//! Walks the metadata tree against the flat store and produces an
//! intermediate generic value tree, which the loader then hands to serde to
//! populate the caller's record. Resolution is key-driven: only values the
//! schema asks for are read, everything else in the store is inert.
//!
//! Sequence reconstruction sizes the output as `max index + 1`; indices with
//! no matching key are intentionally left as zero-valued holes, not
//! compacted.

pub mod coerce;

use std::collections::BTreeSet;

use serde_json::{Map as JsonMap, Value};

use crate::error::ConfigError;
use crate::schema::{ElementKind, MetaKind, MetaNode};
use crate::store::{FlatMap, SEPARATOR, join};

pub use coerce::{coerce, zero};

/// Resolve a metadata node list against the flat store.
///
/// Returns the value tree for the implicit root record. Fails only when a
/// required scalar has neither a supplied value nor a default.
pub fn resolve(nodes: &[MetaNode], store: &FlatMap) -> Result<Value, ConfigError> {
    resolve_record(nodes, store, "").map(Value::Object)
}

fn resolve_record(
    nodes: &[MetaNode],
    store: &FlatMap,
    prefix: &str,
) -> Result<JsonMap<String, Value>, ConfigError> {
    let mut out = JsonMap::new();
    for node in nodes {
        let value = resolve_node(node, store, prefix)?;
        out.insert(node.field.to_string(), value);
    }
    Ok(out)
}

fn resolve_node(node: &MetaNode, store: &FlatMap, prefix: &str) -> Result<Value, ConfigError> {
    let base = join(prefix, node.name);
    match node.kind {
        MetaKind::Record => resolve_record(&node.children, store, &base).map(Value::Object),
        MetaKind::Map(element) => resolve_map(node, element, store, &base),
        MetaKind::Seq(element) => resolve_seq(node, element, store, &base),
        MetaKind::Scalar(kind) => resolve_scalar(node, kind, store, &base),
    }
}

fn resolve_scalar(
    node: &MetaNode,
    kind: crate::schema::ScalarKind,
    store: &FlatMap,
    key: &str,
) -> Result<Value, ConfigError> {
    if let Some(raw) = store.get(key) {
        return Ok(coerce(kind, raw));
    }
    if let Some(literal) = node.default {
        return Ok(coerce(kind, literal));
    }
    if node.required {
        return Err(ConfigError::missing_required(
            key,
            node.field,
            node.kind.name(),
        ));
    }
    if node.optional {
        return Ok(Value::Null);
    }
    Ok(zero(kind))
}

fn resolve_map(
    node: &MetaNode,
    element: ElementKind,
    store: &FlatMap,
    base: &str,
) -> Result<Value, ConfigError> {
    let scan = format!("{base}{SEPARATOR}");
    // Distinct map keys, lower-cased so callers see stable keys regardless
    // of source casing. A key discovered through several flat entries is
    // resolved exactly once.
    let keys: BTreeSet<String> = store
        .scan_prefix(&scan)
        .filter_map(|(rest, _)| first_segment(rest))
        .collect();

    if keys.is_empty() && node.optional {
        return Ok(Value::Null);
    }

    let mut out = JsonMap::new();
    for key in keys {
        let value = match element {
            ElementKind::Scalar(kind) => store
                .get(&join(base, &key))
                .map(|raw| coerce(kind, raw))
                .unwrap_or_else(|| zero(kind)),
            ElementKind::Record => {
                Value::Object(resolve_record(&node.children, store, &join(base, &key))?)
            }
        };
        out.insert(key, value);
    }
    Ok(Value::Object(out))
}

fn resolve_seq(
    node: &MetaNode,
    element: ElementKind,
    store: &FlatMap,
    base: &str,
) -> Result<Value, ConfigError> {
    let scan = format!("{base}{SEPARATOR}");
    let present: BTreeSet<usize> = store
        .scan_prefix(&scan)
        .filter_map(|(rest, _)| first_segment(rest))
        .filter_map(|segment| segment.parse::<usize>().ok())
        .collect();

    let Some(&max) = present.iter().next_back() else {
        return Ok(if node.optional {
            Value::Null
        } else {
            Value::Array(Vec::new())
        });
    };

    let mut out = Vec::with_capacity(max + 1);
    for index in 0..=max {
        if !present.contains(&index) {
            // Sparse indices leave zero-valued holes; they are not compacted.
            out.push(zero_element(node, element));
            continue;
        }
        let segment = index.to_string();
        let value = match element {
            ElementKind::Scalar(kind) => store
                .get(&join(base, &segment))
                .map(|raw| coerce(kind, raw))
                .unwrap_or_else(|| zero(kind)),
            ElementKind::Record => {
                Value::Object(resolve_record(&node.children, store, &join(base, &segment))?)
            }
        };
        out.push(value);
    }
    Ok(Value::Array(out))
}

fn first_segment(rest: &str) -> Option<String> {
    let segment = rest.split(SEPARATOR).next().unwrap_or_default();
    (!segment.is_empty()).then(|| segment.to_string())
}

fn zero_element(node: &MetaNode, element: ElementKind) -> Value {
    match element {
        ElementKind::Scalar(kind) => zero(kind),
        ElementKind::Record => Value::Object(zero_record(&node.children)),
    }
}

// Zero value of a record: every leaf at its zero, defaults and required
// flags not applied.
fn zero_record(nodes: &[MetaNode]) -> JsonMap<String, Value> {
    let mut out = JsonMap::new();
    for node in nodes {
        let value = if node.optional {
            Value::Null
        } else {
            match node.kind {
                MetaKind::Scalar(kind) => zero(kind),
                MetaKind::Record => Value::Object(zero_record(&node.children)),
                MetaKind::Map(_) => Value::Object(JsonMap::new()),
                MetaKind::Seq(_) => Value::Array(Vec::new()),
            }
        };
        out.insert(node.field.to_string(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::schema::{FieldDecl, ScalarKind, Shape, reflect};

    #[derive(Debug, PartialEq, Deserialize)]
    struct Target {
        provider: String,
        api_key: String,
    }

    fn target_fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::new("provider", "provider", Shape::Scalar(ScalarKind::Text)),
            FieldDecl::new("api_key", "api_key", Shape::Scalar(ScalarKind::Text)),
        ]
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct AppConfig {
        host: String,
        port: u16,
        timeout: Option<Duration>,
        targets: HashMap<String, Target>,
    }

    fn app_fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::new("host", "host", Shape::Scalar(ScalarKind::Text))
                .with_default("localhost"),
            FieldDecl::new("port", "port", Shape::Scalar(ScalarKind::U16)).with_default("8080"),
            FieldDecl::new(
                "timeout",
                "timeout",
                Shape::Optional(Box::new(Shape::Scalar(ScalarKind::Duration))),
            ),
            FieldDecl::new(
                "targets",
                "targets",
                Shape::Map(Box::new(Shape::Record(target_fields))),
            ),
        ]
    }

    fn resolve_app(store: &FlatMap) -> Result<AppConfig, ConfigError> {
        let nodes = reflect(&Shape::Record(app_fields)).unwrap();
        let tree = resolve(&nodes, store)?;
        serde_json::from_value(tree).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let store = FlatMap::new();
        let config = resolve_app(&store).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.timeout, None);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_supplied_value_ignores_default() {
        let mut store = FlatMap::new();
        store.insert("PORT", "9090");
        let config = resolve_app(&store).unwrap();
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_case_insensitive_scalar_lookup() {
        for key in ["host", "HOST", "Host"] {
            let mut store = FlatMap::new();
            store.insert(key, "example.com");
            let config = resolve_app(&store).unwrap();
            assert_eq!(config.host, "example.com", "key casing {key}");
        }
    }

    #[test]
    fn test_optional_scalar_resolves_behind_wrapper() {
        let mut store = FlatMap::new();
        store.insert("timeout", "30s");
        let config = resolve_app(&store).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_map_reconstruction_lowercases_keys() {
        let mut store = FlatMap::new();
        store.insert("TARGETS__DEFAULT__PROVIDER", "anthropic");
        store.insert("TARGETS__Fallback__PROVIDER", "openai");
        let config = resolve_app(&store).unwrap();

        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets["default"].provider, "anthropic");
        assert_eq!(config.targets["default"].api_key, "");
        assert_eq!(config.targets["fallback"].provider, "openai");
    }

    #[test]
    fn test_missing_required_names_full_key() {
        fn fields() -> Vec<FieldDecl> {
            vec![FieldDecl::new(
                "db",
                "db",
                Shape::Record(|| {
                    vec![FieldDecl::new("url", "url", Shape::Scalar(ScalarKind::Text)).required()]
                }),
            )]
        }
        let nodes = reflect(&Shape::Record(fields)).unwrap();
        let err = resolve(&nodes, &FlatMap::new()).unwrap_err();
        match err {
            ConfigError::MissingRequiredValue { key, field, kind } => {
                assert_eq!(key, "db__url");
                assert_eq!(field, "url");
                assert_eq!(kind, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_required_satisfied_by_value_or_default() {
        fn fields() -> Vec<FieldDecl> {
            vec![
                FieldDecl::new("url", "url", Shape::Scalar(ScalarKind::Text)).required(),
                FieldDecl::new("pool", "pool", Shape::Scalar(ScalarKind::U32))
                    .required()
                    .with_default("4"),
            ]
        }
        let nodes = reflect(&Shape::Record(fields)).unwrap();
        let mut store = FlatMap::new();
        store.insert("URL", "postgres://localhost/app");
        let tree = resolve(&nodes, &store).unwrap();
        assert_eq!(tree, json!({ "url": "postgres://localhost/app", "pool": 4 }));
    }

    #[test]
    fn test_sequence_reconstruction_keeps_holes() {
        fn fields() -> Vec<FieldDecl> {
            vec![FieldDecl::new(
                "arr",
                "arr",
                Shape::Seq(Box::new(Shape::Record(|| {
                    vec![FieldDecl::new("name", "name", Shape::Scalar(ScalarKind::Text))]
                }))),
            )]
        }
        let nodes = reflect(&Shape::Record(fields)).unwrap();
        let mut store = FlatMap::new();
        store.insert("ARR__0__NAME", "x");
        store.insert("ARR__2__NAME", "y");

        let tree = resolve(&nodes, &store).unwrap();
        assert_eq!(
            tree,
            json!({
                "arr": [
                    { "name": "x" },
                    { "name": "" },
                    { "name": "y" },
                ]
            })
        );
    }

    #[test]
    fn test_sequence_of_scalars() {
        fn fields() -> Vec<FieldDecl> {
            vec![FieldDecl::new(
                "weights",
                "weights",
                Shape::Seq(Box::new(Shape::Scalar(ScalarKind::F64))),
            )]
        }
        let nodes = reflect(&Shape::Record(fields)).unwrap();
        let mut store = FlatMap::new();
        store.insert("WEIGHTS__0", "0.5");
        store.insert("WEIGHTS__1", "1.25");

        let tree = resolve(&nodes, &store).unwrap();
        assert_eq!(tree, json!({ "weights": [0.5, 1.25] }));
    }

    #[test]
    fn test_map_of_scalars() {
        fn fields() -> Vec<FieldDecl> {
            vec![FieldDecl::new(
                "limits",
                "limits",
                Shape::Map(Box::new(Shape::Scalar(ScalarKind::MetricInt))),
            )]
        }
        let nodes = reflect(&Shape::Record(fields)).unwrap();
        let mut store = FlatMap::new();
        store.insert("LIMITS__TOKENS", "1.5M");
        store.insert("limits__requests", "100K");

        let tree = resolve(&nodes, &store).unwrap();
        assert_eq!(
            tree,
            json!({ "limits": { "tokens": 1_500_000, "requests": 100_000 } })
        );
    }

    #[test]
    fn test_idempotent_resolution() {
        let mut store = FlatMap::new();
        store.insert("HOST", "example.com");
        store.insert("TARGETS__DEFAULT__PROVIDER", "anthropic");

        let first = resolve_app(&store).unwrap();
        let second = resolve_app(&store).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unparsable_scalars_coerce_to_zero() {
        let mut store = FlatMap::new();
        store.insert("PORT", "not-a-port");
        let config = resolve_app(&store).unwrap();
        assert_eq!(config.port, 0);
    }
}
