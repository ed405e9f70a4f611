//! Schema reflection
//!
//! Walks a declared [`Shape`] into an ordered metadata tree. The tree is
//! structurally isomorphic to the declared record and is computable without
//! any configuration data present, so it is rebuilt cheaply per load.

use crate::error::ConfigError;
use crate::schema::shape::{FieldDecl, ScalarKind, Shape};

/// Element kind of a map or sequence node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Scalar elements, coerced directly
    Scalar(ScalarKind),
    /// Record elements, resolved with the node's `children` as their schema
    Record,
}

/// Semantic kind of a metadata node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    Scalar(ScalarKind),
    Record,
    Map(ElementKind),
    Seq(ElementKind),
}

impl MetaKind {
    /// Human-readable name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            MetaKind::Scalar(kind) => kind.name(),
            MetaKind::Record => "record",
            MetaKind::Map(_) => "map",
            MetaKind::Seq(_) => "sequence",
        }
    }
}

/// One configurable field or composite in the metadata tree
#[derive(Debug, Clone)]
pub struct MetaNode {
    /// Hierarchical key segment, case as declared
    pub name: &'static str,
    /// Rust field name the resolved value is written under
    pub field: &'static str,
    /// Semantic kind of the node
    pub kind: MetaKind,
    /// Whether an `Option` wrapper sits around the value
    pub optional: bool,
    /// Fail resolution when no value and no default is available
    pub required: bool,
    /// Default literal, if declared
    pub default: Option<&'static str>,
    /// Child metadata: record fields, or the element schema of a
    /// map/sequence of records
    pub children: Vec<MetaNode>,
}

/// Reflect a declared shape into its metadata node list.
///
/// The returned list describes the children of the implicit root record, in
/// declaration order. Fails with [`ConfigError::NotARecord`] when the root
/// shape is not a record.
pub fn reflect(shape: &Shape) -> Result<Vec<MetaNode>, ConfigError> {
    match shape {
        Shape::Record(fields) => Ok(reflect_fields(fields())),
        other => Err(ConfigError::NotARecord(other.kind_name())),
    }
}

fn reflect_fields(decls: Vec<FieldDecl>) -> Vec<MetaNode> {
    let mut nodes = Vec::with_capacity(decls.len());
    for decl in decls {
        if decl.embedded {
            // Embedded composites do not introduce a key segment; their
            // children are spliced into the parent's list.
            if let Shape::Record(fields) = decl.shape {
                nodes.extend(reflect_fields(fields()));
            }
            continue;
        }
        let Some(key) = decl.key else {
            continue;
        };
        if let Some(node) = reflect_field(key, &decl) {
            nodes.push(node);
        }
    }
    nodes
}

fn reflect_field(key: &'static str, decl: &FieldDecl) -> Option<MetaNode> {
    let (shape, optional) = unwrap_optional(&decl.shape);
    let (kind, children) = classify(shape)?;
    Some(MetaNode {
        name: key,
        field: decl.field,
        kind,
        optional,
        required: decl.required,
        default: decl.default,
        children,
    })
}

fn unwrap_optional(shape: &Shape) -> (&Shape, bool) {
    let mut shape = shape;
    let mut optional = false;
    while let Shape::Optional(inner) = shape {
        shape = inner;
        optional = true;
    }
    (shape, optional)
}

fn classify(shape: &Shape) -> Option<(MetaKind, Vec<MetaNode>)> {
    match shape {
        Shape::Scalar(kind) => Some((MetaKind::Scalar(*kind), Vec::new())),
        Shape::Record(fields) => Some((MetaKind::Record, reflect_fields(fields()))),
        Shape::Map(element) => {
            let (kind, children) = classify_element(element)?;
            Some((MetaKind::Map(kind), children))
        }
        Shape::Seq(element) => {
            let (kind, children) = classify_element(element)?;
            Some((MetaKind::Seq(kind), children))
        }
        // Unknown target kinds are a no-op, not an error.
        Shape::Optional(_) | Shape::Opaque => None,
    }
}

fn classify_element(element: &Shape) -> Option<(ElementKind, Vec<MetaNode>)> {
    match element {
        Shape::Scalar(kind) => Some((ElementKind::Scalar(*kind), Vec::new())),
        Shape::Record(fields) => Some((ElementKind::Record, reflect_fields(fields()))),
        _ => None,
    }
}
