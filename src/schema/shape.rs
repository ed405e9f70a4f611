//! Declared configuration shapes
//!
//! A configuration record describes itself with a static table of
//! [`FieldDecl`] entries rather than runtime reflection. Tables are usually
//! generated by `#[derive(Configurable)]`, but can be written by hand for
//! records the derive cannot express.

/// Scalar target kinds supported by the type coercer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// UTF-8 text, taken verbatim
    Text,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    /// `std::time::Duration` parsed from a compound literal such as `"30s"`
    Duration,
    /// Integer with an optional K/M/B magnitude suffix
    MetricInt,
    /// Float with an optional K/M/B magnitude suffix
    MetricFloat,
}

impl ScalarKind {
    /// Human-readable name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Text => "string",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::Isize => "isize",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::Usize => "usize",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Bool => "bool",
            ScalarKind::Duration => "duration",
            ScalarKind::MetricInt => "metric",
            ScalarKind::MetricFloat => "metric float",
        }
    }
}

/// Producer of a record's field table
///
/// A plain function pointer keeps shapes `'static` and lets nested records
/// reference each other without allocation until the table is needed.
pub type Fields = fn() -> Vec<FieldDecl>;

/// Declared shape of a field or record
#[derive(Debug, Clone)]
pub enum Shape {
    /// A scalar leaf
    Scalar(ScalarKind),
    /// A nested record with its own field table
    Record(Fields),
    /// An `Option<T>` wrapper around another shape
    Optional(Box<Shape>),
    /// A string-keyed map of elements
    Map(Box<Shape>),
    /// A sequence of elements
    Seq(Box<Shape>),
    /// A type the engine does not resolve; the field is left untouched
    Opaque,
}

impl Shape {
    /// Short description of the shape's top-level kind, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Scalar(kind) => kind.name(),
            Shape::Record(_) => "record",
            Shape::Optional(_) => "optional value",
            Shape::Map(_) => "map",
            Shape::Seq(_) => "sequence",
            Shape::Opaque => "opaque value",
        }
    }
}

/// One field of a declared record
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Rust field name, used for the output tree and diagnostics
    pub field: &'static str,
    /// Configuration key segment; `None` marks the field non-configurable
    pub key: Option<&'static str>,
    /// Splice the record's own fields into the parent level
    pub embedded: bool,
    /// Declared shape of the field
    pub shape: Shape,
    /// Fail resolution when no value and no default is available
    pub required: bool,
    /// Default literal, coerced with the same rules as supplied values
    pub default: Option<&'static str>,
}

impl FieldDecl {
    /// Declare a configurable field
    pub fn new(field: &'static str, key: &'static str, shape: Shape) -> Self {
        Self {
            field,
            key: Some(key),
            embedded: false,
            shape,
            required: false,
            default: None,
        }
    }

    /// Declare a non-configurable field (skipped by the reflector)
    pub fn skipped(field: &'static str) -> Self {
        Self {
            field,
            key: None,
            embedded: false,
            shape: Shape::Opaque,
            required: false,
            default: None,
        }
    }

    /// Declare an embedded record whose fields are spliced into the parent
    pub fn embedded(field: &'static str, shape: Shape) -> Self {
        Self {
            field,
            key: None,
            embedded: true,
            shape,
            required: false,
            default: None,
        }
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a default literal
    pub fn with_default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }
}

/// A record type that can describe its own configuration shape
///
/// Usually implemented with `#[derive(Configurable)]`; the expansion is a
/// `Shape::Record` table equivalent to what [`FieldDecl::new`] builds by hand.
pub trait Configurable {
    /// The declared shape of this record
    fn shape() -> Shape;
}
