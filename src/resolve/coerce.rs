//! Scalar type coercion
//!
//! Converts a raw string from the flat store into a typed value for the
//! intermediate tree. Coercion is best-effort: unparsable numeric, boolean,
//! duration, and metric literals coerce to the kind's zero value instead of
//! failing, matching the behavior operators already rely on.

use std::time::Duration;

use serde_json::{Number, Value, json};

use crate::schema::ScalarKind;
use crate::types::{MetricFloat, MetricInt};

/// Coerce a raw string into a typed value for the given scalar kind
pub fn coerce(kind: ScalarKind, raw: &str) -> Value {
    match kind {
        ScalarKind::Text => Value::String(raw.to_string()),
        ScalarKind::I8 => int(raw.parse::<i8>().map(i64::from)),
        ScalarKind::I16 => int(raw.parse::<i16>().map(i64::from)),
        ScalarKind::I32 => int(raw.parse::<i32>().map(i64::from)),
        ScalarKind::I64 => int(raw.parse::<i64>()),
        ScalarKind::Isize => int(raw.parse::<isize>().map(|v| v as i64)),
        ScalarKind::U8 => uint(raw.parse::<u8>().map(u64::from)),
        ScalarKind::U16 => uint(raw.parse::<u16>().map(u64::from)),
        ScalarKind::U32 => uint(raw.parse::<u32>().map(u64::from)),
        ScalarKind::U64 => uint(raw.parse::<u64>()),
        ScalarKind::Usize => uint(raw.parse::<usize>().map(|v| v as u64)),
        ScalarKind::F32 => float(raw.parse::<f32>().map(f64::from)),
        ScalarKind::F64 => float(raw.parse::<f64>()),
        ScalarKind::Bool => Value::Bool(parse_bool(raw)),
        ScalarKind::Duration => {
            duration(humantime::parse_duration(raw.trim()).unwrap_or(Duration::ZERO))
        }
        ScalarKind::MetricInt => int(raw.parse::<MetricInt>().map(|m| m.get())),
        ScalarKind::MetricFloat => float(raw.parse::<MetricFloat>().map(|m| m.get())),
    }
}

/// The zero value of a scalar kind
pub fn zero(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Text => Value::String(String::new()),
        ScalarKind::I8
        | ScalarKind::I16
        | ScalarKind::I32
        | ScalarKind::I64
        | ScalarKind::Isize
        | ScalarKind::MetricInt => Value::Number(Number::from(0)),
        ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 | ScalarKind::Usize => {
            Value::Number(Number::from(0u64))
        }
        ScalarKind::F32 | ScalarKind::F64 | ScalarKind::MetricFloat => float::<()>(Ok(0.0)),
        ScalarKind::Bool => Value::Bool(false),
        ScalarKind::Duration => duration(Duration::ZERO),
    }
}

fn int<E>(parsed: Result<i64, E>) -> Value {
    Value::Number(Number::from(parsed.unwrap_or(0)))
}

fn uint<E>(parsed: Result<u64, E>) -> Value {
    Value::Number(Number::from(parsed.unwrap_or(0)))
}

fn float<E>(parsed: Result<f64, E>) -> Value {
    let v = parsed.unwrap_or(0.0);
    // JSON has no representation for non-finite floats.
    Value::Number(Number::from_f64(v).unwrap_or_else(|| Number::from(0)))
}

// Accepts the usual spellings; anything else is the zero value.
fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "t" | "true" | "yes" | "on"
    )
}

// `std::time::Duration` deserializes from its secs/nanos fields.
fn duration(d: Duration) -> Value {
    json!({ "secs": d.as_secs(), "nanos": d.subsec_nanos() })
}
