//! Metric numeric types
//!
//! Human-friendly numeric scalars accepting an optional magnitude suffix:
//! `K` (×1,000), `M` (×1,000,000), `B` (×1,000,000,000). Suffixes are
//! matched case-insensitively, so `"1.5M"`, `"100k"` and plain `"50000"` all
//! parse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a metric literal cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid metric literal `{0}`")]
pub struct ParseMetricError(String);

fn parse_metric(s: &str) -> Result<f64, ParseMetricError> {
    let s = s.trim();
    let (mantissa, multiplier) = match s.chars().last() {
        Some('k') | Some('K') => (&s[..s.len() - 1], 1_000.0),
        Some('m') | Some('M') => (&s[..s.len() - 1], 1_000_000.0),
        Some('b') | Some('B') => (&s[..s.len() - 1], 1_000_000_000.0),
        _ => (s, 1.0),
    };
    if mantissa.is_empty() {
        return Err(ParseMetricError(s.to_string()));
    }
    mantissa
        .parse::<f64>()
        .map(|v| v * multiplier)
        .map_err(|_| ParseMetricError(s.to_string()))
}

/// Integer-valued metric scalar, e.g. `"100K"` → `100_000`
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MetricInt(pub i64);

impl MetricInt {
    /// The wrapped integer value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl FromStr for MetricInt {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Plain integers parse exactly; the float path is only taken for
        // decimal mantissas and suffixed literals.
        if let Ok(v) = s.trim().parse::<i64>() {
            return Ok(MetricInt(v));
        }
        parse_metric(s).map(|v| MetricInt(v.round() as i64))
    }
}

impl fmt::Display for MetricInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MetricInt {
    fn from(v: i64) -> Self {
        MetricInt(v)
    }
}

impl From<MetricInt> for i64 {
    fn from(v: MetricInt) -> Self {
        v.0
    }
}

/// Float-valued metric scalar, e.g. `"2.5K"` → `2500.0`
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricFloat(pub f64);

impl MetricFloat {
    /// The wrapped float value
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl FromStr for MetricFloat {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_metric(s).map(MetricFloat)
    }
}

impl fmt::Display for MetricFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f64> for MetricFloat {
    fn from(v: f64) -> Self {
        MetricFloat(v)
    }
}

impl From<MetricFloat> for f64 {
    fn from(v: MetricFloat) -> Self {
        v.0
    }
}
