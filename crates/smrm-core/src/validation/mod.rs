//! Validation of candidates before they reach the store.
//!
//! Every check is pure and collects all violations rather than stopping at the
//! first, except the import check which reports the first structural defect.
//! Lengths count Unicode scalar values.

mod customer;
mod import;
mod menu;
mod record;

pub use customer::*;
pub use import::*;
pub use menu::*;
pub use record::*;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Outcome of a validation check.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub(crate) fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Combine two outcomes, keeping every message in order.
    pub fn and(mut self, other: Validation) -> Self {
        self.errors.extend(other.errors);
        Self::from_errors(self.errors)
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.valid {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// A candidate was rejected before any write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation failed: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

impl ValidationError {
    /// First message, the one a form shows.
    pub fn first(&self) -> &str {
        self.errors.first().map(String::as_str).unwrap_or_default()
    }
}

/// Present and not the empty string.
pub(crate) fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Numeric reading of a loose form value; `None` stands for NaN.
///
/// Blank strings read as zero and booleans as 0/1, the way HTML number
/// inputs coerce them.
pub(crate) fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok().filter(|v| !v.is_nan())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// A filled loose value that is an integer within `min..=max`.
pub(crate) fn loose_integer_in(value: Option<&Value>, min: i64, max: i64) -> Option<i64> {
    if !is_filled(value) {
        return None;
    }
    let v = loose_number(value?)?;
    if v.is_finite() && v.fract() == 0.0 && v >= min as f64 && v <= max as f64 {
        Some(v as i64)
    } else {
        None
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}
