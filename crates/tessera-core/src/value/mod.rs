//! Module: value
//! Responsibility: the closed document value model and its canonical ordering.
//! Does not own: byte-level key encoding (see `db::key`).

mod compare;
mod document;
mod json;
mod tag;

#[cfg(test)]
mod tests;

pub use compare::{canonical_cmp, canonical_cmp_scalar};
pub use document::Document;
pub use tag::ValueTag;

use crate::error::{ErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use thiserror::Error as ThisError;

///
/// ValueError
///
/// Reasons a caller-supplied value cannot be represented in the closed
/// document model.
///

#[derive(Debug, ThisError)]
pub enum ValueError {
    #[error("number is not finite: {0}")]
    NonFiniteNumber(f64),

    #[error("field '{field}' holds a nested object, which is not supported")]
    NestedObject { field: String },

    #[error("field '{field}' holds a nested array, which is not supported")]
    NestedArray { field: String },

    #[error("document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    #[error("field name must not be empty")]
    EmptyFieldName,
}

impl From<ValueError> for InternalError {
    fn from(err: ValueError) -> Self {
        Self::validation(ErrorOrigin::Value, err.to_string())
    }
}

///
/// Number
///
/// Finite IEEE-754 double with `-0.0` folded into `0.0`, so equality,
/// ordering and hashing agree bit-for-bit.
///

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() {
            return Err(ValueError::NonFiniteNumber(value));
        }

        // fold -0.0
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Render the number the way a JavaScript runtime stringifies it.
    ///
    /// Fan-out element hashes are computed over this form, so it must stay
    /// stable across releases.
    #[must_use]
    pub fn to_js_string(self) -> String {
        let value = self.0;
        if value == 0.0 {
            return "0".to_string();
        }

        let magnitude = value.abs();
        if (1e-6..1e21).contains(&magnitude) {
            // Display never uses exponent notation and drops a trailing ".0".
            return format!("{value}");
        }

        let rendered = format!("{value:e}");
        match rendered.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => rendered,
        }
    }
}

impl TryFrom<f64> for Number {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Number> for f64 {
    fn from(value: Number) -> Self {
        value.0
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

///
/// Scalar
///
/// One indexable leaf value.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    /// Build a numeric scalar, rejecting NaN and infinities.
    pub fn number(value: f64) -> Result<Self, ValueError> {
        Number::new(value).map(Self::Number)
    }

    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Null => ValueTag::Null,
            Self::Bool(_) => ValueTag::Bool,
            Self::Number(_) => ValueTag::Number,
            Self::Text(_) => ValueTag::Text,
        }
    }

    /// JavaScript `String(value)` rendering, used as fan-out hash input.
    #[must_use]
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Number(v) => v.to_js_string(),
            Self::Text(v) => v.clone(),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(Number(if value == 0 { 0.0 } else { f64::from(value) }))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Number(Number(f64::from(value)))
    }
}

///
/// FieldValue
///
/// Top-level document field: a scalar or a flat array of scalars.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FieldValue {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

impl FieldValue {
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Scalar(scalar) => scalar.tag(),
            Self::Array(_) => ValueTag::Array,
        }
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Array elements, or `None` for scalar fields.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Scalar]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            Self::Scalar(_) => None,
        }
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            Self::Array(_) => None,
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Vec<Scalar>> for FieldValue {
    fn from(value: Vec<Scalar>) -> Self {
        Self::Array(value)
    }
}
