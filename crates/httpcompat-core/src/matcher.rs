//! Structural subset matching of JSON values
//!
//! The expected value declares only what matters: objects must contain every
//! expected key (extra keys are fine), arrays must have exactly the expected
//! length and match pairwise, scalars must be equal and of the same kind.
//! `null` in the expected value places no constraint at all.
//!
//! Matching stops at the first divergence, depth-first, in the expected
//! value's key/index order. Diagnostics name the field path (`items[0].id`,
//! empty at the root) and show values in the same quoted form as the other
//! failure messages.

use serde_json::{Number, Value};

use crate::repr::repr_json;

/// Kind of a JSON value, as named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl JsonKind {
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl std::fmt::Display for JsonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a value did not match.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    /// Expected an object or array, found another kind
    Kind { expected: JsonKind, actual: JsonKind },
    /// Expected key absent from the actual object
    Missing,
    /// Arrays of different length
    Length { expected: usize, actual: usize },
    /// Scalars differ
    Value { expected: Value, actual: Value },
}

/// First divergence found, with the field path it occurred at.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Field path, `items[0].id`; empty for the root value
    pub path: String,
    pub reason: MismatchReason,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            MismatchReason::Kind { expected, actual } => {
                write!(f, "{}: expected {expected}, got {actual}", self.path)
            }
            MismatchReason::Missing => write!(f, "{}: missing", self.path),
            MismatchReason::Length { expected, actual } => {
                write!(f, "{}: expected length {expected}, got {actual}", self.path)
            }
            MismatchReason::Value { expected, actual } => write!(
                f,
                "{}: expected {}, got {}",
                self.path,
                repr_json(expected),
                repr_json(actual)
            ),
        }
    }
}

impl std::error::Error for Mismatch {}

/// Check that `actual` contains `expected`.
///
/// # Errors
///
/// Returns the first [`Mismatch`] encountered.
pub fn subset_match(expected: &Value, actual: &Value) -> Result<(), Mismatch> {
    let mut path = String::new();
    match_at(expected, actual, &mut path)
}

fn match_at(expected: &Value, actual: &Value, path: &mut String) -> Result<(), Mismatch> {
    match expected {
        Value::Null => Ok(()),
        Value::Object(exp_obj) => {
            let Value::Object(act_obj) = actual else {
                return Err(kind_mismatch(path, JsonKind::Object, actual));
            };
            for (key, exp_value) in exp_obj {
                let len = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
                let Some(act_value) = act_obj.get(key) else {
                    return Err(Mismatch {
                        path: path.clone(),
                        reason: MismatchReason::Missing,
                    });
                };
                match_at(exp_value, act_value, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        Value::Array(exp_items) => {
            let Value::Array(act_items) = actual else {
                return Err(kind_mismatch(path, JsonKind::Array, actual));
            };
            if exp_items.len() != act_items.len() {
                return Err(Mismatch {
                    path: path.clone(),
                    reason: MismatchReason::Length {
                        expected: exp_items.len(),
                        actual: act_items.len(),
                    },
                });
            }
            for (idx, (exp_item, act_item)) in exp_items.iter().zip(act_items).enumerate() {
                let len = path.len();
                path.push_str(&format!("[{idx}]"));
                match_at(exp_item, act_item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        scalar => {
            if scalars_equal(scalar, actual) {
                Ok(())
            } else {
                Err(Mismatch {
                    path: path.clone(),
                    reason: MismatchReason::Value {
                        expected: scalar.clone(),
                        actual: actual.clone(),
                    },
                })
            }
        }
    }
}

fn kind_mismatch(path: &str, expected: JsonKind, actual: &Value) -> Mismatch {
    Mismatch {
        path: path.to_string(),
        reason: MismatchReason::Kind {
            expected,
            actual: JsonKind::of(actual),
        },
    }
}

/// Full structural equality: same shape, same keys, same length, equal
/// scalars. Unlike [`subset_match`], extra keys and `null` are significant.
/// Numbers compare by value, so `1` equals `1.0`.
#[must_use]
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_equal(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| json_equal(v, w))
        }
        (Value::Null, Value::Null) => true,
        _ => scalars_equal(a, b),
    }
}

/// Scalar equality: same kind required; numbers compare by value.
fn scalars_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(e), Value::Number(a)) => numbers_equal(e, a),
        (Value::String(e), Value::String(a)) => e == a,
        (Value::Bool(e), Value::Bool(a)) => e == a,
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        a.as_f64() == b.as_f64()
    } else {
        a == b
    }
}
