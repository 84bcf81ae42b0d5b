//! FILENAME: src/record.rs
//! Record access - the structural interface the engine reads input through.
//!
//! The engine does not care whether a record is a map, a struct, or a row
//! from some store; it only needs named-field lookup. Anything that can
//! answer `get(field) -> Option<&FieldValue>` can be grouped.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// ============================================================================
// FIELD VALUES
// ============================================================================

/// A normalized field value as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Truthiness used by field qualification: zero numbers, empty strings,
    /// the literal string "0", `false` and `Empty` are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Empty => false,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => !s.is_empty() && s != "0",
            FieldValue::Boolean(b) => *b,
        }
    }

    /// The numeric reading of this value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Empty => None,
        }
    }

    /// Display label used as a group id part. Whole numbers drop the
    /// fractional suffix so `2023.0` labels as "2023".
    pub fn label(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Text(s) => s.clone(),
            FieldValue::Boolean(b) => {
                if *b {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

// ============================================================================
// RECORD CAPABILITY
// ============================================================================

/// Named-field access over one input record.
pub trait Record {
    /// Returns the value of `field`, or `None` if the record has no such
    /// field. An absent field is distinct from a present `Empty` value only
    /// in principle; the classifier treats both as non-qualifying.
    fn get(&self, field: &str) -> Option<&FieldValue>;
}

impl Record for HashMap<String, FieldValue> {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        HashMap::get(self, field)
    }
}

impl Record for BTreeMap<String, FieldValue> {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        BTreeMap::get(self, field)
    }
}

impl<R: Record> Record for &R {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        (**self).get(field)
    }
}
