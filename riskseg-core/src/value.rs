//! Scalar Cell Values
//!
//! A cell is a number, a piece of text or missing. `CategoryKey` is the
//! hashable, totally ordered form of a non-missing value used for distinct
//! sets and cross-tabulation; numbers sort before text.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A single dataset cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Finite or infinite number (never NaN)
    Number(f64),
    /// Text value
    Text(String),
    /// Missing / null
    #[default]
    Missing,
}

impl Value {
    /// Build a numeric value, mapping NaN to `Missing`
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Value::Missing
        } else {
            Value::Number(n)
        }
    }

    /// Whether the cell is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric content, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Category key of a non-missing value
    pub fn category_key(&self) -> Option<CategoryKey> {
        match self {
            Value::Number(n) => Some(CategoryKey::Number(NumberKey::new(*n))),
            Value::Text(t) => Some(CategoryKey::Text(t.clone())),
            Value::Missing => None,
        }
    }

    /// Equality used for segmenting: missing never matches anything
    pub fn same_category(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => NumberKey::new(*a) == NumberKey::new(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Convert a JSON scalar; booleans, arrays and objects are unsupported
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Value::Missing),
            serde_json::Value::Number(n) => n.as_f64().map(Value::number),
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(t) => write!(f, "{}", t),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Text(t) => serializer.serialize_str(t),
            Value::Missing => serializer.serialize_none(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// Number usable as a map key: total order, `-0.0 == 0.0`
#[derive(Debug, Clone, Copy)]
pub struct NumberKey(f64);

impl NumberKey {
    fn new(n: f64) -> Self {
        // -0.0 + 0.0 == +0.0
        NumberKey(n + 0.0)
    }

    /// Underlying number
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for NumberKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for NumberKey {}

impl PartialOrd for NumberKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumberKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for NumberKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Hashable, ordered identity of a non-missing value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryKey {
    /// Numeric category
    Number(NumberKey),
    /// Text category
    Text(String),
}

impl CategoryKey {
    /// Convert back into a cell value
    pub fn to_value(&self) -> Value {
        match self {
            CategoryKey::Number(n) => Value::Number(n.get()),
            CategoryKey::Text(t) => Value::Text(t.clone()),
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKey::Number(n) => write!(f, "{}", n.get()),
            CategoryKey::Text(t) => write!(f, "{}", t),
        }
    }
}
