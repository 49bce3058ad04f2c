//! Defines the [`Value`] enum, the model graph injected into a tree.

mod cow;
mod from;
#[cfg(feature = "serde")]
mod ser;

pub use std::collections::btree_map;
pub use std::collections::BTreeMap as Map;
use std::fmt::Write;
use std::mem;
pub use std::vec::Vec as List;

pub(crate) use crate::value::cow::ValueCow;
#[cfg(feature = "serde")]
pub use crate::value::ser::to_value;

/// Model data represented as a recursive enum.
///
/// `Value::None` is the *null* value: a property that exists but holds no
/// value. A key that is missing from a [`Value::Map`] is *undefined* and is
/// reported as a content error when a directive tries to read it.
#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List<Value>),
    Map(Map<String, Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Value {
    /// Returns a human readable name for the type of this value.
    pub(crate) fn human(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether this value is null.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Whether property paths can be resolved relative to this value.
    pub(crate) fn is_composite(&self) -> bool {
        matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Returns true for null, the empty string and empty collections.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::None => true,
            Value::String(s) => s.is_empty(),
            Value::List(list) => list.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) => false,
        }
    }

    /// Returns the string form of a primitive value.
    ///
    /// Null and composite values have no string form.
    pub(crate) fn to_plain_string(&self) -> Option<String> {
        let mut s = String::new();
        match self {
            Value::Bool(b) => write!(s, "{b}").ok()?,
            Value::Integer(n) => write!(s, "{n}").ok()?,
            Value::Float(n) => write!(s, "{n}").ok()?,
            Value::String(string) => s.push_str(string),
            Value::None | Value::List(_) | Value::Map(_) => return None,
        }
        Some(s)
    }
}
