//! Defines a clone-on-write [`Value`], used for scopes.

use std::ops::Deref;

use crate::Value;

/// A scope is usually borrowed from the model, but map keys and null scopes
/// are synthesized during the walk and so are owned.
#[derive(Debug, Clone)]
pub enum ValueCow<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

impl Deref for ValueCow<'_> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(v) => v,
            Self::Owned(v) => v,
        }
    }
}

impl<'a> ValueCow<'a> {
    /// A synthesized null scope.
    pub fn null() -> Self {
        Self::Owned(Value::None)
    }

    /// Reborrows this value, cloning only if it is owned.
    pub fn share(&self) -> ValueCow<'a> {
        match self {
            Self::Borrowed(v) => Self::Borrowed(v),
            Self::Owned(v) => Self::Owned(v.clone()),
        }
    }
}
