//! Resolves property paths against the model.
//!
//! A path is either `.`, the scope itself, or dot separated segments. A path
//! that starts with a dot is absolute and is resolved from the model root,
//! any other path is resolved relative to the scope. Numeric segments index
//! into lists and hyphenated segments fall back to their camel case form.
//!
//! Resolution distinguishes null from undefined: reaching a null value stops
//! and yields null, reaching a missing property is a content error.

use std::slice;

use crate::types::span::Span;
use crate::value::{btree_map, List, ValueCow};
use crate::{Error, Result, Value};

/// Property path resolver bound to one model.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Content<'m> {
    model: &'m Value,
}

impl<'m> Content<'m> {
    pub fn new(model: &'m Value) -> Self {
        Self { model }
    }

    /// Resolves `path` against `scope`.
    pub fn get_value<'a>(&self, scope: &ValueCow<'a>, path: &str) -> Result<ValueCow<'a>>
    where
        'm: 'a,
    {
        if path == "." {
            return Ok(scope.share());
        }
        if let Some(rest) = path.strip_prefix('.') {
            validate(path, rest, 1)?;
            return lookup_path(self.model, rest).map(ValueCow::Borrowed);
        }
        validate(path, path, 0)?;
        if !scope.is_composite() {
            return Err(Error::assertion(format!(
                "cannot resolve relative path `{path}` against {} scope",
                scope.human()
            )));
        }
        match scope {
            // If the scope is borrowed we can return a reference into it.
            &ValueCow::Borrowed(v) => lookup_path(v, path).map(ValueCow::Borrowed),
            // Otherwise only clone the edge value.
            ValueCow::Owned(v) => lookup_path(v, path).map(|v| ValueCow::Owned(v.clone())),
        }
    }

    /// Resolves `path` to a list and returns an iterator over its items.
    ///
    /// A null value yields no items.
    pub fn get_iterable<'a>(&self, scope: &ValueCow<'a>, path: &str) -> Result<Items<'a>>
    where
        'm: 'a,
    {
        match self.get_value(scope, path)? {
            ValueCow::Borrowed(Value::List(list)) => Ok(Items::Borrowed(list.iter())),
            ValueCow::Owned(Value::List(list)) => Ok(Items::Owned(list.into_iter())),
            value if value.is_none() => {
                tracing::warn!(path, "null content value, iterating nothing");
                Ok(Items::Owned(List::new().into_iter()))
            }
            value => Err(Error::content(format!(
                "expected list, but `{path}` evaluated to {}",
                value.human()
            ))),
        }
    }

    /// Resolves `path` to a map and returns an iterator over its entries.
    ///
    /// A null value yields no entries.
    pub fn get_map<'a>(&self, scope: &ValueCow<'a>, path: &str) -> Result<Entries<'a>>
    where
        'm: 'a,
    {
        match self.get_value(scope, path)? {
            ValueCow::Borrowed(Value::Map(map)) => Ok(Entries::Borrowed(map.iter())),
            ValueCow::Owned(Value::Map(map)) => Ok(Entries::Owned(map.into_iter())),
            value if value.is_none() => {
                tracing::warn!(path, "null content value, iterating nothing");
                Ok(Entries::Owned(btree_map::BTreeMap::new().into_iter()))
            }
            value => Err(Error::content(format!(
                "expected map, but `{path}` evaluated to {}",
                value.human()
            ))),
        }
    }
}

/// Items of a list resolved by [`Content::get_iterable`].
pub(crate) enum Items<'a> {
    Borrowed(slice::Iter<'a, Value>),
    Owned(std::vec::IntoIter<Value>),
}

impl<'a> Iterator for Items<'a> {
    type Item = ValueCow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Borrowed(iter) => iter.next().map(ValueCow::Borrowed),
            Self::Owned(iter) => iter.next().map(ValueCow::Owned),
        }
    }
}

/// Key value pairs of a map resolved by [`Content::get_map`].
pub(crate) enum Entries<'a> {
    Borrowed(btree_map::Iter<'a, String, Value>),
    Owned(btree_map::IntoIter<String, Value>),
}

impl<'a> Iterator for Entries<'a> {
    type Item = (ValueCow<'a>, ValueCow<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Borrowed(iter) => iter
                .next()
                .map(|(k, v)| (ValueCow::Owned(Value::String(k.clone())), ValueCow::Borrowed(v))),
            Self::Owned(iter) => iter
                .next()
                .map(|(k, v)| (ValueCow::Owned(Value::String(k)), ValueCow::Owned(v))),
        }
    }
}

/// Walks `path` starting at `value`, which must be composite.
fn lookup_path<'v>(value: &'v Value, path: &str) -> Result<&'v Value> {
    let mut v = value;
    for segment in path.split('.') {
        if v.is_none() {
            return Ok(v);
        }
        v = lookup(v, segment)?;
    }
    Ok(v)
}

fn lookup<'v>(value: &'v Value, segment: &str) -> Result<&'v Value> {
    match value {
        Value::Map(map) => map
            .get(segment)
            .or_else(|| {
                segment
                    .contains('-')
                    .then(|| to_script_case(segment))
                    .and_then(|key| map.get(&key))
            })
            .ok_or_else(|| Error::content(format!("undefined property `{segment}`"))),
        Value::List(list) => match segment.parse::<usize>() {
            Ok(i) => list.get(i).ok_or_else(|| {
                Error::content(format!(
                    "index `{i}` is out of range for list of length {}",
                    list.len()
                ))
            }),
            Err(_) => Err(Error::content(format!(
                "undefined property `{segment}` on list"
            ))),
        },
        value => Err(Error::content(format!(
            "cannot read property `{segment}` of {}",
            value.human()
        ))),
    }
}

/// Checks every segment of `path` for valid characters.
///
/// `offset` is the position of `path` within `operand` and is only used for
/// the error span.
fn validate(operand: &str, path: &str, offset: usize) -> Result<()> {
    let mut start = 0;
    for segment in path.split('.') {
        let span = Span::from(start..start + segment.len()).offset(offset);
        if segment.is_empty() {
            let span = clamp(Span::from(span.m..span.m + 1), operand.len());
            return Err(Error::syntax("empty property path segment", operand, span));
        }
        if let Some((i, c)) = segment.char_indices().find(|(_, c)| !is_path_char(*c)) {
            let m = span.m + i;
            return Err(Error::syntax(
                "invalid character in property path",
                operand,
                m..m + c.len_utf8(),
            ));
        }
        start += segment.len() + 1;
    }
    Ok(())
}

fn clamp(span: Span, len: usize) -> Span {
    if span.n > len {
        Span::from(len.saturating_sub(1)..len)
    } else {
        span
    }
}

#[cfg(feature = "unicode")]
fn is_path_char(c: char) -> bool {
    unicode_ident::is_xid_continue(c) || c == '$' || c == '-'
}

#[cfg(not(feature = "unicode"))]
fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-')
}

/// Converts a hyphenated name to camel case, `first-name` to `firstName`.
pub(crate) fn to_script_case(name: &str) -> String {
    let mut s = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            s.extend(c.to_uppercase());
            upper = false;
        } else {
            s.push(c);
        }
    }
    s
}
