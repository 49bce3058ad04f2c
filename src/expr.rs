//! Conditional expressions and `name:value` operand lists.
//!
//! ```text
//! expression = statement *( ";" statement )
//! statement  = [ "!" ] path [ op operand ]
//! op         = "=" / "<" / ">"
//! ```
//!
//! Statements are AND-ed together, evaluation stops at the first false one.
//! An undefined path evaluates as null before negation, its content error is
//! handed back to the caller.

use crate::content::Content;
use crate::types::span::Span;
use crate::value::ValueCow;
use crate::{Error, ErrorKind, Result, Value};

/// A parsed conditional expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expr<'o> {
    statements: Vec<Statement<'o>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Statement<'o> {
    not: bool,
    path: &'o str,
    op: Op<'o>,
}

#[derive(Debug, Clone, PartialEq)]
enum Op<'o> {
    NotEmpty,
    Equals(&'o str),
    LessThan(f64),
    GreaterThan(f64),
}

impl<'o> Expr<'o> {
    /// Parses `source`, reporting syntax errors against `operand`.
    ///
    /// `offset` is the position of `source` within `operand`.
    pub fn parse(operand: &str, source: &'o str, offset: usize) -> Result<Self> {
        let mut statements = Vec::new();
        let mut start = 0;
        for (i, part) in source.split(';').enumerate() {
            if part.is_empty() && i > 0 && start == source.len() {
                // trailing separator
                break;
            }
            let span = Span::from(start..start + part.len()).offset(offset);
            statements.push(Statement::parse(operand, part, span)?);
            start += part.len() + 1;
        }
        Ok(Self { statements })
    }

    /// Evaluates the expression against `scope`.
    ///
    /// Content errors for undefined paths are pushed to `undefined`.
    pub fn evaluate(
        &self,
        content: &Content<'_>,
        scope: &ValueCow<'_>,
        undefined: &mut Vec<Error>,
    ) -> Result<bool> {
        for statement in &self.statements {
            if !statement.evaluate(content, scope, undefined)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<'o> Statement<'o> {
    fn parse(operand: &str, source: &'o str, span: Span) -> Result<Self> {
        let (not, rest, mut pos) = match source.strip_prefix('!') {
            Some(rest) => (true, rest, 1),
            None => (false, source, 0),
        };
        let path_len = rest
            .char_indices()
            .find(|(_, c)| !is_path_char(*c))
            .map_or(rest.len(), |(i, _)| i);
        let path = &rest[..path_len];
        if path.is_empty() {
            let m = span.m + pos;
            return Err(Error::syntax("expected property path", operand, char_at(operand, m)));
        }
        pos += path_len;
        let tail = &rest[path_len..];
        let mut chars = tail.chars();
        let op = match chars.next() {
            None => Op::NotEmpty,
            Some(c) => {
                let lit = chars.as_str();
                let lit_span = (span.m + pos + 1)..(span.m + pos + 1 + lit.len());
                if lit.is_empty() && matches!(c, '=' | '<' | '>') {
                    let m = span.m + pos;
                    return Err(Error::syntax("missing operand", operand, m..m + 1));
                }
                match c {
                    '=' => Op::Equals(lit),
                    '<' => Op::LessThan(parse_number(operand, lit, lit_span)?),
                    '>' => Op::GreaterThan(parse_number(operand, lit, lit_span)?),
                    c => {
                        let m = span.m + pos;
                        return Err(Error::syntax(
                            "expected one of `=`, `<`, `>` or `;`",
                            operand,
                            m..m + c.len_utf8(),
                        ));
                    }
                }
            }
        };
        Ok(Self { not, path, op })
    }

    fn evaluate(
        &self,
        content: &Content<'_>,
        scope: &ValueCow<'_>,
        undefined: &mut Vec<Error>,
    ) -> Result<bool> {
        let value = match content.get_value(scope, self.path) {
            Ok(value) => value,
            Err(err) if err.kind() == ErrorKind::Content => {
                undefined.push(err);
                ValueCow::null()
            }
            Err(err) => return Err(err),
        };
        let result = match (&self.op, &*value) {
            (_, Value::None) => false,
            (Op::NotEmpty, value) => is_truthy(value),
            (Op::Equals(lit), value) => value.to_plain_string().as_deref() == Some(*lit),
            (Op::LessThan(n), value) => as_number(value).map_or(false, |v| v < *n),
            (Op::GreaterThan(n), value) => as_number(value).map_or(false, |v| v > *n),
        };
        Ok(result != self.not)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Float(n) => *n != 0.0 && !n.is_nan(),
        value => !value.is_empty(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

fn parse_number(operand: &str, lit: &str, span: std::ops::Range<usize>) -> Result<f64> {
    lit.parse()
        .map_err(|_| Error::syntax("expected a number", operand, span))
}

/// The span of the character starting at byte `m`, empty at the end.
fn char_at(operand: &str, m: usize) -> std::ops::Range<usize> {
    let len = operand
        .get(m..)
        .and_then(|s| s.chars().next())
        .map_or(0, char::len_utf8);
    m..m + len
}

fn is_path_char(c: char) -> bool {
    c == '.' || c == '$' || c == '-' || c == '_' || c.is_alphanumeric()
}

/// One `name:value` clause of an operand list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pair<'o> {
    pub name: &'o str,
    pub value: Option<&'o str>,
    /// Position of `name` within the operand.
    pub offset: usize,
}

/// Parses a `;` separated list of `name:value` clauses.
///
/// Whitespace around names and values is ignored. The value is optional, an
/// empty value after a colon is an error.
pub(crate) fn name_values(operand: &str) -> Result<Vec<Pair<'_>>> {
    let mut pairs = Vec::new();
    let mut start = 0;
    for clause in operand.split(';') {
        let offset = start;
        start += clause.len() + 1;
        if clause.trim().is_empty() {
            if start > operand.len() {
                // trailing separator
                break;
            }
            return Err(Error::syntax("empty clause", operand, char_at(operand, offset)));
        }
        let lead = clause.len() - clause.trim_start().len();
        let pair = match clause.split_once(':') {
            Some((name, value)) => {
                let value = value.trim();
                if value.is_empty() {
                    let m = offset + name.len();
                    return Err(Error::syntax("empty value", operand, m..m + 1));
                }
                Pair {
                    name: name.trim(),
                    value: Some(value),
                    offset: offset + lead,
                }
            }
            None => Pair {
                name: clause.trim(),
                value: None,
                offset: offset + lead,
            },
        };
        if pair.name.is_empty() {
            return Err(Error::syntax("empty name", operand, char_at(operand, offset)));
        }
        pairs.push(pair);
    }
    if pairs.is_empty() {
        return Err(Error::assertion("empty operand"));
    }
    Ok(pairs)
}
