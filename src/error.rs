use std::cmp::max;
use std::fmt;

use crate::types::span::Span;

/// The class of an [`Error`].
///
/// The kind decides how the walk treats the error at the operator boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A property path reached an undefined property or a value of the wrong
    /// type. Recoverable: the affected construct is cleared and the render
    /// continues.
    Content,

    /// A template authoring bug such as a malformed operand, an operator on
    /// the wrong element or missing item templates. Aborts the render.
    Assertion,

    /// Anything else, for example a formatter failure or a numbering directive
    /// without an ordered ancestor. Reported to the engine's error sink; the
    /// failing branch is abandoned.
    Other,
}

/// An error that can occur while injecting a model into a tree.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
    context: Option<Context>,
}

/// Where in the tree an error was raised.
#[derive(Debug, Clone)]
struct Context {
    operator: &'static str,
    element: String,
    operand: String,
}

impl Error {
    /// Construct a new error of kind [`ErrorKind::Other`].
    ///
    /// This is useful for [`Format`][crate::Format] implementations.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Other, msg)
    }

    pub(crate) fn content(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Content, msg)
    }

    pub(crate) fn assertion(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Assertion, msg)
    }

    /// An assertion error pointing into an operand.
    pub(crate) fn syntax(msg: impl Into<String>, operand: &str, span: impl Into<Span>) -> Self {
        let mut err = Self::assertion(msg);
        err.span = Some((operand.to_owned(), span.into()));
        err
    }

    fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: None,
            context: None,
        }
    }

    /// Attach the operator, element and operand the error was raised for.
    ///
    /// The innermost context wins.
    pub(crate) fn with_context(mut self, operator: &'static str, element: String, operand: &str) -> Self {
        if self.context.is_none() {
            self.context = Some(Context {
                operator,
                element,
                operand: operand.to_owned(),
            });
        }
        self
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message without any context.
    #[inline]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the name of the operator that raised this error, if any.
    #[inline]
    pub fn operator(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.operator)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::new(msg.to_string())
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f)?,
            None => write!(f, "{:?}: {}", self.kind, self.msg)?,
        }
        self.fmt_context(f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) if f.alternate() => fmt_pretty(&self.msg, source, *span, f)?,
            Some((_, span)) => write!(f, "{} between bytes {} and {}", self.msg, span.m, span.n)?,
            None => write!(f, "{}", self.msg)?,
        }
        self.fmt_context(f)
    }
}

impl Error {
    fn fmt_context(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(Context {
                operator,
                element,
                operand,
            }) => write!(f, " (operator `{operator}` on {element} with operand `{operand}`)"),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let col = width(&source[..span.m]);
    let underline_width = max(1, width(&source[span]));
    let underline = "^".repeat(underline_width);
    write!(
        f,
        "\n  |\n  | {source}\n  | {underline:>w$} {msg}\n",
        w = col + underline_width,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_plain() {
        let err = Error::content("property `nmae` is undefined");
        assert_eq!(err.to_string(), "property `nmae` is undefined");
        assert_eq!(err.kind(), ErrorKind::Content);
    }

    #[test]
    fn error_display_span() {
        let err = Error::syntax("unexpected character", "flag?", 4..5);
        assert_eq!(err.to_string(), "unexpected character between bytes 4 and 5");
        assert_eq!(
            format!("{err:#}"),
            "\n  |\n  | flag?\n  |     ^ unexpected character\n"
        );
    }

    #[test]
    fn error_display_context() {
        let err = Error::content("property `x` is undefined")
            .with_context("text", "<li>".into(), "x")
            .with_context("list", "<ul>".into(), "items");
        assert_eq!(
            err.to_string(),
            "property `x` is undefined (operator `text` on <li> with operand `x`)"
        );
        assert_eq!(err.operator(), Some("text"));
    }
}
