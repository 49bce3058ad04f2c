//! Numbering formats for ordered lists and maps.
//!
//! A format is literal text with `%<code>` placeholders. The last placeholder
//! is the innermost ordered construct, the one before it the next enclosing
//! construct and so on.

use crate::render::index::IndexStack;
use crate::{Error, Result};

/// A parsed numbering format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Numbering<'a> {
    parts: Vec<Part<'a>>,
    placeholders: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part<'a> {
    Literal(&'a str),
    Placeholder(Code),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code {
    /// `%n`: 1, 2, 3
    Arabic,
    /// `%s`: a, b, c
    LowerLetter,
    /// `%S`: A, B, C
    UpperLetter,
    /// `%i`: i, ii, iii
    LowerRoman,
    /// `%I`: I, II, III
    UpperRoman,
}

const ROMAN: [(usize, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

impl<'a> Numbering<'a> {
    pub fn parse(format: &'a str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut placeholders = 0;
        let mut rest = format;
        let mut pos = 0;
        while let Some(i) = rest.find('%') {
            if i > 0 {
                parts.push(Part::Literal(&rest[..i]));
            }
            let at = pos + i;
            let code = match rest[i + 1..].chars().next() {
                Some('n') => Code::Arabic,
                Some('s') => Code::LowerLetter,
                Some('S') => Code::UpperLetter,
                Some('i') => Code::LowerRoman,
                Some('I') => Code::UpperRoman,
                Some(c) => {
                    return Err(Error::syntax(
                        "invalid numbering code, expected one of `n`, `s`, `S`, `i`, `I`",
                        format,
                        at..at + 1 + c.len_utf8(),
                    ));
                }
                None => {
                    return Err(Error::syntax("missing numbering code", format, at..at + 1));
                }
            };
            parts.push(Part::Placeholder(code));
            placeholders += 1;
            rest = &rest[i + 2..];
            pos = at + 2;
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest));
        }
        Ok(Self {
            parts,
            placeholders,
        })
    }

    /// Renders the format using the current values of the index stack.
    pub fn format(&self, indexes: &IndexStack) -> Result<String> {
        if indexes.is_empty() {
            return Err(Error::new(
                "numbering requires an enclosing ordered list or map",
            ));
        }
        if self.placeholders > indexes.len() {
            return Err(Error::new(format!(
                "numbering has {} placeholders but only {} enclosing ordered constructs",
                self.placeholders,
                indexes.len()
            )));
        }
        let mut s = String::new();
        let mut nth = self.placeholders;
        for part in &self.parts {
            match part {
                Part::Literal(text) => s.push_str(text),
                Part::Placeholder(code) => {
                    nth -= 1;
                    // checked against the stack length above
                    let value = indexes.nth_from_top(nth).unwrap_or_default();
                    s.push_str(&code.format(value));
                }
            }
        }
        Ok(s)
    }
}

impl Code {
    fn format(self, value: usize) -> String {
        match self {
            Self::Arabic => value.to_string(),
            Self::UpperLetter => letters(value),
            Self::LowerLetter => letters(value).to_lowercase(),
            Self::UpperRoman => roman(value),
            Self::LowerRoman => roman(value).to_lowercase(),
        }
    }
}

/// 1 is `A`, 26 is `Z`, 27 is `AA`, 28 is `BB`.
fn letters(value: usize) -> String {
    if value == 0 {
        return String::new();
    }
    let count = (value - 1) / 26 + 1;
    // `value - 1` modulo 26 always fits in a u8
    let letter = char::from(b'A' + ((value - 1) % 26) as u8);
    std::iter::repeat(letter).take(count).collect()
}

fn roman(mut value: usize) -> String {
    let mut s = String::new();
    for (n, numeral) in ROMAN {
        while value >= n {
            s.push_str(numeral);
            value -= n;
        }
    }
    s
}
