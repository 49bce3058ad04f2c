use crate::types::opcode::Opcode;

/// The directive syntax configuration.
///
/// Directives are element attributes whose name starts with a reserved
/// prefix. The remainder of the name selects the operator, for example
/// `data-list` or `data-css-class`.
///
/// Use [`Syntax::default()`] to get the default syntax configuration and
/// [`Syntax::builder()`] to create a custom syntax configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    prefix: String,
    format_attr: String,
}

/// A builder for the syntax configuration.
///
/// This struct is typically created using [`Syntax::builder()`].
#[derive(Debug, Clone)]
pub struct SyntaxBuilder<'a> {
    prefix: Option<&'a str>,
}

impl Default for Syntax {
    /// Returns the default syntax configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use weft::Syntax;
    ///
    /// let syntax = Syntax::builder().prefix("data-").build();
    /// assert_eq!(syntax, Syntax::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Syntax::builder().prefix("data-").build()
    }
}

impl Syntax {
    /// Create a new syntax builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let syntax = weft::Syntax::builder().prefix("x-").build();
    /// ```
    #[inline]
    pub fn builder<'a>() -> SyntaxBuilder<'a> {
        SyntaxBuilder::new()
    }

    /// Returns the directive prefix.
    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the name of the attribute that names an element's formatter.
    #[inline]
    pub fn format_attr(&self) -> &str {
        &self.format_attr
    }

    /// Maps an attribute name to the opcode it declares.
    ///
    /// Attributes without the prefix and unknown directive names map to
    /// [`Opcode::None`].
    pub(crate) fn opcode(&self, attr: &str) -> Opcode {
        match attr.strip_prefix(self.prefix.as_str()) {
            Some(name) => Opcode::from_name(name),
            None => Opcode::None,
        }
    }

    /// Returns the attribute name that declares `opcode`.
    pub(crate) fn attr_name(&self, opcode: Opcode) -> String {
        format!("{}{}", self.prefix, opcode.name())
    }
}

impl<'a> SyntaxBuilder<'a> {
    /// Creates a new syntax builder.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Set the directive attribute prefix.
    ///
    /// # Panics
    ///
    /// If the prefix is empty.
    #[inline]
    pub fn prefix(&mut self, prefix: &'a str) -> &mut Self {
        assert!(!prefix.is_empty());
        self.prefix = Some(prefix);
        self
    }

    /// Builds the syntax configuration.
    ///
    /// The prefix defaults to `data-` when it was not set.
    pub fn build(&self) -> Syntax {
        let prefix = self.prefix.unwrap_or("data-").to_owned();
        let format_attr = format!("{prefix}format");
        Syntax {
            prefix,
            format_attr,
        }
    }
}
