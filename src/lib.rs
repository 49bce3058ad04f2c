//! A declarative tree templating engine.
//!
//! Templates are ordinary element trees whose elements carry directives,
//! attributes with a reserved prefix such as `data-text` or `data-list`. The
//! engine walks the tree depth first and injects a model into it, expanding
//! lists and maps, setting text and attributes and hiding excluded branches.
//! The same tree can be injected again with a new model.
//!
//! # Features
//!
//! ### Directives
//!
//! - Content: `data-text="user.name"`, `data-html="bio"`,
//!   `data-object="user"`, `data-options="fruits"`
//! - Iteration: `data-list="users"`, `data-map="prices"` and the ordered
//!   `data-olist`, `data-omap` together with `data-numbering="%n.%s)"`
//! - Attributes: `data-attr="href:url; title:name"`, `data-id`, `data-src`,
//!   `data-href`, `data-title`, `data-value`
//! - Classes: `data-css-class="done:finished; !kind"`
//! - Conditionals: `data-if="count>0; !hidden"`, `data-exclude="true"`
//! - Jumps over directive free branches: `data-goto="target-id"`
//!
//! ### Engine
//!
//! - Works on any tree implementing [`Tree`], with an in-memory
//!   [`dom::Document`] included
//! - Inject any [`serde`] serializable model
//! - Named value formatters: `data-format="currency"`
//! - Configurable directive prefix
//! - Broken bindings degrade to cleared content and are reported as
//!   diagnostics, malformed templates abort with a helpful error
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the directive
//! syntax, the value formatters and the error sink. Generally, you only need
//! to construct one engine during the lifetime of a program.
//!
//! ```
//! let engine = weft::Engine::new();
//! ```
//!
//! Next, [`.template`][Engine::template] binds a template to the root element
//! of a tree. The template owns the state that is kept between injections,
//! for example the item templates extracted from lists.
//!
//! ```
//! use weft::dom::Document;
//!
//! let mut doc = Document::parse(r#"<ul data-list="persons"><li data-text="name"/></ul>"#)?;
//! let engine = weft::Engine::new();
//! let mut template = engine.template::<Document>(doc.root());
//! # Ok::<(), weft::Error>(())
//! ```
//!
//! Finally, the model is injected using
//! [`.inject_from`][Template::inject_from] or, with the `serde` feature,
//! [`.inject`][Template::inject].
//!
//! ```
//! # use weft::dom::Document;
//! # let mut doc = Document::parse(r#"<ul data-list="persons"><li data-text="name"/></ul>"#)?;
//! # let engine = weft::Engine::new();
//! # let mut template = engine.template::<Document>(doc.root());
//! let model = weft::value! { persons: [{ name: "Ann" }, { name: "Bob" }] };
//! let diagnostics = template.inject_from(&mut doc, &model)?;
//! assert!(diagnostics.is_empty());
//! assert_eq!(
//!     doc.to_string(),
//!     r#"<ul data-list="persons"><li data-text="name">Ann</li><li data-text="name">Bob</li></ul>"#
//! );
//! # Ok::<(), weft::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Inject structured data
//!
//! ```
//! use weft::dom::Document;
//!
//! #[derive(serde::Serialize)]
//! struct Order { lines: Vec<Line> }
//!
//! #[derive(serde::Serialize)]
//! struct Line { product: String, qty: u32 }
//!
//! let order = Order {
//!     lines: vec![
//!         Line { product: "Apple".into(), qty: 3 },
//!         Line { product: "Pear".into(), qty: 1 },
//!     ],
//! };
//!
//! let mut doc = Document::parse(
//!     r#"<ol data-olist="lines"><li><b data-numbering="%n."/><span data-text="product"/></li></ol>"#,
//! )?;
//! let engine = weft::Engine::new();
//! engine.template(doc.root()).inject(&mut doc, &order)?;
//! assert_eq!(
//!     doc.to_string(),
//!     concat!(
//!         r#"<ol data-olist="lines">"#,
//!         r#"<li><b data-numbering="%n.">1.</b><span data-text="product">Apple</span></li>"#,
//!         r#"<li><b data-numbering="%n.">2.</b><span data-text="product">Pear</span></li>"#,
//!         r#"</ol>"#,
//!     )
//! );
//! # Ok::<(), weft::Error>(())
//! ```
//!
//! ### Recoverable content errors
//!
//! A path that names a missing property is a content error. The affected
//! construct is cleared, the walk continues and the error is returned as a
//! diagnostic. A null value clears the construct without a diagnostic.
//!
//! ```
//! use weft::dom::Document;
//! use weft::ErrorKind;
//!
//! let mut doc = Document::parse(r#"<p><b data-text="nmae"/><i data-text="note"/></p>"#)?;
//! let engine = weft::Engine::new();
//! let diagnostics = engine
//!     .template(doc.root())
//!     .inject_from(&mut doc, &weft::value! { name: "Ann", note: None })?;
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].kind(), ErrorKind::Content);
//! assert_eq!(doc.to_string(), r#"<p><b data-text="nmae"/><i data-text="note"/></p>"#);
//! # Ok::<(), weft::Error>(())
//! ```
//!
//! ### Use a custom directive prefix
//!
//! ```
//! use weft::dom::Document;
//!
//! let syntax = weft::Syntax::builder().prefix("x-").build();
//! let engine = weft::Engine::with_syntax(syntax);
//!
//! let mut doc = Document::parse(r#"<p x-text="greeting"/>"#)?;
//! engine
//!     .template(doc.root())
//!     .inject_from(&mut doc, &weft::value! { greeting: "Hello" })?;
//! assert_eq!(doc.to_string(), r#"<p x-text="greeting">Hello</p>"#);
//! # Ok::<(), weft::Error>(())
//! ```
//!
//! ### Add and use a value formatter
//!
//! ```
//! use weft::dom::Document;
//! use weft::{Error, Format, Result, Value};
//!
//! struct Cents;
//!
//! impl Format for Cents {
//!     fn format(&self, value: &Value) -> Result<String> {
//!         match value {
//!             Value::Integer(n) => Ok(format!("{}.{:02}", n / 100, n % 100)),
//!             _ => Err(Error::new("expected an amount in cents")),
//!         }
//!     }
//!
//!     fn parse(&self, text: &str) -> Result<Value> {
//!         let (units, cents) = text.split_once('.').ok_or_else(|| Error::new("expected `units.cents`"))?;
//!         let units: i64 = units.parse().map_err(|_| Error::new("invalid units"))?;
//!         let cents: i64 = cents.parse().map_err(|_| Error::new("invalid cents"))?;
//!         Ok(Value::Integer(units * 100 + cents))
//!     }
//! }
//!
//! let mut engine = weft::Engine::new();
//! engine.add_format("cents", Cents);
//!
//! let mut doc = Document::parse(r#"<span data-text="price" data-format="cents"/>"#)?;
//! engine
//!     .template(doc.root())
//!     .inject_from(&mut doc, &weft::value! { price: 1250 })?;
//! assert_eq!(doc.to_string(), r#"<span data-text="price" data-format="cents">12.50</span>"#);
//! # Ok::<(), weft::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod content;
pub mod dom;
mod error;
mod expr;
mod macros;
mod numbering;
mod render;
mod tree;
mod types;
mod value;

use std::collections::BTreeMap;
use std::fmt;

pub use crate::error::{Error, ErrorKind};
pub use crate::tree::Tree;
pub use crate::types::syntax::{Syntax, SyntaxBuilder};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{List, Map, Value};

use crate::render::cache::Cache;
use crate::render::index::IndexStack;
use crate::render::ops::OperatorFactory;
use crate::render::Walker;
use crate::value::ValueCow;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The default maximum walk depth.
const DEFAULT_MAX_DEPTH: usize = 256;

/// An error sink function or closure.
type ErrorSink = dyn Fn(&Error) + Send + Sync + 'static;

/// The injection engine.
pub struct Engine {
    syntax: Syntax,
    formats: BTreeMap<String, Box<dyn Format>>,
    error_sink: Box<ErrorSink>,
    max_depth: usize,
}

/// A value formatter, selected per element with the `format` attribute.
///
/// # Examples
///
/// ```
/// use weft::{Error, Format, Result, Value};
///
/// struct Upper;
///
/// impl Format for Upper {
///     fn format(&self, value: &Value) -> Result<String> {
///         match value {
///             Value::String(s) => Ok(s.to_uppercase()),
///             _ => Err(Error::new("expected a string")),
///         }
///     }
///
///     fn parse(&self, text: &str) -> Result<Value> {
///         Ok(Value::from(text.to_lowercase()))
///     }
/// }
///
/// assert!(Upper.test("anything"));
/// ```
pub trait Format: Send + Sync {
    /// Formats a model value for display.
    fn format(&self, value: &Value) -> Result<String>;

    /// Parses displayed text back into a model value.
    fn parse(&self, text: &str) -> Result<Value>;

    /// Returns whether `text` can be parsed.
    fn test(&self, text: &str) -> bool {
        self.parse(text).is_ok()
    }
}

/// A template bound to the root element of a tree.
///
/// The template keeps the list and map item templates it extracted and reuses
/// them on every injection, so a template must always be used with the same
/// tree.
pub struct Template<'engine, T: Tree> {
    engine: &'engine Engine,
    root: T::Node,
    cache: Cache<T::Node>,
    indexes: IndexStack,
    operators: OperatorFactory,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine.
    #[inline]
    pub fn new() -> Self {
        Self::with_syntax(Syntax::default())
    }

    /// Construct a new engine with custom syntax.
    ///
    /// # Examples
    ///
    /// ```
    /// use weft::{Engine, Syntax};
    ///
    /// let syntax = Syntax::builder().prefix("tpl-").build();
    /// let engine = Engine::with_syntax(syntax);
    /// ```
    #[inline]
    pub fn with_syntax(syntax: Syntax) -> Self {
        Self {
            syntax,
            formats: BTreeMap::new(),
            error_sink: Box::new(|err| tracing::error!("{err}")),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Returns the directive syntax.
    #[inline]
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Add a new value formatter to the engine.
    ///
    /// A formatter with the same name is replaced.
    #[inline]
    pub fn add_format<F>(&mut self, name: impl Into<String>, format: F)
    where
        F: Format + 'static,
    {
        self.formats.insert(name.into(), Box::new(format));
    }

    /// Lookup a value formatter by name.
    #[inline]
    pub fn get_format(&self, name: &str) -> Option<&dyn Format> {
        self.formats.get(name).map(|f| &**f)
    }

    /// Set the function that receives errors that are neither content errors
    /// nor assertions, for example formatter failures.
    ///
    /// The default sink logs the error with [`tracing::error!`].
    #[inline]
    pub fn set_error_sink<F>(&mut self, f: F)
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.error_sink = Box::new(f);
    }

    /// Set the maximum depth of the walk.
    ///
    /// Exceeding it aborts the injection, which catches cyclic jumps.
    ///
    /// Defaults to 256.
    #[inline]
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth;
    }

    /// Bind a template to the root element of a tree.
    #[inline]
    pub fn template<T: Tree>(&self, root: T::Node) -> Template<'_, T> {
        Template {
            engine: self,
            root,
            cache: Cache::new(),
            indexes: IndexStack::new(),
            operators: OperatorFactory::new(),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("syntax", &self.syntax)
            .field("formats", &self.formats.keys())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl<'engine, T: Tree> Template<'engine, T> {
    /// Inject the provided model into the tree.
    ///
    /// Returns the recoverable errors raised during the walk, an `Err` means
    /// the template itself is broken and the walk was aborted.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn inject<S>(&mut self, tree: &mut T, model: S) -> Result<Vec<Error>>
    where
        S: serde::Serialize,
    {
        let model = to_value(model)?;
        self.inject_from(tree, &model)
    }

    /// Inject the provided value into the tree.
    ///
    /// See [`.inject`][Template::inject] for the returned diagnostics.
    pub fn inject_from(&mut self, tree: &mut T, model: &Value) -> Result<Vec<Error>> {
        if model.is_none() {
            return Err(Error::assertion("cannot inject a null model"));
        }
        let root = self.root;
        self.walk(tree, root, model)
    }

    /// Inject a value into one element of the tree and its descendants.
    ///
    /// The value is both the model and the scope of the element. The content
    /// directive of the element, `data-object` if it has none, receives the
    /// value itself, so a `data-list` element is injected with a list. Text,
    /// html and numbering elements cannot receive a subtree injection. A null
    /// value resets the element instead.
    pub fn inject_element(
        &mut self,
        tree: &mut T,
        element: T::Node,
        value: &Value,
    ) -> Result<Vec<Error>> {
        if value.is_none() {
            self.reset_element(tree, element)?;
            return Ok(Vec::new());
        }
        self.indexes.clear();
        let mut walker = Walker::new(
            self.engine,
            tree,
            value,
            &mut self.cache,
            &mut self.indexes,
            &self.operators,
        );
        walker.walk_subtree(element, &ValueCow::Borrowed(value))?;
        Ok(walker.into_diagnostics())
    }

    /// Restore the tree to its declarative state.
    ///
    /// Injected text, attributes, classes and list items are removed and
    /// excluded elements are shown again.
    pub fn reset(&mut self, tree: &mut T) -> Result<()> {
        let root = self.root;
        self.reset_element(tree, root)
    }

    /// Restore one element and its descendants to their declarative state.
    pub fn reset_element(&mut self, tree: &mut T, element: T::Node) -> Result<()> {
        self.indexes.clear();
        Walker::resetting(
            self.engine,
            tree,
            &mut self.cache,
            &mut self.indexes,
            &self.operators,
        )
        .reset(element)
    }

    /// Returns the root element of this template.
    #[inline]
    pub fn root(&self) -> T::Node {
        self.root
    }

    fn walk(&mut self, tree: &mut T, node: T::Node, model: &Value) -> Result<Vec<Error>> {
        self.indexes.clear();
        let mut walker = Walker::new(
            self.engine,
            tree,
            model,
            &mut self.cache,
            &mut self.indexes,
            &self.operators,
        );
        walker.walk(node, &ValueCow::Borrowed(model))?;
        let diagnostics = walker.into_diagnostics();
        tracing::debug!(diagnostics = diagnostics.len(), "injection finished");
        Ok(diagnostics)
    }
}

impl<T: Tree> fmt::Debug for Template<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("engine", &self.engine)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
