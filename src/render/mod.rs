//! The depth-first walk that injects a model into a tree.

pub(crate) mod cache;
pub(crate) mod index;
pub(crate) mod ops;

use crate::content::Content;
use crate::render::cache::Cache;
use crate::render::index::IndexStack;
use crate::render::ops::{Flow, Operator, OperatorFactory};
use crate::tree::Tree;
use crate::types::opcode::{Opcode, Type};
use crate::value::ValueCow;
use crate::{Engine, Error, ErrorKind, Result, Value};

/// The model used while resetting, every scope is null.
static NULL: Value = Value::None;

/// State of a single inject or reset pass over a tree.
pub(crate) struct Walker<'a, 'm, T: Tree> {
    engine: &'a Engine,
    tree: &'a mut T,
    content: Content<'m>,
    cache: &'a mut Cache<T::Node>,
    indexes: &'a mut IndexStack,
    operators: &'a OperatorFactory,
    diagnostics: Vec<Error>,
    depth: usize,
}

#[derive(Debug)]
struct Directive {
    opcode: Opcode,
    operand: String,
}

/// The directives of one element, grouped by type.
#[derive(Debug, Default)]
struct Directives {
    jump: Option<Directive>,
    conditional: Option<Directive>,
    content: Option<Directive>,
    attributes: Vec<Directive>,
}

impl<'a, 'm, T: Tree> Walker<'a, 'm, T> {
    pub fn new(
        engine: &'a Engine,
        tree: &'a mut T,
        model: &'m Value,
        cache: &'a mut Cache<T::Node>,
        indexes: &'a mut IndexStack,
        operators: &'a OperatorFactory,
    ) -> Self {
        Self {
            engine,
            tree,
            content: Content::new(model),
            cache,
            indexes,
            operators,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Injects `scope` into `node` and its descendants.
    pub fn walk(&mut self, node: T::Node, scope: &ValueCow<'m>) -> Result<()> {
        self.inject(node, scope, false)
    }

    /// Injects `scope` into a subtree rooted at `node`.
    ///
    /// The content directive of `node` is bound to the scope itself, an
    /// element without one walks its children with the scope.
    pub fn walk_subtree(&mut self, node: T::Node, scope: &ValueCow<'m>) -> Result<()> {
        self.enter(node)?;
        let result = self.subtree_directives(node).and_then(|directives| {
            self.inject_directives(node, &directives, scope, false)
        });
        self.depth -= 1;
        result
    }

    fn subtree_directives(&self, node: T::Node) -> Result<Directives> {
        let mut directives = self.directives(node)?;
        match &mut directives.content {
            Some(directive) => {
                if let Opcode::Text | Opcode::Html | Opcode::Numbering = directive.opcode {
                    return Err(Error::assertion(format!(
                        "operator `{}` on {} cannot receive a subtree injection",
                        directive.opcode.name(),
                        self.tree.describe(node)
                    )));
                }
                directive.operand = String::from(".");
            }
            None => {
                directives.content = Some(Directive {
                    opcode: Opcode::Object,
                    operand: String::from("."),
                });
            }
        }
        Ok(directives)
    }

    /// Returns the recoverable errors raised during the walk.
    pub fn into_diagnostics(self) -> Vec<Error> {
        self.diagnostics
    }

    pub(crate) fn inject(
        &mut self,
        node: T::Node,
        scope: &ValueCow<'m>,
        default_item: bool,
    ) -> Result<()> {
        self.enter(node)?;
        let result = self.inject_element(node, scope, default_item);
        self.depth -= 1;
        result
    }

    fn inject_element(
        &mut self,
        node: T::Node,
        scope: &ValueCow<'m>,
        default_item: bool,
    ) -> Result<()> {
        let directives = self.directives(node)?;
        self.inject_directives(node, &directives, scope, default_item)
    }

    fn inject_directives(
        &mut self,
        node: T::Node,
        directives: &Directives,
        scope: &ValueCow<'m>,
        default_item: bool,
    ) -> Result<()> {
        if let Some(jump) = &directives.jump {
            self.execute(node, jump, scope)?;
            match self.tree.element_by_id(&jump.operand) {
                Some(target) => {
                    tracing::debug!(from = ?node, to = ?target, "following jump");
                    return self.inject(target, scope, false);
                }
                None => {
                    tracing::warn!(
                        element = %self.tree.describe(node),
                        target = %jump.operand,
                        "jump target not found"
                    );
                }
            }
        }

        // With a null scope there is nothing to evaluate conditions or
        // attributes against, only content is cleared.
        if !scope.is_none() {
            for directive in &directives.attributes {
                if let Flow::FullyHandled = self.execute(node, directive, scope)? {
                    return Ok(());
                }
            }
            if let Some(directive) = &directives.conditional {
                match self.execute(node, directive, scope)? {
                    Flow::Excluded => {
                        self.tree.set_hidden(node, true);
                        return Ok(());
                    }
                    Flow::FullyHandled => return Ok(()),
                    Flow::NoChange | Flow::NewScope(_) => self.tree.set_hidden(node, false),
                }
            }
        }

        let default = match (&directives.content, default_item) {
            (None, true) => Some(self.default_item(node)),
            _ => None,
        };
        let flow = match directives.content.as_ref().or(default.as_ref()) {
            Some(directive) => self.execute(node, directive, scope)?,
            None => Flow::NoChange,
        };
        match flow {
            Flow::NoChange => self.inject_children(node, scope),
            Flow::NewScope(scope) => self.inject_children(node, &scope),
            Flow::FullyHandled | Flow::Excluded => Ok(()),
        }
    }

    fn inject_children(&mut self, node: T::Node, scope: &ValueCow<'m>) -> Result<()> {
        for child in self.tree.children(node) {
            self.inject(child, scope, false)?;
        }
        Ok(())
    }

    /// A list or map item without a content directive injects its scope as
    /// text, or as an object when it has element children.
    fn default_item(&self, node: T::Node) -> Directive {
        let opcode = match self.tree.children(node).is_empty() {
            true => Opcode::Text,
            false => Opcode::Object,
        };
        Directive {
            opcode,
            operand: String::from("."),
        }
    }

    /// Runs one operator and applies the error policy to its failure.
    fn execute(
        &mut self,
        node: T::Node,
        directive: &Directive,
        scope: &ValueCow<'m>,
    ) -> Result<Flow<'m>> {
        let operator = self.operators.get(directive.opcode)?;
        tracing::trace!(
            operator = directive.opcode.name(),
            operand = %directive.operand,
            "executing"
        );
        let err = match operator.execute(self, node, scope, &directive.operand) {
            Ok(flow) => return Ok(flow),
            Err(err) => err.with_context(
                directive.opcode.name(),
                self.tree.describe(node),
                &directive.operand,
            ),
        };
        match err.kind() {
            ErrorKind::Content => {
                tracing::warn!("{err}");
                operator.reset(self, node, &directive.operand)?;
                self.diagnostics.push(err);
                Ok(operator.fallback())
            }
            ErrorKind::Assertion => {
                tracing::error!("{err}");
                Err(err)
            }
            // a failing attribute does not block the rest of the element
            ErrorKind::Other => {
                self.report(err);
                match directive.opcode.ty() {
                    Type::Attribute => Ok(Flow::NoChange),
                    _ => Ok(Flow::FullyHandled),
                }
            }
        }
    }

    /// Recovers from an error raised by one clause of a multi-clause operand.
    ///
    /// Content errors are recorded and the caller continues with the next
    /// clause, anything else is returned.
    fn recover(&mut self, node: T::Node, opcode: Opcode, operand: &str, err: Error) -> Result<()> {
        let err = err.with_context(opcode.name(), self.tree.describe(node), operand);
        match err.kind() {
            ErrorKind::Content => {
                tracing::warn!("{err}");
                self.diagnostics.push(err);
                Ok(())
            }
            ErrorKind::Assertion | ErrorKind::Other => Err(err),
        }
    }

    /// Hands an error to the engine's error sink and records it.
    fn report(&mut self, err: Error) {
        (self.engine.error_sink)(&err);
        self.diagnostics.push(err);
    }

    /// Formats a value for display, honouring the formatter named on the
    /// element.
    fn format(&self, node: T::Node, value: &Value) -> Result<String> {
        match self.tree.attr(node, self.engine.syntax.format_attr()) {
            Some(name) => {
                let format = self
                    .engine
                    .formats
                    .get(name)
                    .ok_or_else(|| Error::assertion(format!("unknown format `{name}`")))?;
                format.format(value)
            }
            None => value.to_plain_string().ok_or_else(|| {
                Error::assertion(format!("cannot display {} as text", value.human()))
            }),
        }
    }

    /// Replaces the content of `node` with text, dropping the templates cached
    /// for its descendants.
    fn set_text(&mut self, node: T::Node, text: &str) {
        self.cache.forget_descendants(self.tree, node);
        self.tree.set_text(node, text);
    }

    /// Removes the children of `node` together with the templates cached for
    /// them.
    fn clear_children(&mut self, node: T::Node) {
        self.cache.forget_descendants(self.tree, node);
        self.tree.remove_children(node);
    }

    fn directives(&self, node: T::Node) -> Result<Directives> {
        let mut directives = Directives::default();
        for (name, operand) in self.tree.attrs(node) {
            let opcode = self.engine.syntax.opcode(&name);
            let directive = Directive { opcode, operand };
            let slot = match opcode.ty() {
                Type::None => continue,
                Type::Attribute => {
                    directives.attributes.push(directive);
                    continue;
                }
                Type::Jump => &mut directives.jump,
                Type::Conditional => &mut directives.conditional,
                Type::Content => &mut directives.content,
            };
            if let Some(prev) = &*slot {
                return Err(Error::assertion(format!(
                    "{} declares both `{}` and `{}`",
                    self.tree.describe(node),
                    self.engine.syntax.attr_name(prev.opcode),
                    name
                )));
            }
            *slot = Some(directive);
        }
        Ok(directives)
    }

    fn enter(&mut self, node: T::Node) -> Result<()> {
        if self.depth >= self.engine.max_depth {
            return Err(Error::assertion(format!(
                "maximum walk depth of {} exceeded at {}",
                self.engine.max_depth,
                self.tree.describe(node)
            )));
        }
        self.depth += 1;
        Ok(())
    }
}

impl<'a, T: Tree> Walker<'a, 'static, T> {
    /// A walker for resetting, its model is null.
    pub fn resetting(
        engine: &'a Engine,
        tree: &'a mut T,
        cache: &'a mut Cache<T::Node>,
        indexes: &'a mut IndexStack,
        operators: &'a OperatorFactory,
    ) -> Self {
        Self::new(engine, tree, &NULL, cache, indexes, operators)
    }

    /// Restores `node` and its descendants to their declarative state.
    pub fn reset(&mut self, node: T::Node) -> Result<()> {
        self.enter(node)?;
        let result = self.reset_element(node);
        self.depth -= 1;
        result
    }

    fn reset_element(&mut self, node: T::Node) -> Result<()> {
        let directives = self.directives(node)?;

        if let Some(jump) = &directives.jump {
            if let Some(target) = self.tree.element_by_id(&jump.operand) {
                return self.reset(target);
            }
        }
        for directive in &directives.attributes {
            self.reset_directive(node, directive)?;
        }
        if directives.conditional.is_some() {
            self.tree.set_hidden(node, false);
        }
        if let Some(directive) = &directives.content {
            self.reset_directive(node, directive)?;
        }
        for child in self.tree.children(node) {
            self.reset(child)?;
        }
        Ok(())
    }

    fn reset_directive(&mut self, node: T::Node, directive: &Directive) -> Result<()> {
        let operator: Operator = self.operators.get(directive.opcode)?;
        operator
            .reset(self, node, &directive.operand)
            .map_err(|err| {
                err.with_context(
                    directive.opcode.name(),
                    self.tree.describe(node),
                    &directive.operand,
                )
            })
    }
}
