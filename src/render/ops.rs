//! The operator for every opcode and the table that holds them.

use crate::content::{Entries, Items};
use crate::expr::{self, Expr};
use crate::numbering::Numbering;
use crate::render::Walker;
use crate::tree::Tree;
use crate::types::opcode::{Opcode, Type};
use crate::value::ValueCow;
use crate::{Error, Result, Value};

/// Elements that take `data-src`.
const SRC_TAGS: [&str; 7] = ["iframe", "script", "img", "input", "textarea", "video", "audio"];

/// Elements whose `value` attribute is set by `data-value`, any other element
/// gets its text set instead.
const VALUE_TAGS: [&str; 7] = ["input", "option", "button", "param", "meter", "progress", "data"];

/// What the walker does with an element after one of its operators ran.
#[derive(Debug)]
pub(crate) enum Flow<'m> {
    /// Carry on with the current scope.
    NoChange,
    /// The operator materialized or cleared the content of the element, its
    /// children must not be walked.
    FullyHandled,
    /// Walk the children of the element with a new scope.
    NewScope(ValueCow<'m>),
    /// The element is excluded from the result.
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Attr,
    CssClass,
    Id,
    Src,
    Href,
    Title,
    Value,
    Text,
    Html,
    Object,
    List,
    OList,
    Map,
    OMap,
    Numbering,
    Options,
    If,
    Exclude,
    Goto,
}

/// One operator per opcode, built once per template.
#[derive(Debug)]
pub(crate) struct OperatorFactory {
    operators: [Option<Operator>; 19],
}

impl OperatorFactory {
    pub fn new() -> Self {
        Self {
            operators: Opcode::ALL.map(Operator::new),
        }
    }

    pub fn get(&self, opcode: Opcode) -> Result<Operator> {
        opcode
            .index()
            .and_then(|i| self.operators[i])
            .ok_or_else(|| {
                Error::assertion(format!("operator `{}` is not implemented", opcode.name()))
            })
    }
}

impl Operator {
    fn new(opcode: Opcode) -> Option<Self> {
        let op = match opcode {
            Opcode::None => return None,
            Opcode::Attr => Self::Attr,
            Opcode::CssClass => Self::CssClass,
            Opcode::Id => Self::Id,
            Opcode::Src => Self::Src,
            Opcode::Href => Self::Href,
            Opcode::Title => Self::Title,
            Opcode::Value => Self::Value,
            Opcode::Text => Self::Text,
            Opcode::Html => Self::Html,
            Opcode::Object => Self::Object,
            Opcode::List => Self::List,
            Opcode::OList => Self::OList,
            Opcode::Map => Self::Map,
            Opcode::OMap => Self::OMap,
            Opcode::Numbering => Self::Numbering,
            Opcode::Options => Self::Options,
            Opcode::If => Self::If,
            Opcode::Exclude => Self::Exclude,
            Opcode::Goto => Self::Goto,
        };
        Some(op)
    }

    pub fn opcode(self) -> Opcode {
        match self {
            Self::Attr => Opcode::Attr,
            Self::CssClass => Opcode::CssClass,
            Self::Id => Opcode::Id,
            Self::Src => Opcode::Src,
            Self::Href => Opcode::Href,
            Self::Title => Opcode::Title,
            Self::Value => Opcode::Value,
            Self::Text => Opcode::Text,
            Self::Html => Opcode::Html,
            Self::Object => Opcode::Object,
            Self::List => Opcode::List,
            Self::OList => Opcode::OList,
            Self::Map => Opcode::Map,
            Self::OMap => Opcode::OMap,
            Self::Numbering => Opcode::Numbering,
            Self::Options => Opcode::Options,
            Self::If => Opcode::If,
            Self::Exclude => Opcode::Exclude,
            Self::Goto => Opcode::Goto,
        }
    }

    /// The flow to continue with after a content error was recovered.
    pub fn fallback<'m>(self) -> Flow<'m> {
        match (self, self.opcode().ty()) {
            (Self::Object, _) => Flow::NewScope(ValueCow::null()),
            (_, Type::Conditional) => Flow::Excluded,
            (_, Type::Content) => Flow::FullyHandled,
            (_, Type::Attribute | Type::Jump | Type::None) => Flow::NoChange,
        }
    }

    pub fn execute<'m, T: Tree>(
        self,
        w: &mut Walker<'_, 'm, T>,
        node: T::Node,
        scope: &ValueCow<'m>,
        operand: &str,
    ) -> Result<Flow<'m>> {
        match self {
            Self::Attr => attr(w, node, scope, operand),
            Self::CssClass => css_class(w, node, scope, operand),
            Self::Id | Self::Src | Self::Href | Self::Title => {
                named_attr(self, w, node, scope, operand)
            }
            Self::Value => value(w, node, scope, operand),
            Self::Text => text(w, node, scope, operand),
            Self::Html => html(w, node, scope, operand),
            Self::Object => object(w, node, scope, operand),
            Self::List => list(w, node, scope, operand, false),
            Self::OList => list(w, node, scope, operand, true),
            Self::Map => map(w, node, scope, operand, false),
            Self::OMap => map(w, node, scope, operand, true),
            Self::Numbering => numbering(w, node, operand),
            Self::Options => options(w, node, scope, operand),
            Self::If => {
                let expr = Expr::parse(operand, operand, 0)?;
                let mut undefined = Vec::new();
                let shown = expr.evaluate(&w.content, scope, &mut undefined)?;
                for err in undefined {
                    w.recover(node, Opcode::If, operand, err)?;
                }
                match shown {
                    true => Ok(Flow::NoChange),
                    false => Ok(Flow::Excluded),
                }
            }
            Self::Exclude => match operand.trim().eq_ignore_ascii_case("true") {
                true => Ok(Flow::Excluded),
                false => Ok(Flow::NoChange),
            },
            // the walker follows the jump itself
            Self::Goto => Ok(Flow::NoChange),
        }
    }

    /// Removes whatever `execute` injected into the element.
    pub fn reset<T: Tree>(self, w: &mut Walker<'_, '_, T>, node: T::Node, operand: &str) -> Result<()> {
        match self {
            Self::Attr => {
                for pair in expr::name_values(operand)? {
                    w.tree.remove_attr(node, pair.name);
                }
            }
            Self::CssClass => {
                for pair in expr::name_values(operand)? {
                    if let Some(class) = pair.value {
                        w.tree.remove_css_class(node, class);
                    }
                }
            }
            Self::Id | Self::Src | Self::Href | Self::Title => {
                w.tree.remove_attr(node, self.opcode().name());
            }
            Self::Value => {
                if has_tag(w.tree, node, &VALUE_TAGS) {
                    w.tree.remove_attr(node, "value");
                } else {
                    w.tree.remove_text(node);
                }
            }
            Self::Text | Self::Numbering => w.tree.remove_text(node),
            Self::Html | Self::Options => w.clear_children(node),
            Self::List | Self::OList => {
                w.cache.item(w.tree, node)?;
                w.clear_children(node);
            }
            Self::Map | Self::OMap => {
                w.cache.key_value(w.tree, node)?;
                w.clear_children(node);
            }
            Self::Object | Self::If | Self::Exclude | Self::Goto => {}
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Attribute operators
////////////////////////////////////////////////////////////////////////////////

/// `data-attr="name:path; name:path"`, each clause fails on its own.
fn attr<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    for pair in expr::name_values(operand)? {
        let path = pair.value.ok_or_else(|| {
            let m = pair.offset;
            Error::syntax("expected `name:path`", operand, m..m + pair.name.len())
        })?;
        let result = w
            .content
            .get_value(scope, path)
            .and_then(|value| attr_string(pair.name, &value));
        match result {
            Ok(Some(value)) => w.tree.set_attr(node, pair.name, &value),
            Ok(None) => w.tree.remove_attr(node, pair.name),
            Err(err) => {
                w.tree.remove_attr(node, pair.name);
                w.recover(node, Opcode::Attr, operand, err)?;
            }
        }
    }
    Ok(Flow::NoChange)
}

/// `data-id`, `data-src`, `data-href` and `data-title`.
fn named_attr<'m, T: Tree>(
    op: Operator,
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    let name = op.opcode().name();
    if op == Operator::Src && !has_tag(w.tree, node, &SRC_TAGS) {
        return Err(unsupported(w.tree, node, op));
    }
    let value = w.content.get_value(scope, operand)?;
    match attr_string(name, &value)? {
        Some(value) => w.tree.set_attr(node, name, &value),
        None => w.tree.remove_attr(node, name),
    }
    Ok(Flow::NoChange)
}

/// The string form of an attribute value, `None` removes the attribute.
fn attr_string(name: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::None => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Integer(_) | Value::Float(_) if name == "id" => Ok(value.to_plain_string()),
        value => Err(Error::assertion(format!(
            "attribute `{name}` requires a string, found {}",
            value.human()
        ))),
    }
}

fn value<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    let value = w.content.get_value(scope, operand)?;
    let is_control = has_tag(w.tree, node, &VALUE_TAGS);
    match (value.is_none(), is_control) {
        (true, true) => w.tree.remove_attr(node, "value"),
        (true, false) => w.tree.remove_text(node),
        (false, true) => {
            let s = w.format(node, &value)?;
            w.tree.set_attr(node, "value", &s);
        }
        (false, false) => {
            let s = w.format(node, &value)?;
            w.set_text(node, &s);
        }
    }
    Ok(Flow::NoChange)
}

/// `data-css-class="cond:class; !path"`.
///
/// A clause with a colon toggles `class` on the condition. A bare clause is a
/// path whose value names the class to add, or to remove when negated.
fn css_class<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    for pair in expr::name_values(operand)? {
        match pair.value {
            Some(class) => {
                let expr = Expr::parse(operand, pair.name, pair.offset)?;
                let mut undefined = Vec::new();
                let on = expr.evaluate(&w.content, scope, &mut undefined)?;
                for err in undefined {
                    w.recover(node, Opcode::CssClass, operand, err)?;
                }
                match on {
                    true => w.tree.add_css_class(node, class),
                    false => w.tree.remove_css_class(node, class),
                }
            }
            None => {
                let (remove, path) = match pair.name.strip_prefix('!') {
                    Some(path) => (true, path),
                    None => (false, pair.name),
                };
                let value = match w.content.get_value(scope, path) {
                    Ok(value) => value,
                    Err(err) => {
                        w.recover(node, Opcode::CssClass, operand, err)?;
                        continue;
                    }
                };
                match &*value {
                    Value::None => {}
                    Value::String(name) => {
                        let class = class_name(name);
                        if remove {
                            w.tree.remove_css_class(node, &class);
                        } else {
                            w.tree.add_css_class(node, &class);
                        }
                    }
                    value => {
                        return Err(Error::assertion(format!(
                            "class name `{path}` must be a string, found {}",
                            value.human()
                        )));
                    }
                }
            }
        }
    }
    Ok(Flow::NoChange)
}

/// `UPPER_SNAKE` becomes `upper-snake` and `camelCase` becomes `camel-case`.
fn class_name(value: &str) -> String {
    if !value.chars().any(char::is_lowercase) {
        return value.to_lowercase().replace('_', "-");
    }
    let mut s = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if c.is_uppercase() {
            if !s.is_empty() {
                s.push('-');
            }
            s.extend(c.to_lowercase());
        } else {
            s.push(c);
        }
    }
    s
}

////////////////////////////////////////////////////////////////////////////////
// Content operators
////////////////////////////////////////////////////////////////////////////////

fn text<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    if scope.is_none() {
        w.tree.remove_text(node);
        return Ok(Flow::FullyHandled);
    }
    if !w.tree.children(node).is_empty() {
        return Err(Error::assertion(format!(
            "text operator on {} which has element children",
            w.tree.describe(node)
        )));
    }
    let value = w.content.get_value(scope, operand)?;
    match &*value {
        Value::None => w.tree.remove_text(node),
        Value::String(s) if s.is_empty() => w.tree.remove_text(node),
        value => {
            let s = w.format(node, value)?;
            w.tree.set_text(node, &s);
        }
    }
    Ok(Flow::FullyHandled)
}

fn html<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    if scope.is_none() {
        w.clear_children(node);
        return Ok(Flow::FullyHandled);
    }
    let value = w.content.get_value(scope, operand)?;
    match &*value {
        Value::None => w.clear_children(node),
        Value::String(html) => {
            w.cache.forget_descendants(w.tree, node);
            w.tree.set_html(node, html)?;
        }
        value => {
            return Err(Error::assertion(format!(
                "html operator requires a string, found {}",
                value.human()
            )));
        }
    }
    Ok(Flow::FullyHandled)
}

fn object<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    if scope.is_none() {
        return Ok(Flow::NewScope(ValueCow::null()));
    }
    let value = w.content.get_value(scope, operand)?;
    if value.is_none() {
        tracing::warn!(
            element = %w.tree.describe(node),
            operand,
            "null object, clearing descendants"
        );
        return Ok(Flow::NewScope(value));
    }
    if operand != "." && !value.is_composite() {
        return Err(Error::content(format!(
            "expected list or map, but `{operand}` evaluated to {}",
            value.human()
        )));
    }
    Ok(Flow::NewScope(value))
}

/// `data-list` and `data-olist`.
fn list<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
    ordered: bool,
) -> Result<Flow<'m>> {
    let item = w.cache.item(w.tree, node)?;
    w.clear_children(node);
    if scope.is_none() {
        return Ok(Flow::FullyHandled);
    }
    let items = w.content.get_iterable(scope, operand)?;
    if ordered {
        w.indexes.push();
    }
    let result = expand_items(w, node, item, items, ordered);
    if ordered {
        w.indexes.pop();
    }
    result.map(|()| Flow::FullyHandled)
}

fn expand_items<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    item: T::Node,
    items: Items<'m>,
    ordered: bool,
) -> Result<()> {
    for value in items {
        if ordered {
            w.indexes.increment();
        }
        let clone = w.tree.clone_node(item, true);
        w.tree.append_child(node, clone);
        w.inject(clone, &value, true)?;
    }
    Ok(())
}

/// `data-map` and `data-omap`.
fn map<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
    ordered: bool,
) -> Result<Flow<'m>> {
    let templates = w.cache.key_value(w.tree, node)?;
    w.clear_children(node);
    if scope.is_none() {
        return Ok(Flow::FullyHandled);
    }
    let entries = w.content.get_map(scope, operand)?;
    if ordered {
        w.indexes.push();
    }
    let result = expand_entries(w, node, templates, entries, ordered);
    if ordered {
        w.indexes.pop();
    }
    result.map(|()| Flow::FullyHandled)
}

fn expand_entries<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    (key_template, value_template): (T::Node, T::Node),
    entries: Entries<'m>,
    ordered: bool,
) -> Result<()> {
    for (key, value) in entries {
        if ordered {
            w.indexes.increment();
        }
        let key_node = w.tree.clone_node(key_template, true);
        let value_node = w.tree.clone_node(value_template, true);
        w.tree.append_child(node, key_node);
        w.tree.append_child(node, value_node);
        w.inject(key_node, &key, true)?;
        w.inject(value_node, &value, true)?;
    }
    Ok(())
}

/// Numbering reads the index stack only, the scope is ignored.
fn numbering<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    operand: &str,
) -> Result<Flow<'m>> {
    let text = Numbering::parse(operand)?.format(w.indexes)?;
    w.set_text(node, &text);
    Ok(Flow::FullyHandled)
}

/// Regenerates the `<option>` children of a `<select>`.
fn options<'m, T: Tree>(
    w: &mut Walker<'_, 'm, T>,
    node: T::Node,
    scope: &ValueCow<'m>,
    operand: &str,
) -> Result<Flow<'m>> {
    if !has_tag(w.tree, node, &["select"]) {
        return Err(unsupported(w.tree, node, Operator::Options));
    }
    if scope.is_none() {
        w.clear_children(node);
        return Ok(Flow::FullyHandled);
    }
    let value = w.content.get_value(scope, operand)?;
    let items = match &*value {
        Value::None => {
            w.clear_children(node);
            return Ok(Flow::FullyHandled);
        }
        Value::List(items) => items,
        value => {
            return Err(Error::assertion(format!(
                "options require a list, found {}",
                value.human()
            )));
        }
    };
    w.clear_children(node);
    for item in items {
        let text = item.to_plain_string().ok_or_else(|| {
            Error::assertion(format!("option must be a primitive value, found {}", item.human()))
        })?;
        let option = w.tree.create_element("option");
        w.tree.set_attr(option, "value", &text);
        w.tree.set_text(option, &text);
        w.tree.append_child(node, option);
    }
    Ok(Flow::FullyHandled)
}

////////////////////////////////////////////////////////////////////////////////
// Helpers
////////////////////////////////////////////////////////////////////////////////

fn has_tag<T: Tree>(tree: &T, node: T::Node, tags: &[&str]) -> bool {
    let tag = tree.tag(node);
    tags.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

fn unsupported<T: Tree>(tree: &T, node: T::Node, op: Operator) -> Error {
    Error::assertion(format!(
        "operator `{}` is not supported on {}",
        op.opcode().name(),
        tree.describe(node)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_factory_covers_every_opcode() {
        let operators = OperatorFactory::new();
        for opcode in Opcode::ALL {
            assert_eq!(operators.get(opcode).unwrap().opcode(), opcode);
        }
        let err = operators.get(Opcode::None).unwrap_err();
        assert_eq!(err.to_string(), "operator `none` is not implemented");
    }

    #[test]
    fn operator_fallback() {
        assert!(matches!(Operator::If.fallback(), Flow::Excluded));
        assert!(matches!(Operator::Href.fallback(), Flow::NoChange));
        assert!(matches!(Operator::List.fallback(), Flow::FullyHandled));
        assert!(matches!(Operator::Object.fallback(), Flow::NewScope(v) if v.is_none()));
    }

    #[test]
    fn css_class_name() {
        assert_eq!(class_name("ACTIVE_ITEM"), "active-item");
        assert_eq!(class_name("activeItem"), "active-item");
        assert_eq!(class_name("plain"), "plain");
        assert_eq!(class_name("already-kebab"), "already-kebab");
    }
}
