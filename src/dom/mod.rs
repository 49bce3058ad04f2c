//! An in-memory element tree implementing [`Tree`].
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Markup is parsed
//! with `quick-xml`, so it must be well formed: every element closed and
//! attribute values quoted. Attributes without a value are accepted.
//!
//! ```
//! use weft::dom::Document;
//! use weft::Tree;
//!
//! let mut doc = Document::parse(r#"<ul id="fruit"><li>Apple</li></ul>"#)?;
//! let ul = doc.element_by_id("fruit").unwrap();
//! doc.add_css_class(ul, "menu");
//! assert_eq!(doc.to_string(), r#"<ul id="fruit" class="menu"><li>Apple</li></ul>"#);
//! # Ok::<(), weft::Error>(())
//! ```

mod parse;
mod write;

use crate::tree::Tree;
use crate::Result;

/// A handle to a node of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element tree.
///
/// The document node returned by [`Document::root`] holds the top level
/// nodes. It is not an element of the markup and is never written out.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    data: Data,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
enum Data {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        hidden: bool,
    },
    Text(String),
}

const DOCUMENT_TAG: &str = "#document";
const TEXT_TAG: &str = "#text";

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Construct an empty document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.alloc(Data::element(DOCUMENT_TAG));
        doc
    }

    /// Parse a document from markup.
    pub fn parse(markup: &str) -> Result<Self> {
        let mut doc = Self::new();
        let root = doc.root;
        parse::parse_into(&mut doc, root, markup)?;
        Ok(doc)
    }

    /// Returns the document node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns all attached elements with the given tag in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.visit(self.root, &mut |id, node| {
            if matches!(&node.data, Data::Element { tag: t, .. } if t == tag) {
                found.push(id);
            }
        });
        found
    }

    /// Returns the text content of a node, skipping hidden elements.
    pub fn text(&self, node: NodeId) -> String {
        let mut s = String::new();
        self.collect_text(node, &mut s);
        s
    }

    /// Whether the element was excluded by a conditional directive.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        matches!(self.node(node).data, Data::Element { hidden: true, .. })
    }

    /// Returns the parent of a node, `None` for detached nodes.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Returns the number of live nodes, attached or detached.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn collect_text(&self, id: NodeId, s: &mut String) {
        let node = self.node(id);
        match &node.data {
            Data::Text(text) => s.push_str(text),
            Data::Element { hidden: true, .. } => {}
            Data::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, s);
                }
            }
        }
    }

    /// Calls `f` for `id` and all of its descendants, depth-first pre-order.
    fn visit<F>(&self, id: NodeId, f: &mut F)
    where
        F: FnMut(NodeId, &Node),
    {
        let node = self.node(id);
        f(id, node);
        for child in &node.children {
            self.visit(*child, f);
        }
    }

    /// # Panics
    ///
    /// If the node has been removed.
    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("{id:?} does not exist in this document"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("{id:?} does not exist in this document"),
        }
    }

    fn alloc(&mut self, data: Data) -> NodeId {
        let node = Node {
            parent: None,
            data,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                NodeId(i)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Attaches a detached node as the last child of `parent`.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach_node(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    fn detach_node(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Releases a node and its descendants. The node must be detached.
    fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes[id.0].take() {
            for child in node.children {
                self.release(child);
            }
            self.free.push(id.0);
        }
    }

    /// Removes children matching `pred` and releases them.
    fn remove_children_where<P>(&mut self, id: NodeId, pred: P)
    where
        P: Fn(&Data) -> bool,
    {
        let children = self.node(id).children.clone();
        let (removed, kept): (Vec<_>, Vec<_>) = children
            .into_iter()
            .partition(|c| pred(&self.node(*c).data));
        self.node_mut(id).children = kept;
        for child in removed {
            self.node_mut(child).parent = None;
            self.release(child);
        }
    }

    fn is_attached(&self, mut id: NodeId) -> bool {
        loop {
            if id == self.root {
                return true;
            }
            match self.node(id).parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.node_mut(id).data {
            Data::Element { attrs, .. } => Some(attrs),
            Data::Text(_) => None,
        }
    }
}

impl Data {
    fn element(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_owned(),
            attrs: Vec::new(),
            hidden: false,
        }
    }
}

impl Tree for Document {
    type Node = NodeId;

    fn tag(&self, node: NodeId) -> &str {
        match &self.node(node).data {
            Data::Element { tag, .. } => tag,
            Data::Text(_) => TEXT_TAG,
        }
    }

    fn attrs(&self, node: NodeId) -> Vec<(String, String)> {
        match &self.node(node).data {
            Data::Element { attrs, .. } => attrs.clone(),
            Data::Text(_) => Vec::new(),
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node).data {
            Data::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            Data::Text(_) => None,
        }
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(attrs) = self.attrs_mut(node) {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_owned(),
                None => attrs.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(attrs) = self.attrs_mut(node) {
            attrs.retain(|(n, _)| n != name);
        }
    }

    fn add_css_class(&mut self, node: NodeId, class: &str) {
        let current = self.attr(node, "class").unwrap_or_default();
        if current.split_whitespace().any(|c| c == class) {
            return;
        }
        let value = current
            .split_whitespace()
            .chain([class])
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "class", &value);
    }

    fn remove_css_class(&mut self, node: NodeId, class: &str) {
        let Some(current) = self.attr(node, "class") else {
            return;
        };
        let value = current
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            self.remove_attr(node, "class");
        } else {
            self.set_attr(node, "class", &value);
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .children
            .iter()
            .copied()
            .filter(|c| matches!(self.node(*c).data, Data::Element { .. }))
            .collect()
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child);
    }

    fn remove_children(&mut self, node: NodeId) {
        self.remove_children_where(node, |_| true);
    }

    fn detach(&mut self, node: NodeId) {
        self.detach_node(node);
    }

    fn remove(&mut self, node: NodeId) {
        self.detach_node(node);
        self.release(node);
    }

    fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId {
        let data = self.node(node).data.clone();
        let clone = self.alloc(data);
        if deep {
            for child in self.node(node).children.clone() {
                let child = self.clone_node(child, true);
                self.attach(clone, child);
            }
        }
        clone
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.remove_children(node);
        let text = self.alloc(Data::Text(text.to_owned()));
        self.attach(node, text);
    }

    fn remove_text(&mut self, node: NodeId) {
        self.remove_children_where(node, |data| matches!(data, Data::Text(_)));
    }

    fn set_html(&mut self, node: NodeId, html: &str) -> Result<()> {
        self.remove_children(node);
        let result = parse::parse_into(self, node, html);
        if result.is_err() {
            self.remove_children(node);
        }
        result
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut found = None;
        self.visit(self.root, &mut |node_id, node| {
            if found.is_none() {
                if let Data::Element { attrs, .. } = &node.data {
                    if attrs.iter().any(|(n, v)| n == "id" && v == id) {
                        found = Some(node_id);
                    }
                }
            }
        });
        found.filter(|node| self.is_attached(*node))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Data::element(tag))
    }

    fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        if let Data::Element { hidden: h, .. } = &mut self.node_mut(node).data {
            *h = hidden;
        }
    }
}
