use std::fmt::Debug;
use std::hash::Hash;

use crate::Result;

/// The element capabilities the engine needs from a host tree.
///
/// Nodes are addressed by lightweight handles. A handle must stay valid while
/// the node is detached, because detached item templates are kept by the
/// [`Template`][crate::Template] and cloned on every render. Handles of
/// removed nodes may be reused.
///
/// [`dom::Document`][crate::dom::Document] is an in-memory implementation.
pub trait Tree {
    /// A handle to a node in this tree.
    type Node: Copy + Eq + Hash + Debug;

    /// Returns the tag name of an element.
    fn tag(&self, node: Self::Node) -> &str;

    /// Returns the attributes of an element in document order.
    fn attrs(&self, node: Self::Node) -> Vec<(String, String)>;

    /// Returns the value of an attribute.
    fn attr(&self, node: Self::Node, name: &str) -> Option<&str>;

    fn has_attr(&self, node: Self::Node, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Sets an attribute, replacing any existing value.
    fn set_attr(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attr(&mut self, node: Self::Node, name: &str);

    /// Adds a class to the `class` attribute unless already present.
    fn add_css_class(&mut self, node: Self::Node, class: &str);

    fn remove_css_class(&mut self, node: Self::Node, class: &str);

    /// Returns the element children of a node.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    fn first_child(&self, node: Self::Node) -> Option<Self::Node> {
        self.children(node).first().copied()
    }

    /// Appends a detached node as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Removes and discards every child node, text included.
    fn remove_children(&mut self, node: Self::Node);

    /// Detaches a node from its parent, keeping it alive.
    fn detach(&mut self, node: Self::Node);

    /// Detaches a node and discards it together with its descendants.
    fn remove(&mut self, node: Self::Node);

    /// Clones a node, and its descendants when `deep` is true. The clone is
    /// detached.
    fn clone_node(&mut self, node: Self::Node, deep: bool) -> Self::Node;

    /// Replaces the content of an element with a single text node.
    ///
    /// The removed children are discarded, the engine forgets the templates
    /// cached for them beforehand.
    fn set_text(&mut self, node: Self::Node, text: &str);

    /// Removes the text nodes of an element, keeping element children.
    fn remove_text(&mut self, node: Self::Node);

    /// Replaces the content of an element with parsed markup.
    fn set_html(&mut self, node: Self::Node, html: &str) -> Result<()>;

    /// Finds an attached element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Creates a new detached element.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Marks an element as excluded from, or included in, the rendered
    /// result.
    fn set_hidden(&mut self, node: Self::Node, hidden: bool);

    /// A short description of an element for diagnostics.
    fn describe(&self, node: Self::Node) -> String {
        match self.attr(node, "id") {
            Some(id) => format!("<{} id=\"{id}\">", self.tag(node)),
            None => format!("<{}>", self.tag(node)),
        }
    }
}
