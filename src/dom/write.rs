use std::fmt;

use quick_xml::escape::{escape, partial_escape};

use crate::dom::{Data, Document, NodeId};

impl fmt::Display for Document {
    /// Writes the document as markup, leaving out hidden elements.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in &self.node(self.root).children {
            self.write_node(*child, f)?;
        }
        Ok(())
    }
}

impl Document {
    /// Writes a single node and its descendants as markup.
    pub fn write_node<W: fmt::Write>(&self, id: NodeId, w: &mut W) -> fmt::Result {
        let node = self.node(id);
        match &node.data {
            Data::Text(text) => w.write_str(&partial_escape(text.as_str())),
            Data::Element { hidden: true, .. } => Ok(()),
            Data::Element { tag, attrs, .. } => {
                write!(w, "<{tag}")?;
                for (name, value) in attrs {
                    write!(w, " {name}=\"{}\"", escape(value.as_str()))?;
                }
                if node.children.is_empty() {
                    return w.write_str("/>");
                }
                w.write_char('>')?;
                for child in &node.children {
                    self.write_node(*child, w)?;
                }
                write!(w, "</{tag}>")
            }
        }
    }
}
