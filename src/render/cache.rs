use std::collections::HashMap;
use std::hash::Hash;

use crate::tree::Tree;
use crate::{Error, Result};

/// Detached sub-templates extracted from list and map elements.
///
/// Entries are keyed by the owning element and hold the detached nodes, so the
/// tree never sees them again until they are cloned.
#[derive(Debug)]
pub(crate) struct Cache<N> {
    templates: HashMap<N, Cached<N>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cached<N> {
    /// The item template of a list.
    Item(N),
    /// The key and value templates of a map.
    KeyValue(N, N),
}

impl<N> Default for Cache<N> {
    fn default() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }
}

impl<N> Cache<N>
where
    N: Copy + Eq + Hash + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the item template of a list element, extracting its first child
    /// on first use.
    pub fn item<T>(&mut self, tree: &mut T, element: N) -> Result<N>
    where
        T: Tree<Node = N>,
    {
        match self.templates.get(&element) {
            Some(Cached::Item(item)) => return Ok(*item),
            Some(Cached::KeyValue(..)) => {
                return Err(Error::assertion("element holds map templates, not an item template"));
            }
            None => {}
        }
        let item = tree.first_child(element).ok_or_else(|| {
            Error::assertion(format!(
                "list element {} is missing its item template",
                tree.describe(element)
            ))
        })?;
        tree.detach(item);
        tracing::debug!(?element, ?item, "extracted item template");
        self.templates.insert(element, Cached::Item(item));
        Ok(item)
    }

    /// Returns the key and value templates of a map element, extracting its
    /// first two children on first use.
    pub fn key_value<T>(&mut self, tree: &mut T, element: N) -> Result<(N, N)>
    where
        T: Tree<Node = N>,
    {
        match self.templates.get(&element) {
            Some(Cached::KeyValue(key, value)) => return Ok((*key, *value)),
            Some(Cached::Item(_)) => {
                return Err(Error::assertion("element holds a list template, not map templates"));
            }
            None => {}
        }
        let children = tree.children(element);
        let (key, value) = match children.as_slice() {
            [key, value, ..] => (*key, *value),
            [_] => {
                return Err(Error::assertion(format!(
                    "map element {} is missing its value template",
                    tree.describe(element)
                )));
            }
            [] => {
                return Err(Error::assertion(format!(
                    "map element {} is missing its key template",
                    tree.describe(element)
                )));
            }
        };
        tree.detach(key);
        tree.detach(value);
        tracing::debug!(?element, ?key, ?value, "extracted key and value templates");
        self.templates.insert(element, Cached::KeyValue(key, value));
        Ok((key, value))
    }

    /// Drops the entries owned by descendants of `element` and discards their
    /// detached templates. Must be called before the children are removed.
    pub fn forget_descendants<T>(&mut self, tree: &mut T, element: N)
    where
        T: Tree<Node = N>,
    {
        if self.templates.is_empty() {
            return;
        }
        let mut pending = tree.children(element);
        while let Some(node) = pending.pop() {
            pending.extend(tree.children(node));
            match self.templates.remove(&node) {
                Some(Cached::Item(item)) => {
                    self.forget_descendants(tree, item);
                    tree.remove(item);
                }
                Some(Cached::KeyValue(key, value)) => {
                    self.forget_descendants(tree, key);
                    self.forget_descendants(tree, value);
                    tree.remove(key);
                    tree.remove(value);
                }
                None => {}
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.templates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn cache_item_extracted_once() {
        let mut doc = Document::parse("<ul><li>a</li><li>b</li></ul>").unwrap();
        let ul = doc.find_by_tag("ul")[0];
        let mut cache = Cache::new();
        let item = cache.item(&mut doc, ul).unwrap();
        assert_eq!(doc.to_string(), "<ul><li>b</li></ul>");
        assert_eq!(cache.item(&mut doc, ul).unwrap(), item);
        assert_eq!(doc.to_string(), "<ul><li>b</li></ul>");
        assert_eq!(doc.text(item), "a");
    }

    #[test]
    fn cache_missing_templates() {
        let mut doc = Document::parse("<ul/><dl><dt/></dl>").unwrap();
        let ul = doc.find_by_tag("ul")[0];
        let dl = doc.find_by_tag("dl")[0];
        let mut cache = Cache::new();
        let err = cache.item(&mut doc, ul).unwrap_err();
        assert_eq!(err.to_string(), "list element <ul> is missing its item template");
        let err = cache.key_value(&mut doc, dl).unwrap_err();
        assert_eq!(err.to_string(), "map element <dl> is missing its value template");
        assert_eq!(doc.to_string(), "<ul/><dl><dt/></dl>");
    }

    #[test]
    fn cache_forget_descendants() {
        let mut doc = Document::parse("<div><ul><li/></ul></div>").unwrap();
        let div = doc.find_by_tag("div")[0];
        let ul = doc.find_by_tag("ul")[0];
        let mut cache = Cache::new();
        cache.item(&mut doc, ul).unwrap();
        assert_eq!(cache.len(), 1);
        let before = doc.node_count();
        cache.forget_descendants(&mut doc, div);
        assert_eq!(cache.len(), 0);
        assert_eq!(doc.node_count(), before - 1);
    }
}
