//! Document - owns the element tree and its root

use crate::{DomTree, ElementId, ElementRef};

/// A document: one element tree with a root element and a source URL
#[derive(Debug)]
pub struct Document {
    /// The element tree
    pub tree: DomTree,
    root: ElementId,
    url: String,
}

impl Document {
    /// Create a document with a `body` root element
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();
        let root = tree.create_element("body");
        // Creating the root is not a change anyone needs to react to
        tree.take_mutations();
        Self { tree, root, url: url.to_string() }
    }

    /// Root element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Source URL, used as the location of inline declarations
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let id = self.tree.create_element(tag);
        self.tree.append_child(parent, id);
        id
    }

    /// Borrow an element view
    pub fn get(&self, id: ElementId) -> Option<ElementRef<'_>> {
        ElementRef::new(&self.tree, id)
    }

    /// Check whether an element is connected to the root
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.tree.contains(self.root, id)
    }
}
