//! Borrowed element view

use crate::{DomTree, ElementId, ElementNode};

/// Copyable reference to one element of a tree
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    tree: &'a DomTree,
    id: ElementId,
    node: &'a ElementNode,
}

impl<'a> ElementRef<'a> {
    pub fn new(tree: &'a DomTree, id: ElementId) -> Option<Self> {
        tree.element(id).map(|node| Self { tree, id, node })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn tree(&self) -> &'a DomTree {
        self.tree
    }

    pub fn node(&self) -> &'a ElementNode {
        self.node
    }

    pub fn tag_name(&self) -> &'a str {
        &self.node.tag
    }

    /// `id` attribute, empty when unset
    pub fn id_attribute(&self) -> &'a str {
        &self.node.id
    }

    pub fn classes(&self) -> &'a [String] {
        &self.node.classes
    }

    pub fn is_class_set(&self, class: &str) -> bool {
        self.node.has_class(class)
    }

    pub fn is_pseudo_class_set(&self, pseudo: &str) -> bool {
        self.node.has_pseudo_class(pseudo)
    }

    pub fn parent(&self) -> Option<Self> {
        Self::new(self.tree, self.node.parent)
    }

    pub fn prev_sibling(&self) -> Option<Self> {
        Self::new(self.tree, self.node.prev_sibling)
    }

    pub fn next_sibling(&self) -> Option<Self> {
        Self::new(self.tree, self.node.next_sibling)
    }

    pub fn first_child(&self) -> Option<Self> {
        Self::new(self.tree, self.node.first_child)
    }

    pub fn has_children(&self) -> bool {
        self.node.first_child.is_valid()
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for ElementRef<'_> {}
