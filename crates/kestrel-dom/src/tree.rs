//! Element Tree (arena-based allocation)
//!
//! Elements are never freed: removing a child detaches its subtree, which
//! keeps every `ElementId` stable for the lifetime of the tree.

use crate::{ElementId, LayoutBox, Transform2D};

/// Element node
#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Tag name (lowercase)
    pub tag: String,
    /// `id` attribute, empty when unset
    pub id: String,
    /// Class names in declaration order
    pub classes: Vec<String>,
    /// Active pseudo-classes (hover, focus, ...)
    pub pseudo_classes: Vec<String>,
    /// Parent element (NONE if root or detached)
    pub parent: ElementId,
    pub first_child: ElementId,
    /// Last child (for O(1) append)
    pub last_child: ElementId,
    pub prev_sibling: ElementId,
    pub next_sibling: ElementId,
    /// Raw `style` attribute
    pub inline_style: Option<String>,
    /// Layout result
    pub layout: LayoutBox,
    /// Local-to-window transform
    pub transform: Transform2D,
}

impl ElementNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: String::new(),
            classes: Vec::new(),
            pseudo_classes: Vec::new(),
            parent: ElementId::NONE,
            first_child: ElementId::NONE,
            last_child: ElementId::NONE,
            prev_sibling: ElementId::NONE,
            next_sibling: ElementId::NONE,
            inline_style: None,
            layout: LayoutBox::default(),
            transform: Transform2D::IDENTITY,
        }
    }

    /// Check if a class is set
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Check if a pseudo-class is active
    pub fn has_pseudo_class(&self, pseudo: &str) -> bool {
        self.pseudo_classes.iter().any(|p| p == pseudo)
    }
}

/// Recorded change to the tree, consumed by restyling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    ClassChanged(ElementId),
    PseudoClassChanged(ElementId),
    IdChanged(ElementId),
    InlineStyleChanged(ElementId),
    LayoutChanged(ElementId),
    ChildAdded { parent: ElementId, child: ElementId },
    ChildRemoved { parent: ElementId, child: ElementId },
}

/// Arena-based element tree
#[derive(Debug, Default)]
pub struct DomTree {
    nodes: Vec<ElementNode>,
    mutations: Vec<Mutation>,
}

impl DomTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(ElementNode::new(tag));
        id
    }

    /// Get an element by ID
    pub fn element(&self, id: ElementId) -> Option<&ElementNode> {
        self.nodes.get(id.index())
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(id.index())
    }

    /// Number of elements ever created
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.insert_before(parent, child, ElementId::NONE);
    }

    /// Insert `child` before `reference` (or at the end when `reference` is NONE)
    pub fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: ElementId) {
        if self.element(parent).is_none() || self.element(child).is_none() {
            return;
        }
        if reference == child || self.contains(child, parent) {
            tracing::debug!(?child, ?parent, "refusing to insert an element into its own subtree");
            return;
        }
        if reference.is_valid() && self.element(reference).map(|r| r.parent) != Some(parent) {
            tracing::debug!(?reference, ?parent, "insert_before reference is not a child");
            return;
        }

        if self.nodes[child.index()].parent.is_valid() {
            let old_parent = self.nodes[child.index()].parent;
            self.remove_child(old_parent, child);
        }

        let prev = if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling
        } else {
            self.nodes[parent.index()].last_child
        };

        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        self.mutations.push(Mutation::ChildAdded { parent, child });
    }

    /// Detach `child` (and its subtree) from `parent`
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        let Some(node) = self.element(child) else {
            return false;
        };
        if node.parent != parent || !parent.is_valid() {
            return false;
        }
        let (prev, next) = (node.prev_sibling, node.next_sibling);

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[child.index()];
        node.parent = ElementId::NONE;
        node.prev_sibling = ElementId::NONE;
        node.next_sibling = ElementId::NONE;

        self.mutations.push(Mutation::ChildRemoved { parent, child });
        true
    }

    pub fn set_id(&mut self, element: ElementId, id: &str) {
        if let Some(node) = self.element_mut(element) {
            if node.id != id {
                node.id = id.to_string();
                self.mutations.push(Mutation::IdChanged(element));
            }
        }
    }

    /// Add or remove a single class
    pub fn set_class(&mut self, element: ElementId, class: &str, active: bool) {
        let Some(node) = self.element_mut(element) else {
            return;
        };
        let position = node.classes.iter().position(|c| c == class);
        match (position, active) {
            (None, true) => node.classes.push(class.to_string()),
            (Some(i), false) => {
                node.classes.remove(i);
            }
            _ => return,
        }
        self.mutations.push(Mutation::ClassChanged(element));
    }

    /// Replace all classes from a whitespace-separated list
    pub fn set_class_names(&mut self, element: ElementId, names: &str) {
        let classes: Vec<String> = names.split_whitespace().map(str::to_string).collect();
        if let Some(node) = self.element_mut(element) {
            if node.classes != classes {
                node.classes = classes;
                self.mutations.push(Mutation::ClassChanged(element));
            }
        }
    }

    pub fn is_class_set(&self, element: ElementId, class: &str) -> bool {
        self.element(element).is_some_and(|n| n.has_class(class))
    }

    pub fn set_pseudo_class(&mut self, element: ElementId, pseudo: &str, active: bool) {
        let Some(node) = self.element_mut(element) else {
            return;
        };
        let position = node.pseudo_classes.iter().position(|p| p == pseudo);
        match (position, active) {
            (None, true) => node.pseudo_classes.push(pseudo.to_string()),
            (Some(i), false) => {
                node.pseudo_classes.swap_remove(i);
            }
            _ => return,
        }
        self.mutations.push(Mutation::PseudoClassChanged(element));
    }

    pub fn is_pseudo_class_set(&self, element: ElementId, pseudo: &str) -> bool {
        self.element(element).is_some_and(|n| n.has_pseudo_class(pseudo))
    }

    /// Set or clear the `style` attribute
    pub fn set_inline_style(&mut self, element: ElementId, style: Option<&str>) {
        if let Some(node) = self.element_mut(element) {
            node.inline_style = style.map(str::to_string);
            self.mutations.push(Mutation::InlineStyleChanged(element));
        }
    }

    pub fn set_layout(&mut self, element: ElementId, layout: LayoutBox) {
        if let Some(node) = self.element_mut(element) {
            if node.layout != layout {
                node.layout = layout;
                self.mutations.push(Mutation::LayoutChanged(element));
            }
        }
    }

    pub fn set_transform(&mut self, element: ElementId, transform: Transform2D) {
        if let Some(node) = self.element_mut(element) {
            if node.transform != transform {
                node.transform = transform;
                self.mutations.push(Mutation::LayoutChanged(element));
            }
        }
    }

    /// Drain pending mutations
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Iterate over the direct children of an element
    pub fn children(&self, parent: ElementId) -> Children<'_> {
        let first = self.element(parent).map_or(ElementId::NONE, |n| n.first_child);
        Children { tree: self, current: first }
    }

    /// Pre-order traversal of `root` and everything below it
    pub fn descendants(&self, root: ElementId) -> Descendants<'_> {
        let stack = if self.element(root).is_some() { vec![root] } else { Vec::new() };
        Descendants { tree: self, stack }
    }

    /// Check whether `ancestor` is `element` or one of its ancestors
    pub fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = element;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.element(current).map_or(ElementId::NONE, |n| n.parent);
        }
        false
    }
}

/// Iterator over child elements
pub struct Children<'a> {
    tree: &'a DomTree,
    current: ElementId,
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.current.is_valid() {
            return None;
        }
        let id = self.current;
        self.current = self.tree.element(id).map_or(ElementId::NONE, |n| n.next_sibling);
        Some(id)
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.element(id) {
            let mut child = node.last_child;
            while child.is_valid() {
                self.stack.push(child);
                child = self.tree.element(child).map_or(ElementId::NONE, |n| n.prev_sibling);
            }
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (DomTree, ElementId, ElementId, ElementId, ElementId) {
        let mut tree = DomTree::new();
        let root = tree.create_element("body");
        let a = tree.create_element("div");
        let b = tree.create_element("p");
        let c = tree.create_element("span");
        tree.append_child(root, a);
        tree.append_child(root, b);
        tree.append_child(a, c);
        (tree, root, a, b, c)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, root, a, b, _) = build();
        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(tree.element(b).map(|n| n.prev_sibling), Some(a));
    }

    #[test]
    fn test_insert_before() {
        let (mut tree, root, a, b, _) = build();
        let x = tree.create_element("em");
        tree.insert_before(root, x, b);
        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![a, x, b]);
    }

    #[test]
    fn test_remove_child_detaches_subtree() {
        let (mut tree, root, a, b, c) = build();
        assert!(tree.remove_child(root, a));
        let children: Vec<_> = tree.children(root).collect();
        assert_eq!(children, vec![b]);
        assert_eq!(tree.element(a).map(|n| n.parent), Some(ElementId::NONE));
        // Subtree stays intact under the detached element
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![c]);
        assert!(!tree.remove_child(root, a));
    }

    #[test]
    fn test_descendants_preorder() {
        let (tree, root, a, b, c) = build();
        let order: Vec<_> = tree.descendants(root).collect();
        assert_eq!(order, vec![root, a, c, b]);
    }

    #[test]
    fn test_classes_and_mutations() {
        let (mut tree, _, a, _, _) = build();
        tree.take_mutations();

        tree.set_class(a, "active", true);
        tree.set_class(a, "active", true);
        assert!(tree.is_class_set(a, "active"));

        tree.set_class_names(a, "x  y");
        assert!(!tree.is_class_set(a, "active"));
        assert!(tree.is_class_set(a, "y"));

        tree.set_pseudo_class(a, "hover", true);
        assert!(tree.is_pseudo_class_set(a, "hover"));

        let mutations = tree.take_mutations();
        assert_eq!(
            mutations,
            vec![
                Mutation::ClassChanged(a),
                Mutation::ClassChanged(a),
                Mutation::PseudoClassChanged(a),
            ]
        );
        assert!(tree.take_mutations().is_empty());
    }

    #[test]
    fn test_contains() {
        let (tree, root, a, b, c) = build();
        assert!(tree.contains(root, c));
        assert!(tree.contains(a, c));
        assert!(!tree.contains(b, c));
    }
}
