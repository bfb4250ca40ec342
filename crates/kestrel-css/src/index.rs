//! Style sheet index
//!
//! Buckets every node that declares properties under one key so the cascade
//! only runs the full matcher against plausible candidates.

use crate::element::SelectorElement;
use crate::node::{NodeHandle, StyleSheetTree};
use std::collections::HashMap;

/// Candidate lookup tables over a finished selector tree
#[derive(Debug, Clone, Default)]
pub struct StyleSheetIndex {
    pub ids: HashMap<String, Vec<NodeHandle>>,
    pub classes: HashMap<String, Vec<NodeHandle>>,
    pub tags: HashMap<String, Vec<NodeHandle>>,
    /// Nodes with only pseudo-class or structural requirements
    pub other: Vec<NodeHandle>,
}

impl StyleSheetIndex {
    /// Index every node of `tree` that carries at least one property
    pub fn build(tree: &StyleSheetTree) -> Self {
        let mut index = Self::default();
        index.insert_recursive(tree, tree.root());
        tracing::debug!(
            ids = index.ids.len(),
            classes = index.classes.len(),
            tags = index.tags.len(),
            other = index.other.len(),
            "Built style sheet index"
        );
        index
    }

    fn insert_recursive(&mut self, tree: &StyleSheetTree, handle: NodeHandle) {
        let node = &tree[handle];

        if !node.properties().is_empty() {
            let selector = node.selector();
            // Most selective key first: id, then the first class, then the tag.
            // Any single key is enough for correctness since the matcher runs
            // on every candidate.
            if !selector.id.is_empty() {
                insert_unique(self.ids.entry(selector.id.clone()).or_default(), handle);
            } else if let Some(class) = selector.classes.first() {
                insert_unique(self.classes.entry(class.clone()).or_default(), handle);
            } else if !selector.tag.is_empty() {
                insert_unique(self.tags.entry(selector.tag.clone()).or_default(), handle);
            } else {
                self.other.push(handle);
            }
        }

        for &child in node.children() {
            self.insert_recursive(tree, child);
        }
    }

    /// Nodes that may apply to `element`, in ascending handle order
    pub fn candidates<E: SelectorElement>(&self, element: E) -> Vec<NodeHandle> {
        let mut candidates = Vec::new();

        if !element.id().is_empty() {
            if let Some(nodes) = self.ids.get(element.id()) {
                candidates.extend_from_slice(nodes);
            }
        }
        for class in element.classes() {
            if let Some(nodes) = self.classes.get(class) {
                candidates.extend_from_slice(nodes);
            }
        }
        if let Some(nodes) = self.tags.get(element.tag_name()) {
            candidates.extend_from_slice(nodes);
        }
        candidates.extend_from_slice(&self.other);

        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    /// Total number of indexed nodes
    pub fn len(&self) -> usize {
        self.ids.values().chain(self.classes.values()).chain(self.tags.values()).map(Vec::len).sum::<usize>()
            + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert_unique(nodes: &mut Vec<NodeHandle>, handle: NodeHandle) {
    if !nodes.contains(&handle) {
        nodes.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeSelector;
    use crate::properties::{Property, PropertyDictionary, PropertyId, PropertyValue};

    fn styled(tree: &mut StyleSheetTree, parent: NodeHandle, selector: NodeSelector) -> NodeHandle {
        let node = tree.get_or_create_child(parent, selector);
        let mut props = PropertyDictionary::new();
        props.set_property(PropertyId::Opacity, &Property::new(PropertyValue::Number(1.0)), 0);
        tree.import_properties(node, &props, 1);
        node
    }

    #[test]
    fn test_bucket_priority() {
        let mut tree = StyleSheetTree::new();
        let root = tree.root();
        let by_id = styled(&mut tree, root, NodeSelector::new().tag("div").id("main").class("x"));
        let by_class = styled(&mut tree, root, NodeSelector::new().tag("div").class("b").class("a"));
        let by_tag = styled(&mut tree, root, NodeSelector::new().tag("p").pseudo_class("hover"));
        let other = styled(&mut tree, root, NodeSelector::new().pseudo_class("focus"));

        let index = StyleSheetIndex::build(&tree);
        assert_eq!(index.ids.get("main"), Some(&vec![by_id]));
        // Classes are sorted, so "a" is the first class
        assert_eq!(index.classes.get("a"), Some(&vec![by_class]));
        assert!(index.classes.get("b").is_none());
        assert!(index.classes.get("x").is_none());
        assert_eq!(index.tags.get("p"), Some(&vec![by_tag]));
        assert!(index.tags.get("div").is_none());
        assert_eq!(index.other, vec![other]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_unstyled_nodes_are_skipped_but_children_indexed() {
        let mut tree = StyleSheetTree::new();
        let root = tree.root();
        let ancestor = tree.get_or_create_child(root, NodeSelector::new().id("app"));
        let leaf = styled(&mut tree, ancestor, NodeSelector::new().class("item"));

        let index = StyleSheetIndex::build(&tree);
        assert!(index.ids.is_empty());
        assert_eq!(index.classes.get("item"), Some(&vec![leaf]));
    }
}
