//! Selector matching
//!
//! Checks a node and its whole chain of ancestor nodes against an element
//! and its DOM ancestors. Cheap local checks run first; structural
//! selectors, which walk siblings, run last.

use crate::element::SelectorElement;
use crate::node::{NodeHandle, NodeSelector, StyleSheetTree};

impl NodeSelector {
    /// Full check of this fragment against one element
    pub fn match_element<E: SelectorElement>(&self, element: E) -> bool {
        if !self.tag.is_empty() && self.tag != element.tag_name() {
            return false;
        }
        if !self.id.is_empty() && self.id != element.id() {
            return false;
        }
        self.match_class_pseudo_class(element) && self.match_structural_selector(element)
    }

    pub fn match_class_pseudo_class<E: SelectorElement>(&self, element: E) -> bool {
        self.classes.iter().all(|c| element.is_class_set(c))
            && self.pseudo_classes.iter().all(|p| element.is_pseudo_class_set(p))
    }

    pub fn match_structural_selector<E: SelectorElement>(&self, element: E) -> bool {
        self.structural_selectors.iter().all(|s| s.is_applicable(element))
    }
}

impl StyleSheetTree {
    /// Does the selector ending at `handle` describe `element`?
    pub fn is_applicable<E: SelectorElement>(&self, handle: NodeHandle, element: E) -> bool {
        let node = &self[handle];
        let selector = node.selector();

        if !selector.pseudo_classes.iter().all(|p| element.is_pseudo_class_set(p)) {
            return false;
        }
        if !selector.tag.is_empty() && selector.tag != element.tag_name() {
            return false;
        }
        if !selector.classes.iter().all(|c| element.is_class_set(c)) {
            return false;
        }
        if !selector.id.is_empty() && selector.id != element.id() {
            return false;
        }

        // Every ancestor node, excluding the root, must be matched by some
        // DOM ancestor, in order.
        let mut current = element;
        let mut ancestor_node = node.parent();
        while let Some(ancestor) = ancestor_node {
            let ancestor = &self[ancestor];
            if ancestor.parent().is_none() {
                break;
            }

            let mut matched = None;
            let mut candidate = current.parent_element();
            while let Some(dom_ancestor) = candidate {
                if ancestor.selector().match_element(dom_ancestor) {
                    matched = Some(dom_ancestor);
                    break;
                }
                // `>` only allows the immediate parent
                if ancestor.selector().child_combinator {
                    return false;
                }
                candidate = dom_ancestor.parent_element();
            }

            match matched {
                Some(found) => current = found,
                None => return false,
            }
            ancestor_node = ancestor.parent();
        }

        selector.match_structural_selector(element)
    }
}
