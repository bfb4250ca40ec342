//! Selector Node Tree
//!
//! A prefix tree of compound selectors. Every path from the root to a node
//! spells out one complex selector (`div .a > .b`), and rules that share a
//! prefix share the nodes for it. Nodes live in an arena owned by the tree;
//! parent links are plain handles, so there is no reference cycle.

use crate::properties::PropertyDictionary;
use crate::structural::StructuralSelector;
use std::fmt;
use std::ops::Index;

/// Specificity of a tag requirement
pub const TAG_SPECIFICITY: i32 = 10_000;
/// Specificity of an id requirement
pub const ID_SPECIFICITY: i32 = 1_000_000;
/// Specificity of each class, pseudo-class and structural selector
pub const CLASS_SPECIFICITY: i32 = 100_000;

/// Handle to a node in a [`StyleSheetTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u32);

impl NodeHandle {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Requirements of one compound selector
///
/// Two siblings never carry equal requirements; `child_combinator` marks that
/// this fragment must match the immediate parent of the element matched by
/// its child fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeSelector {
    pub tag: String,
    pub id: String,
    /// Sorted class names
    pub classes: Vec<String>,
    /// Sorted pseudo-class names
    pub pseudo_classes: Vec<String>,
    pub structural_selectors: Vec<StructuralSelector>,
    pub child_combinator: bool,
}

impl NodeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_ascii_lowercase();
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self.normalize();
        self
    }

    pub fn pseudo_class(mut self, pseudo: &str) -> Self {
        self.pseudo_classes.push(pseudo.to_string());
        self.normalize();
        self
    }

    pub fn structural(mut self, selector: StructuralSelector) -> Self {
        self.structural_selectors.push(selector);
        self
    }

    pub fn child_combinator(mut self, child_combinator: bool) -> Self {
        self.child_combinator = child_combinator;
        self
    }

    /// Sort and dedup names so equivalent selectors compare equal
    pub fn normalize(&mut self) {
        self.classes.sort();
        self.classes.dedup();
        self.pseudo_classes.sort();
        self.pseudo_classes.dedup();
    }

    /// Specificity contributed by this fragment alone
    pub fn own_specificity(&self) -> i32 {
        let mut specificity = 0;
        if !self.tag.is_empty() {
            specificity += TAG_SPECIFICITY;
        }
        if !self.id.is_empty() {
            specificity += ID_SPECIFICITY;
        }
        let counted = self.classes.len() + self.pseudo_classes.len() + self.structural_selectors.len();
        specificity + CLASS_SPECIFICITY * counted as i32
    }

    /// Selector matches anything
    pub fn is_universal(&self) -> bool {
        self.tag.is_empty()
            && self.id.is_empty()
            && self.classes.is_empty()
            && self.pseudo_classes.is_empty()
            && self.structural_selectors.is_empty()
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_universal() {
            f.write_str("*")?;
        }
        f.write_str(&self.tag)?;
        if !self.id.is_empty() {
            write!(f, "#{}", self.id)?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for pseudo in &self.pseudo_classes {
            write!(f, ":{pseudo}")?;
        }
        for s in &self.structural_selectors {
            write!(f, ":{:?}({}n+{})", s.kind, s.a, s.b)?;
        }
        Ok(())
    }
}

/// One node of the selector tree
#[derive(Debug, Clone)]
pub struct StyleSheetNode {
    pub(crate) selector: NodeSelector,
    pub(crate) specificity: i32,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) properties: PropertyDictionary,
    pub(crate) structurally_volatile: bool,
}

impl StyleSheetNode {
    fn new(selector: NodeSelector, parent: Option<(NodeHandle, i32)>) -> Self {
        let specificity = selector.own_specificity() + parent.map_or(0, |(_, s)| s);
        Self {
            selector,
            specificity,
            parent: parent.map(|(h, _)| h),
            children: Vec::new(),
            properties: PropertyDictionary::new(),
            structurally_volatile: false,
        }
    }

    pub fn selector(&self) -> &NodeSelector {
        &self.selector
    }

    /// Own specificity plus that of every ancestor
    pub fn specificity(&self) -> i32 {
        self.specificity
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn properties(&self) -> &PropertyDictionary {
        &self.properties
    }

    pub fn is_structurally_volatile(&self) -> bool {
        self.structurally_volatile
    }
}

/// Arena-backed selector tree with a synthetic root
#[derive(Debug, Clone)]
pub struct StyleSheetTree {
    nodes: Vec<StyleSheetNode>,
}

impl Default for StyleSheetTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheetTree {
    pub fn new() -> Self {
        Self { nodes: vec![StyleSheetNode::new(NodeSelector::default(), None)] }
    }

    /// The synthetic root; matches nothing by itself
    pub fn root(&self) -> NodeHandle {
        NodeHandle(0)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&StyleSheetNode> {
        self.nodes.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Every handle in arena order
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        (0..self.nodes.len() as u32).map(NodeHandle)
    }

    /// Return the child of `parent` with exactly these requirements,
    /// creating it if none exists
    pub fn get_or_create_child(&mut self, parent: NodeHandle, selector: NodeSelector) -> NodeHandle {
        if let Some(&existing) = self[parent].children.iter().find(|&&c| self[c].selector == selector) {
            return existing;
        }
        self.push_child(parent, selector)
    }

    fn push_child(&mut self, parent: NodeHandle, selector: NodeSelector) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        let parent_specificity = self[parent].specificity;
        self.nodes.push(StyleSheetNode::new(selector, Some((parent, parent_specificity))));
        self.nodes[parent.index()].children.push(handle);
        handle
    }

    /// Import one rule's declarations into a node
    ///
    /// `rule_specificity` orders rules of equal selector specificity; each
    /// property lands at the node's specificity plus that value.
    pub fn import_properties(&mut self, handle: NodeHandle, properties: &PropertyDictionary, rule_specificity: i32) {
        let node = &mut self.nodes[handle.index()];
        let specificity = node.specificity + rule_specificity;
        node.properties.import(properties, specificity);
    }

    /// Merge `other`'s subtree at `other_node` into `target`
    ///
    /// Properties are merged with their specificity shifted by `offset`;
    /// children are paired by requirements and merged recursively.
    pub fn merge_hierarchy(&mut self, target: NodeHandle, other: &StyleSheetTree, other_node: NodeHandle, offset: i32) {
        self.nodes[target.index()].properties.merge(&other[other_node].properties, offset);

        for &other_child in &other[other_node].children {
            let local = self.get_or_create_child(target, other[other_child].selector.clone());
            self.merge_hierarchy(local, other, other_child, offset);
        }
    }

    /// Copy `source`'s subtree at `node` as a new child of `new_parent`
    ///
    /// The copy is always a fresh node, even if `new_parent` already has a
    /// child with the same requirements.
    pub fn copy_subtree(&mut self, new_parent: NodeHandle, source: &StyleSheetTree, node: NodeHandle) -> NodeHandle {
        let copy = self.push_child(new_parent, source[node].selector.clone());
        self.nodes[copy.index()].properties = source[node].properties.clone();
        for &child in &source[node].children {
            self.copy_subtree(copy, source, child);
        }
        copy
    }

    /// Independent copy of the whole tree
    pub fn deep_copy(&self) -> StyleSheetTree {
        let mut copy = StyleSheetTree::new();
        let root = copy.root();
        copy.nodes[root.index()].properties = self[self.root()].properties.clone();
        for &child in &self[self.root()].children {
            copy.copy_subtree(root, self, child);
        }
        copy.set_structurally_volatile_recursive(root, false);
        copy
    }

    /// Flag nodes whose matches can change with sibling order
    ///
    /// A node is volatile if it, an ancestor, or a descendant uses a
    /// structural selector. Returns whether the subtree at `handle` contains
    /// one.
    pub fn set_structurally_volatile_recursive(&mut self, handle: NodeHandle, ancestor_is_structural: bool) -> bool {
        let self_is_structural = !self[handle].selector.structural_selectors.is_empty();

        let mut descendant_is_structural = false;
        let children = self[handle].children.clone();
        for child in children {
            if self.set_structurally_volatile_recursive(child, self_is_structural || ancestor_is_structural) {
                descendant_is_structural = true;
            }
        }

        self.nodes[handle.index()].structurally_volatile =
            self_is_structural || ancestor_is_structural || descendant_is_structural;
        self_is_structural || descendant_is_structural
    }

    pub fn is_structurally_volatile(&self, handle: NodeHandle) -> bool {
        self[handle].structurally_volatile
    }

    /// Selector text from the root down to `handle`, for diagnostics
    pub fn selector_path(&self, handle: NodeHandle) -> String {
        let mut parts = Vec::new();
        let mut current = Some(handle);
        while let Some(h) = current {
            let node = &self[h];
            if node.parent.is_none() {
                break;
            }
            let mut part = node.selector.to_string();
            if node.selector.child_combinator {
                part.push_str(" >");
            }
            parts.push(part);
            current = node.parent;
        }
        parts.reverse();
        parts.join(" ")
    }
}

impl Index<NodeHandle> for StyleSheetTree {
    type Output = StyleSheetNode;

    fn index(&self, handle: NodeHandle) -> &StyleSheetNode {
        &self.nodes[handle.index()]
    }
}
