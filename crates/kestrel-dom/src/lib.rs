//! Kestrel DOM - Element tree
//!
//! Arena-backed element tree carrying exactly what styling and decoration
//! need: tag, id, classes, pseudo-classes, sibling links, inline style and
//! the layout box computed by the embedding application.

mod document;
mod element;
pub mod geometry;
mod tree;

pub use document::Document;
pub use element::ElementRef;
pub use geometry::{BoxArea, Edges, LayoutBox, Rectanglef, Rectanglei, Transform2D, Vector2f, Vector2i};
pub use tree::{DomTree, ElementNode, Mutation};

/// Element identifier (index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Invalid/null element
    pub const NONE: ElementId = ElementId(u32::MAX);

    /// Check if this is a valid element ID
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::NONE
    }
}
