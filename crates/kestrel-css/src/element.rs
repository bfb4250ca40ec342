//! Element access for selector matching

use kestrel_dom::ElementRef;

/// What the matcher needs to know about an element
pub trait SelectorElement: Copy {
    fn tag_name(&self) -> &str;
    /// `id` attribute, empty when unset
    fn id(&self) -> &str;
    /// All class names, used to look up index candidates
    fn classes(&self) -> &[String];
    fn is_class_set(&self, class: &str) -> bool;
    fn is_pseudo_class_set(&self, pseudo: &str) -> bool;
    fn parent_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;
    fn has_children(&self) -> bool;
}

impl SelectorElement for ElementRef<'_> {
    fn tag_name(&self) -> &str {
        ElementRef::tag_name(self)
    }

    fn id(&self) -> &str {
        self.id_attribute()
    }

    fn classes(&self) -> &[String] {
        ElementRef::classes(self)
    }

    fn is_class_set(&self, class: &str) -> bool {
        ElementRef::is_class_set(self, class)
    }

    fn is_pseudo_class_set(&self, pseudo: &str) -> bool {
        ElementRef::is_pseudo_class_set(self, pseudo)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent()
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.prev_sibling()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_sibling()
    }

    fn has_children(&self) -> bool {
        ElementRef::has_children(self)
    }
}
