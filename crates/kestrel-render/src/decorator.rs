//! Decorator traits
//!
//! A decorator is an immutable paint definition shared by every element that
//! uses the same declaration. Per-element state is generated on demand and
//! kept in the [`RenderResources`] pool.

use crate::pool::{DecoratorDataHandle, RenderResources};
use crate::DecoratorError;
use kestrel_css::{ComputedValues, DecoratorsDeclaration, Property, PropertyId, PropertySource};
use kestrel_dom::{BoxArea, LayoutBox, Rectanglei, Transform2D, Vector2f};
use std::fmt;
use std::ops::BitOr;
use std::rc::Rc;

/// Property class a decorator is declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecoratorClass {
    Background,
    BackdropFilter,
    Filter,
    MaskImage,
}

impl DecoratorClass {
    /// Classes in the order decorations store them
    pub const ALL: [DecoratorClass; 4] =
        [DecoratorClass::Background, DecoratorClass::BackdropFilter, DecoratorClass::Filter, DecoratorClass::MaskImage];

    /// Property declaring decorators of this class
    pub fn property(self) -> PropertyId {
        match self {
            DecoratorClass::Background => PropertyId::Decorator,
            DecoratorClass::BackdropFilter => PropertyId::BackdropFilter,
            DecoratorClass::Filter => PropertyId::Filter,
            DecoratorClass::MaskImage => PropertyId::MaskImage,
        }
    }

    /// Area the decorator paints over
    pub fn painting_area(self) -> BoxArea {
        match self {
            DecoratorClass::Background => BoxArea::Padding,
            _ => BoxArea::Border,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for DecoratorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property().name())
    }
}

/// Set of [`DecoratorClass`]es an instancer supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoratorClasses(u8);

impl DecoratorClasses {
    pub const NONE: DecoratorClasses = DecoratorClasses(0);
    pub const BACKGROUND: DecoratorClasses = DecoratorClasses(1 << DecoratorClass::Background as u8);
    pub const BACKDROP_FILTER: DecoratorClasses = DecoratorClasses(1 << DecoratorClass::BackdropFilter as u8);
    pub const FILTER: DecoratorClasses = DecoratorClasses(1 << DecoratorClass::Filter as u8);
    pub const MASK_IMAGE: DecoratorClasses = DecoratorClasses(1 << DecoratorClass::MaskImage as u8);

    pub fn contains(self, class: DecoratorClass) -> bool {
        self.0 & class.bit() != 0
    }
}

impl BitOr for DecoratorClasses {
    type Output = DecoratorClasses;

    fn bitor(self, rhs: DecoratorClasses) -> DecoratorClasses {
        DecoratorClasses(self.0 | rhs.0)
    }
}

impl From<DecoratorClass> for DecoratorClasses {
    fn from(class: DecoratorClass) -> Self {
        DecoratorClasses(class.bit())
    }
}

/// What a decoration needs to know about its element
pub trait DecoratedElement {
    fn computed_values(&self) -> ComputedValues;

    /// Non-inherited property declared for this element
    fn local_property(&self, id: PropertyId) -> Option<&Property>;

    /// Decorator registry of the element's style sheet
    fn decorator_source(&self) -> Option<&dyn DecoratorSource>;

    /// URL of the owning document, the source of inline declarations
    fn document_url(&self) -> &str;

    fn layout_box(&self) -> LayoutBox;

    /// Accumulated transform, `None` when untransformed
    fn transform(&self) -> Option<Transform2D>;

    /// Active clip region inherited from ancestors, in window space
    fn clip_region(&self) -> Option<Rectanglei>;
}

/// Paint definition
pub trait Decorator: fmt::Debug {
    /// Create backend resources for one element
    ///
    /// `painting_area` is the padding box for backgrounds and the border box
    /// for filters and masks.
    fn generate_element_data(
        &self,
        element: &dyn DecoratedElement,
        painting_area: BoxArea,
        resources: &RenderResources,
    ) -> Option<DecoratorDataHandle>;

    fn release_element_data(&self, data: DecoratorDataHandle, resources: &RenderResources) {
        resources.release(data);
    }

    fn render_element(&self, element: &dyn DecoratedElement, data: DecoratorDataHandle, resources: &RenderResources);

    /// Extra margin needed beyond the border box, as (top-left, bottom-right)
    fn clip_extension(&self) -> (Vector2f, Vector2f) {
        (Vector2f::ZERO, Vector2f::ZERO)
    }
}

/// Creates decorators of one type from declaration arguments
pub trait DecoratorInstancer {
    fn classes(&self) -> DecoratorClasses;

    fn instance_decorator(&self, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError>;
}

/// Resolves a decorator-class property into decorator instances
pub trait DecoratorSource {
    /// An empty list means nothing of this class is painted
    fn instance_decorators(
        &self,
        class: DecoratorClass,
        declaration: &DecoratorsDeclaration,
        source: &PropertySource,
    ) -> Vec<Rc<dyn Decorator>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let classes = DecoratorClasses::FILTER | DecoratorClasses::BACKDROP_FILTER;
        assert!(classes.contains(DecoratorClass::Filter));
        assert!(classes.contains(DecoratorClass::BackdropFilter));
        assert!(!classes.contains(DecoratorClass::Background));
        assert!(DecoratorClasses::from(DecoratorClass::MaskImage).contains(DecoratorClass::MaskImage));
        assert!(!DecoratorClasses::NONE.contains(DecoratorClass::MaskImage));
    }

    #[test]
    fn test_class_properties() {
        let properties = DecoratorClass::ALL.map(DecoratorClass::property);
        assert_eq!(
            properties,
            [PropertyId::Decorator, PropertyId::BackdropFilter, PropertyId::Filter, PropertyId::MaskImage]
        );
        assert_eq!(DecoratorClass::Background.painting_area(), BoxArea::Padding);
        assert_eq!(DecoratorClass::Filter.painting_area(), BoxArea::Border);
        assert_eq!(DecoratorClass::Filter.to_string(), "filter");
    }
}
