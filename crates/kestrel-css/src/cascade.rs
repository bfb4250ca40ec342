//! Style Cascade & Resolver
//!
//! Computes an element's local properties (style sheet definition plus
//! inline style) and the handful of computed values the decoration layer
//! reacts to.

use crate::properties::{PropertyDictionary, PropertyId, PropertyValue};
use crate::stylesheet::StyleSheet;
use kestrel_dom::{BoxArea, ElementRef, Vector2f};

/// Inline declarations beat every style sheet rule
pub const INLINE_SPECIFICITY: i32 = i32::MAX;

/// Computed values relevant to decoration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedValues {
    pub has_decorator: bool,
    pub has_filter: bool,
    pub has_backdrop_filter: bool,
    pub has_mask_image: bool,
    pub opacity: f32,
    /// Corner radii in pixels: top-left, top-right, bottom-right, bottom-left
    pub border_radius: [f32; 4],
}

impl Default for ComputedValues {
    fn default() -> Self {
        Self {
            has_decorator: false,
            has_filter: false,
            has_backdrop_filter: false,
            has_mask_image: false,
            opacity: 1.0,
            border_radius: [0.0; 4],
        }
    }
}

impl ComputedValues {
    /// Any decorator-class property is in use
    pub fn has_decoration(&self) -> bool {
        self.has_decorator || self.has_filter || self.has_backdrop_filter || self.has_mask_image
    }
}

/// How a restyle affects an element's decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorChange {
    None,
    /// Same decorators, but their per-element data must be regenerated
    Data,
    /// The decorator lists themselves changed
    Decorators,
}

/// Resolved style of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStyle {
    /// Non-inherited properties declared for this element
    pub local: PropertyDictionary,
    pub computed: ComputedValues,
}

const DECORATOR_PROPERTIES: [PropertyId; 4] =
    [PropertyId::Decorator, PropertyId::BackdropFilter, PropertyId::Filter, PropertyId::MaskImage];

const RADIUS_PROPERTIES: [PropertyId; 4] = [
    PropertyId::BorderTopLeftRadius,
    PropertyId::BorderTopRightRadius,
    PropertyId::BorderBottomRightRadius,
    PropertyId::BorderBottomLeftRadius,
];

impl ElementStyle {
    pub fn local_property(&self, id: PropertyId) -> Option<&crate::Property> {
        self.local.get(id)
    }

    /// Classify the difference from `previous`
    pub fn decorator_change(&self, previous: &ElementStyle) -> DecoratorChange {
        fn value(style: &ElementStyle, id: PropertyId) -> Option<&PropertyValue> {
            style.local.get(id).map(|p| &p.value)
        }
        if DECORATOR_PROPERTIES.iter().any(|&id| value(self, id) != value(previous, id)) {
            return DecoratorChange::Decorators;
        }
        if self.computed.opacity != previous.computed.opacity
            || self.computed.border_radius != previous.computed.border_radius
        {
            return DecoratorChange::Data;
        }
        DecoratorChange::None
    }
}

/// Computes element styles against one style sheet
#[derive(Debug)]
pub struct StyleResolver<'a> {
    sheet: &'a StyleSheet,
    viewport: Vector2f,
}

impl<'a> StyleResolver<'a> {
    pub fn new(sheet: &'a StyleSheet, viewport: Vector2f) -> Self {
        Self { sheet, viewport }
    }

    /// Resolve the style of `element`
    ///
    /// `inline` is the parsed `style` attribute; `parent` supplies inherited
    /// values.
    pub fn compute_style(
        &self,
        element: ElementRef<'_>,
        inline: Option<&PropertyDictionary>,
        parent: Option<&ComputedValues>,
    ) -> ElementStyle {
        let mut local = self.sheet.element_definition(element);
        if let Some(inline) = inline {
            local.import(inline, INLINE_SPECIFICITY);
        }

        let has = |id| {
            local
                .get(id)
                .and_then(|p| p.value.as_decorators())
                .is_some_and(|d| !d.list.is_empty())
        };

        let opacity = local
            .get(PropertyId::Opacity)
            .and_then(|p| p.value.as_number())
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or_else(|| parent.map_or(1.0, |p| p.opacity));

        let reference = element.node().layout.size(BoxArea::Border).x;
        let border_radius = RADIUS_PROPERTIES.map(|id| match local.get(id).map(|p| &p.value) {
            Some(PropertyValue::Length(length)) => length.to_px(self.viewport.x, self.viewport.y),
            Some(PropertyValue::Percentage(fraction)) => fraction * reference,
            _ => 0.0,
        });

        let computed = ComputedValues {
            has_decorator: has(PropertyId::Decorator),
            has_filter: has(PropertyId::Filter),
            has_backdrop_filter: has(PropertyId::BackdropFilter),
            has_mask_image: has(PropertyId::MaskImage),
            opacity,
            border_radius,
        };

        ElementStyle { local, computed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_inline_style;
    use crate::stylesheet::StyleSheetBuilder;
    use kestrel_dom::{DomTree, LayoutBox};

    fn sheet() -> StyleSheet {
        StyleSheetBuilder::new("mem://test")
            .rule(".fx", "filter: grayscale(0.5) blur(4px); border-radius: 4px")
            .unwrap()
            .rule(".bg", "decorator: gradient(vertical red blue)")
            .unwrap()
            .rule(".none", "filter: none")
            .unwrap()
            .build()
    }

    #[test]
    fn test_flags() {
        let sheet = sheet();
        let resolver = StyleResolver::new(&sheet, Vector2f::new(800.0, 600.0));
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        dom.set_class_names(div, "fx bg");

        let style = resolver.compute_style(ElementRef::new(&dom, div).unwrap(), None, None);
        assert!(style.computed.has_filter);
        assert!(style.computed.has_decorator);
        assert!(!style.computed.has_backdrop_filter);
        assert_eq!(style.computed.border_radius, [4.0; 4]);
    }

    #[test]
    fn test_none_is_not_a_decoration() {
        let sheet = sheet();
        let resolver = StyleResolver::new(&sheet, Vector2f::ZERO);
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        dom.set_class_names(div, "none");
        let style = resolver.compute_style(ElementRef::new(&dom, div).unwrap(), None, None);
        assert!(!style.computed.has_decoration());
    }

    #[test]
    fn test_inline_overrides_and_opacity_inherits() {
        let sheet = sheet();
        let resolver = StyleResolver::new(&sheet, Vector2f::ZERO);
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        dom.set_class_names(div, "fx");
        dom.set_layout(div, LayoutBox::new(Vector2f::ZERO, Vector2f::new(200.0, 100.0)));

        let inline = parse_inline_style("filter: none; border-top-left-radius: 10%").unwrap();
        let parent = ComputedValues { opacity: 0.5, ..Default::default() };
        let style = resolver.compute_style(ElementRef::new(&dom, div).unwrap(), Some(&inline), Some(&parent));

        assert!(!style.computed.has_filter);
        assert_eq!(style.computed.opacity, 0.5);
        assert!((style.computed.border_radius[0] - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_decorator_change() {
        let sheet = sheet();
        let resolver = StyleResolver::new(&sheet, Vector2f::ZERO);
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        dom.set_class_names(div, "fx");

        let before = resolver.compute_style(ElementRef::new(&dom, div).unwrap(), None, None);
        assert_eq!(before.decorator_change(&before), DecoratorChange::None);

        let parent = ComputedValues { opacity: 0.5, ..Default::default() };
        let faded = resolver.compute_style(ElementRef::new(&dom, div).unwrap(), None, Some(&parent));
        assert_eq!(faded.decorator_change(&before), DecoratorChange::Data);

        dom.set_class_names(div, "bg");
        let after = resolver.compute_style(ElementRef::new(&dom, div).unwrap(), None, None);
        assert_eq!(after.decorator_change(&before), DecoratorChange::Decorators);
    }
}
