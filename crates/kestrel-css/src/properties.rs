//! CSS Property Definitions
//!
//! Property identifiers, typed values and the specificity-ordered
//! dictionary that rule nodes and elements accumulate declarations into.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Property identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum PropertyId {
    // Display & Box
    Display,
    Visibility,
    Width,
    Height,
    ZIndex,

    // Colors
    Color,
    BackgroundColor,
    Opacity,

    // Border radius
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomRightRadius,
    BorderBottomLeftRadius,

    // Decoration
    Decorator,
    Filter,
    BackdropFilter,
    MaskImage,
}

impl PropertyId {
    /// Parse a property name into a PropertyId
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "display" => Self::Display,
            "visibility" => Self::Visibility,
            "width" => Self::Width,
            "height" => Self::Height,
            "z-index" => Self::ZIndex,

            "color" => Self::Color,
            "background-color" => Self::BackgroundColor,
            "opacity" => Self::Opacity,

            "border-top-left-radius" => Self::BorderTopLeftRadius,
            "border-top-right-radius" => Self::BorderTopRightRadius,
            "border-bottom-right-radius" => Self::BorderBottomRightRadius,
            "border-bottom-left-radius" => Self::BorderBottomLeftRadius,

            "decorator" => Self::Decorator,
            "filter" => Self::Filter,
            "backdrop-filter" => Self::BackdropFilter,
            "mask-image" => Self::MaskImage,

            _ => return None,
        })
    }

    /// CSS name of the property
    pub fn name(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Visibility => "visibility",
            Self::Width => "width",
            Self::Height => "height",
            Self::ZIndex => "z-index",
            Self::Color => "color",
            Self::BackgroundColor => "background-color",
            Self::Opacity => "opacity",
            Self::BorderTopLeftRadius => "border-top-left-radius",
            Self::BorderTopRightRadius => "border-top-right-radius",
            Self::BorderBottomRightRadius => "border-bottom-right-radius",
            Self::BorderBottomLeftRadius => "border-bottom-left-radius",
            Self::Decorator => "decorator",
            Self::Filter => "filter",
            Self::BackdropFilter => "backdrop-filter",
            Self::MaskImage => "mask-image",
        }
    }

    /// Properties whose value is a list of decorators
    pub fn is_decorator_class(self) -> bool {
        matches!(self, Self::Decorator | Self::Filter | Self::BackdropFilter | Self::MaskImage)
    }

    /// Longhands of a shorthand property, if `name` is one
    pub fn shorthand(name: &str) -> Option<&'static [PropertyId]> {
        match name {
            "border-radius" => Some(&[
                Self::BorderTopLeftRadius,
                Self::BorderTopRightRadius,
                Self::BorderBottomRightRadius,
                Self::BorderBottomLeftRadius,
            ]),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RGBA color (straight alpha)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiply alpha by `opacity` (0..1)
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Premultiplied color in 0..1 floats
    pub fn to_premultiplied(self) -> [f32; 4] {
        let a = self.a as f32 / 255.0;
        [self.r as f32 / 255.0 * a, self.g as f32 / 255.0 * a, self.b as f32 / 255.0 * a, a]
    }
}

/// Length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    Px,
    Dp,
    Em,
    Rem,
    Vw,
    Vh,
}

/// Length value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    /// Font size used to resolve `em`/`rem` when no font context exists
    pub const DEFAULT_FONT_SIZE: f32 = 16.0;

    pub const fn px(value: f32) -> Self {
        Self { value, unit: LengthUnit::Px }
    }

    /// Resolve to pixels
    pub fn to_px(&self, viewport_width: f32, viewport_height: f32) -> f32 {
        match self.unit {
            LengthUnit::Px | LengthUnit::Dp => self.value,
            LengthUnit::Em | LengthUnit::Rem => self.value * Self::DEFAULT_FONT_SIZE,
            LengthUnit::Vw => self.value * viewport_width / 100.0,
            LengthUnit::Vh => self.value * viewport_height / 100.0,
        }
    }
}

/// One decorator function in a decorator-class property, e.g. `blur(4px)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecoratorDeclaration {
    pub type_name: String,
    /// Raw text between the parentheses
    pub arguments: String,
}

/// Parsed value of `decorator`, `filter`, `backdrop-filter` or `mask-image`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DecoratorsDeclaration {
    /// Declared text, used as a cache key for instanced decorators
    pub value: String,
    pub list: Vec<DecoratorDeclaration>,
}

/// Typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Keyword(String),
    Number(f32),
    Length(Length),
    /// Fraction, i.e. `50%` is stored as 0.5
    Percentage(f32),
    /// Radians
    Angle(f32),
    Color(Color),
    Decorators(DecoratorsDeclaration),
    Raw(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) | Self::Percentage(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_decorators(&self) -> Option<&DecoratorsDeclaration> {
        match self {
            Self::Decorators(d) => Some(d),
            _ => None,
        }
    }
}

/// Where a declaration came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertySource {
    pub path: String,
    pub line: u32,
    pub rule_name: String,
}

impl PropertySource {
    pub fn new(path: &str, line: u32, rule_name: &str) -> Self {
        Self { path: path.to_string(), line, rule_name: rule_name.to_string() }
    }
}

impl fmt::Display for PropertySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// A declared value together with the specificity it was declared at
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub value: PropertyValue,
    pub specificity: i32,
    pub source: Option<Rc<PropertySource>>,
}

impl Property {
    pub fn new(value: PropertyValue) -> Self {
        Self { value, specificity: 0, source: None }
    }

    pub fn with_source(mut self, source: Rc<PropertySource>) -> Self {
        self.source = Some(source);
        self
    }
}

/// Property map where the most specific declaration wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDictionary {
    properties: HashMap<PropertyId, Property>,
}

impl PropertyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property at `specificity`
    ///
    /// An existing entry survives only if its specificity is strictly
    /// greater, so equal specificity means later declarations win.
    pub fn set_property(&mut self, id: PropertyId, property: &Property, specificity: i32) {
        if self.properties.get(&id).is_some_and(|existing| existing.specificity > specificity) {
            return;
        }
        let mut property = property.clone();
        property.specificity = specificity;
        self.properties.insert(id, property);
    }

    /// Import every property of `other` at `specificity`
    ///
    /// A non-positive `specificity` keeps each property's own specificity.
    pub fn import(&mut self, other: &PropertyDictionary, specificity: i32) {
        for (&id, property) in &other.properties {
            let specificity = if specificity > 0 { specificity } else { property.specificity };
            self.set_property(id, property, specificity);
        }
    }

    /// Merge `other`, shifting its specificities by `offset`
    pub fn merge(&mut self, other: &PropertyDictionary, offset: i32) {
        for (&id, property) in &other.properties {
            self.set_property(id, property, property.specificity.saturating_add(offset));
        }
    }

    pub fn get(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    pub fn remove(&mut self, id: PropertyId) -> Option<Property> {
        self.properties.remove(&id)
    }

    pub fn contains(&self, id: PropertyId) -> bool {
        self.properties.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &Property)> {
        self.properties.iter().map(|(&id, p)| (id, p))
    }

    /// Property ids in a stable order
    pub fn ids(&self) -> Vec<PropertyId> {
        let mut ids: Vec<_> = self.properties.keys().copied().collect();
        ids.sort();
        ids
    }
}
