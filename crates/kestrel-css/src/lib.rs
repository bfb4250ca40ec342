//! Kestrel CSS - Selector tree & cascade
//!
//! Style sheets are compiled into a prefix tree of selector fragments,
//! indexed by id, class and tag, and matched against elements to build
//! each element's property dictionary.

mod cascade;
mod element;
mod index;
mod matching;
mod node;
mod parser;
pub mod properties;
mod stylesheet;
pub mod structural;
pub mod values;

pub use cascade::{ComputedValues, DecoratorChange, ElementStyle, StyleResolver, INLINE_SPECIFICITY};
pub use element::SelectorElement;
pub use index::StyleSheetIndex;
pub use node::{
    NodeHandle, NodeSelector, StyleSheetNode, StyleSheetTree, CLASS_SPECIFICITY, ID_SPECIFICITY, TAG_SPECIFICITY,
};
pub use parser::{parse_inline_style, parse_selector, Declaration};
pub use properties::{
    Color, DecoratorDeclaration, DecoratorsDeclaration, Length, LengthUnit, Property, PropertyDictionary, PropertyId,
    PropertySource, PropertyValue,
};
pub use structural::{StructuralKind, StructuralSelector};
pub use stylesheet::{StyleSheet, StyleSheetBuilder};

/// CSS errors
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid value '{value}' for property '{property}'")]
    InvalidValue { property: String, value: String },

    #[error("Unknown property '{0}'")]
    UnknownProperty(String),
}

/// Parse a style sheet
pub fn parse_stylesheet(css: &str, source_url: &str) -> Result<StyleSheet, CssError> {
    StyleSheet::parse(css, source_url)
}
