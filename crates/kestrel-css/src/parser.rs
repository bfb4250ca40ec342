//! CSS Parser using lightningcss
//!
//! lightningcss does the tokenising and rule splitting. Selectors and
//! declarations are serialised back to text and then compiled into our own
//! representation, since the engine only understands a subset of CSS.

use crate::node::NodeSelector;
use crate::properties::{Property, PropertyDictionary, PropertyId, PropertySource};
use crate::structural::StructuralSelector;
use crate::values::{parse_property_value, split_arguments};
use crate::CssError;
use lightningcss::declaration::DeclarationBlock;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute, StyleSheet};
use lightningcss::traits::ToCss;
use std::rc::Rc;

/// Declaration as `name: value` text
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

/// One style rule before compilation
#[derive(Debug, Clone)]
pub struct ParsedRule {
    /// Comma-separated selector list
    pub selectors: String,
    pub declarations: Vec<Declaration>,
    /// 1-based source line
    pub line: u32,
}

/// Split a style sheet into rules
pub fn parse_rules(css: &str) -> Result<Vec<ParsedRule>, CssError> {
    let sheet = StyleSheet::parse(css, ParserOptions::default()).map_err(|e| CssError::ParseError {
        line: e.loc.as_ref().map_or(0, |loc| loc.line + 1),
        message: e.kind.to_string(),
    })?;

    let mut rules = Vec::new();
    for rule in &sheet.rules.0 {
        match rule {
            CssRule::Style(style) => {
                let selectors = style.selectors.to_css_string(PrinterOptions::default()).map_err(|e| {
                    CssError::ParseError { line: style.loc.line + 1, message: e.to_string() }
                })?;
                rules.push(ParsedRule {
                    selectors,
                    declarations: declarations_from_block(&style.declarations),
                    line: style.loc.line + 1,
                });
            }
            // Media queries, keyframes and at-rules are not supported
            _ => tracing::debug!("Skipping unsupported rule"),
        }
    }
    Ok(rules)
}

fn declarations_from_block(block: &DeclarationBlock) -> Vec<Declaration> {
    // Important declarations come last so that they win ties
    block
        .declarations
        .iter()
        .chain(block.important_declarations.iter())
        .filter_map(|property| {
            let text = property.to_css_string(false, PrinterOptions::default()).ok()?;
            let (name, value) = text.split_once(':')?;
            Some(Declaration { name: name.trim().to_ascii_lowercase(), value: value.trim().to_string() })
        })
        .collect()
}

/// Split a `name: value; ...` block without lightningcss
pub fn parse_declaration_block(text: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    let mut push = |segment: &str| {
        if let Some((name, value)) = segment.split_once(':') {
            let name = name.trim();
            let value = value.trim().trim_end_matches("!important").trim();
            if !name.is_empty() && !value.is_empty() {
                declarations.push(Declaration { name: name.to_ascii_lowercase(), value: value.to_string() });
            }
        }
    };

    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' if depth == 0 => {
                push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push(&text[start..]);
    declarations
}

/// Compile declarations into a dictionary
///
/// Unknown properties and invalid values are logged and skipped.
pub fn compile_declarations(declarations: &[Declaration], source: Option<&Rc<PropertySource>>) -> PropertyDictionary {
    let mut dict = PropertyDictionary::new();
    for declaration in declarations {
        match compile_declaration(declaration) {
            Ok(values) => {
                for (id, value) in values {
                    let mut property = Property::new(value);
                    property.source = source.cloned();
                    dict.set_property(id, &property, 0);
                }
            }
            Err(err) => match source {
                Some(source) => tracing::warn!(%source, "{err}"),
                None => tracing::warn!("{err}"),
            },
        }
    }
    dict
}

fn compile_declaration(declaration: &Declaration) -> Result<Vec<(PropertyId, crate::PropertyValue)>, CssError> {
    if let Some(id) = PropertyId::from_name(&declaration.name) {
        return Ok(vec![(id, parse_property_value(id, &declaration.value)?)]);
    }

    let Some(longhands) = PropertyId::shorthand(&declaration.name) else {
        return Err(CssError::UnknownProperty(declaration.name.clone()));
    };

    // Box-corner expansion: 1 to 4 values, clockwise from the top left
    let values = split_arguments(&declaration.value);
    let pick: &[usize; 4] = match values.len() {
        1 => &[0, 0, 0, 0],
        2 => &[0, 1, 0, 1],
        3 => &[0, 1, 2, 1],
        4 => &[0, 1, 2, 3],
        _ => {
            return Err(CssError::InvalidValue {
                property: declaration.name.clone(),
                value: declaration.value.clone(),
            });
        }
    };
    longhands
        .iter()
        .zip(pick)
        .map(|(&id, &i)| Ok((id, parse_property_value(id, &values[i])?)))
        .collect()
}

/// Parse a `style` attribute
pub fn parse_inline_style(text: &str) -> Result<PropertyDictionary, CssError> {
    let attribute = StyleAttribute::parse(text, ParserOptions::default())
        .map_err(|e| CssError::ParseError { line: 1, message: e.kind.to_string() })?;
    Ok(compile_declarations(&declarations_from_block(&attribute.declarations), None))
}

/// Parse one complex selector into its compound fragments, outermost first
///
/// `X > Y` marks `X` with the child combinator.
pub fn parse_selector(text: &str) -> Result<Vec<NodeSelector>, CssError> {
    let invalid = |reason: &str| CssError::InvalidSelector { selector: text.trim().to_string(), reason: reason.to_string() };

    let mut fragments: Vec<NodeSelector> = Vec::new();
    let mut compound = String::new();
    let mut depth = 0i32;
    let mut pending_child = false;

    let flush = |compound: &mut String, fragments: &mut Vec<NodeSelector>| -> Result<(), CssError> {
        if !compound.is_empty() {
            fragments.push(parse_compound(compound).ok_or_else(|| invalid("unsupported compound selector"))?);
            compound.clear();
        }
        Ok(())
    };

    for c in text.trim().chars() {
        match c {
            '(' => {
                depth += 1;
                compound.push(c);
            }
            ')' => {
                depth -= 1;
                compound.push(c);
            }
            c if depth == 0 && c.is_whitespace() => flush(&mut compound, &mut fragments)?,
            '>' if depth == 0 => {
                flush(&mut compound, &mut fragments)?;
                match fragments.last_mut() {
                    Some(last) if !pending_child => last.child_combinator = true,
                    _ => return Err(invalid("dangling '>'")),
                }
                pending_child = true;
                continue;
            }
            '+' | '~' if depth == 0 => return Err(invalid("sibling combinators are not supported")),
            ',' if depth == 0 => return Err(invalid("expected a single selector")),
            c => compound.push(c),
        }
        if !compound.is_empty() {
            pending_child = false;
        }
    }
    flush(&mut compound, &mut fragments)?;

    if depth != 0 {
        return Err(invalid("unbalanced parentheses"));
    }
    if pending_child || fragments.is_empty() {
        return Err(invalid("incomplete selector"));
    }
    Ok(fragments)
}

fn parse_compound(text: &str) -> Option<NodeSelector> {
    let mut selector = NodeSelector::new();
    let mut chars = text.char_indices().peekable();

    // Leading type selector
    let tag_end = text.find(['#', '.', ':', '[']).unwrap_or(text.len());
    let tag = &text[..tag_end];
    if tag != "*" && !tag.is_empty() {
        if !is_ident(tag) {
            return None;
        }
        selector.tag = tag.to_ascii_lowercase();
    }
    while chars.peek().is_some_and(|&(i, _)| i < tag_end) {
        chars.next();
    }

    while let Some((start, prefix)) = chars.next() {
        if prefix == '[' {
            return None;
        }
        if prefix == ':' && chars.peek().is_some_and(|&(_, c)| c == ':') {
            // Pseudo-elements
            return None;
        }

        let name_start = start + prefix.len_utf8();
        let mut name_end = text.len();
        let mut argument = None;
        while let Some(&(i, c)) = chars.peek() {
            if matches!(c, '#' | '.' | ':' | '[') {
                name_end = i;
                break;
            }
            if c == '(' {
                name_end = i;
                let close = text[i..].rfind(')')? + i;
                argument = Some(&text[i + 1..close]);
                while chars.peek().is_some_and(|&(j, _)| j <= close) {
                    chars.next();
                }
                break;
            }
            chars.next();
        }
        let name = &text[name_start..name_end];
        if !is_ident(name) {
            return None;
        }

        match prefix {
            '#' => selector.id = name.to_string(),
            '.' => selector.classes.push(name.to_string()),
            ':' => {
                let name = name.to_ascii_lowercase();
                match StructuralSelector::parse(&name, argument) {
                    Some(structural) => selector.structural_selectors.push(structural),
                    None if argument.is_some() => return None,
                    None => selector.pseudo_classes.push(name),
                }
            }
            _ => return None,
        }
    }

    selector.normalize();
    Some(selector)
}

fn is_ident(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::StructuralKind;

    #[test]
    fn test_parse_selector_chain() {
        let fragments = parse_selector("div .a > .b").unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], NodeSelector::new().tag("div"));
        assert_eq!(fragments[1], NodeSelector::new().class("a").child_combinator(true));
        assert_eq!(fragments[2], NodeSelector::new().class("b"));
    }

    #[test]
    fn test_parse_compound() {
        let fragments = parse_selector("#id.cls2.cls1 tag").unwrap();
        assert_eq!(fragments[0], NodeSelector::new().id("id").class("cls1").class("cls2"));
        assert_eq!(fragments[1].tag, "tag");

        let fragments = parse_selector("li:hover:nth-child(2n+1)").unwrap();
        assert_eq!(fragments[0].pseudo_classes, vec!["hover".to_string()]);
        assert_eq!(fragments[0].structural_selectors, vec![StructuralSelector::new(StructuralKind::NthChild, 2, 1)]);

        let fragments = parse_selector("* > p").unwrap();
        assert!(fragments[0].is_universal());
        assert!(fragments[0].child_combinator);
    }

    #[test]
    fn test_parse_selector_errors() {
        assert!(parse_selector("a + b").is_err());
        assert!(parse_selector("p::before").is_err());
        assert!(parse_selector("input[type]").is_err());
        assert!(parse_selector("div >").is_err());
        assert!(parse_selector("> div").is_err());
        assert!(parse_selector("li:not(.x)").is_err());
    }

    #[test]
    fn test_parse_declaration_block() {
        let decls = parse_declaration_block("filter: grayscale(0.5) blur(4px); opacity: 0.5 !important;");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "grayscale(0.5) blur(4px)");
        assert_eq!(decls[1], Declaration { name: "opacity".into(), value: "0.5".into() });
    }

    #[test]
    fn test_compile_border_radius_shorthand() {
        let decls = parse_declaration_block("border-radius: 1px 2px; no-such-property: 3");
        let dict = compile_declarations(&decls, None);
        assert_eq!(dict.len(), 4);
        assert_eq!(
            dict.get(PropertyId::BorderTopRightRadius).map(|p| &p.value),
            Some(&crate::PropertyValue::Length(crate::properties::Length::px(2.0)))
        );
    }

    #[test]
    fn test_parse_rules_with_lightningcss() {
        let rules = parse_rules("div .a > .b { opacity: 0.5 }\n\n.x, .y { filter: blur(4px); }").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].line, 1);
        assert_eq!(rules[1].line, 3);
        assert_eq!(rules[1].selectors.split(',').count(), 2);
        assert_eq!(rules[1].declarations[0].name, "filter");
    }

    #[test]
    fn test_parse_inline_style() {
        let dict = parse_inline_style("opacity: 0.25; filter: blur(2px)").unwrap();
        assert_eq!(dict.get(PropertyId::Opacity).and_then(|p| p.value.as_number()), Some(0.25));
        assert!(dict.contains(PropertyId::Filter));
    }
}
