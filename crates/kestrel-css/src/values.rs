//! Value parsing
//!
//! Converts declaration text into typed values. Decorator arguments are
//! parsed lazily by the decorator instancers with the helpers below.

use crate::properties::{
    Color, DecoratorDeclaration, DecoratorsDeclaration, Length, LengthUnit, PropertyId, PropertyValue,
};
use crate::CssError;

/// Parse the value of a declaration
pub fn parse_property_value(id: PropertyId, text: &str) -> Result<PropertyValue, CssError> {
    let text = text.trim();
    let invalid = || CssError::InvalidValue { property: id.name().to_string(), value: text.to_string() };

    match id {
        PropertyId::Decorator | PropertyId::Filter | PropertyId::BackdropFilter | PropertyId::MaskImage => {
            parse_decorators(text).map(PropertyValue::Decorators).ok_or_else(invalid)
        }
        PropertyId::Opacity => parse_number_percent(text).map(PropertyValue::Number).ok_or_else(invalid),
        PropertyId::Color | PropertyId::BackgroundColor => {
            parse_color(text).map(PropertyValue::Color).ok_or_else(invalid)
        }
        PropertyId::Width
        | PropertyId::Height
        | PropertyId::BorderTopLeftRadius
        | PropertyId::BorderTopRightRadius
        | PropertyId::BorderBottomRightRadius
        | PropertyId::BorderBottomLeftRadius => {
            if text.eq_ignore_ascii_case("auto") {
                Ok(PropertyValue::Keyword("auto".into()))
            } else if let Some(p) = text.strip_suffix('%') {
                p.trim().parse::<f32>().map(|v| PropertyValue::Percentage(v / 100.0)).map_err(|_| invalid())
            } else {
                parse_length(text).map(PropertyValue::Length).ok_or_else(invalid)
            }
        }
        PropertyId::ZIndex => {
            if text.eq_ignore_ascii_case("auto") {
                Ok(PropertyValue::Keyword("auto".into()))
            } else {
                text.parse::<i32>().map(|v| PropertyValue::Number(v as f32)).map_err(|_| invalid())
            }
        }
        PropertyId::Display | PropertyId::Visibility => {
            if text.is_empty() || text.contains(char::is_whitespace) {
                Err(invalid())
            } else {
                Ok(PropertyValue::Keyword(text.to_ascii_lowercase()))
            }
        }
    }
}

/// Parse a decorator list such as `grayscale(0.5) blur(4px)`
///
/// Functions may be separated by whitespace or commas. A bare identifier is
/// kept as a declaration without arguments.
pub fn parse_decorators(text: &str) -> Option<DecoratorsDeclaration> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("none") {
        return Some(DecoratorsDeclaration { value: "none".into(), list: Vec::new() });
    }

    let mut list = Vec::new();
    let mut name = String::new();
    let mut arguments = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match (depth, c) {
            (0, '(') => {
                if name.is_empty() {
                    return None;
                }
                depth = 1;
            }
            (0, ')') => return None,
            (0, c) if c.is_whitespace() || c == ',' => {
                if !name.is_empty() {
                    list.push(DecoratorDeclaration { type_name: std::mem::take(&mut name), arguments: String::new() });
                }
            }
            (0, c) => name.push(c.to_ascii_lowercase()),
            (1, ')') => {
                depth = 0;
                list.push(DecoratorDeclaration {
                    type_name: std::mem::take(&mut name),
                    arguments: std::mem::take(&mut arguments).trim().to_string(),
                });
            }
            (d, c) => {
                match c {
                    '(' => depth = d + 1,
                    ')' => depth = d - 1,
                    _ => {}
                }
                arguments.push(c);
            }
        }
    }

    if depth != 0 {
        return None;
    }
    if !name.is_empty() {
        list.push(DecoratorDeclaration { type_name: name, arguments: String::new() });
    }

    Some(DecoratorsDeclaration { value: text.to_string(), list })
}

/// Parse a plain number or a percentage (`50%` gives 0.5)
pub fn parse_number_percent(text: &str) -> Option<f32> {
    let text = text.trim();
    match text.strip_suffix('%') {
        Some(p) => p.trim().parse::<f32>().ok().map(|v| v / 100.0),
        None => text.parse::<f32>().ok(),
    }
}

/// Parse a length such as `4px`, `1.5em` or `0`
pub fn parse_length(text: &str) -> Option<Length> {
    let text = text.trim().to_ascii_lowercase();
    const UNITS: [(&str, LengthUnit); 6] = [
        ("px", LengthUnit::Px),
        ("dp", LengthUnit::Dp),
        ("rem", LengthUnit::Rem),
        ("em", LengthUnit::Em),
        ("vw", LengthUnit::Vw),
        ("vh", LengthUnit::Vh),
    ];
    for (suffix, unit) in UNITS {
        if let Some(number) = text.strip_suffix(suffix) {
            return number.parse::<f32>().ok().map(|value| Length { value, unit });
        }
    }
    // Unitless lengths are only valid for zero
    match text.parse::<f32>() {
        Ok(v) if v == 0.0 => Some(Length::px(0.0)),
        _ => None,
    }
}

/// Parse an angle into radians
pub fn parse_angle(text: &str) -> Option<f32> {
    let text = text.trim().to_ascii_lowercase();
    if let Some(n) = text.strip_suffix("deg") {
        return n.parse::<f32>().ok().map(f32::to_radians);
    }
    if let Some(n) = text.strip_suffix("grad") {
        return n.parse::<f32>().ok().map(|v| v * std::f32::consts::PI / 200.0);
    }
    if let Some(n) = text.strip_suffix("rad") {
        return n.parse::<f32>().ok();
    }
    if let Some(n) = text.strip_suffix("turn") {
        return n.parse::<f32>().ok().map(|v| v * std::f32::consts::TAU);
    }
    match text.parse::<f32>() {
        Ok(v) if v == 0.0 => Some(0.0),
        _ => None,
    }
}

/// Parse a color: hex, `rgb()`/`rgba()`, or a named color
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim().to_ascii_lowercase();

    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(inner) = text
        .strip_prefix("rgba(")
        .or_else(|| text.strip_prefix("rgb("))
        .and_then(|s| s.strip_suffix(')'))
    {
        let parts: Vec<&str> = inner.split([',', ' ', '/']).filter(|s| !s.is_empty()).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            match s.strip_suffix('%') {
                Some(p) => p.parse::<f32>().ok().map(|v| (v / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8),
                None => s.parse::<f32>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8),
            }
        };
        let alpha = match parts.get(3) {
            Some(a) => (parse_number_percent(a)?.clamp(0.0, 1.0) * 255.0).round() as u8,
            None => 255,
        };
        return Some(Color::rgba(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha));
    }

    named_color(&text)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = digit(0)? * 17;
            let g = digit(1)? * 17;
            let b = digit(2)? * 17;
            let a = if hex.len() == 4 { digit(3)? * 17 } else { 255 };
            Some(Color::rgba(r, g, b, a))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { pair(6)? } else { 255 };
            Some(Color::rgba(pair(0)?, pair(2)?, pair(4)?, a))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    Some(match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "maroon" => Color::rgb(128, 0, 0),
        "olive" => Color::rgb(128, 128, 0),
        "navy" => Color::rgb(0, 0, 128),
        "purple" => Color::rgb(128, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        _ => return None,
    })
}

/// Split at top-level whitespace and commas, keeping parenthesised groups whole
pub fn split_arguments(text: &str) -> Vec<String> {
    split_top_level(text, |c| c.is_whitespace() || c == ',')
}

/// Split at top-level commas
pub fn split_commas(text: &str) -> Vec<String> {
    split_top_level(text, |c| c == ',')
}

fn split_top_level(text: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth == 0 && is_separator(c) {
            let part = current.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_list() {
        let decl = parse_decorators("grayscale(0.5) blur(4px)").unwrap();
        assert_eq!(decl.list.len(), 2);
        assert_eq!(decl.list[0].type_name, "grayscale");
        assert_eq!(decl.list[0].arguments, "0.5");
        assert_eq!(decl.list[1].type_name, "blur");
        assert_eq!(decl.list[1].arguments, "4px");
    }

    #[test]
    fn test_parse_decorators_commas_and_nesting() {
        let decl = parse_decorators("linear-gradient(to right, rgb(1, 2, 3), blue), gradient(vertical red blue)").unwrap();
        assert_eq!(decl.list.len(), 2);
        assert_eq!(decl.list[0].arguments, "to right, rgb(1, 2, 3), blue");
        assert_eq!(decl.list[1].type_name, "gradient");
    }

    #[test]
    fn test_parse_decorators_none_and_errors() {
        assert!(parse_decorators("none").unwrap().list.is_empty());
        assert!(parse_decorators("blur(4px").is_none());
        assert!(parse_decorators("(4px)").is_none());
    }

    #[test]
    fn test_parse_lengths_and_angles() {
        assert_eq!(parse_length("4px"), Some(Length::px(4.0)));
        assert_eq!(parse_length("2rem").map(|l| l.unit), Some(LengthUnit::Rem));
        assert_eq!(parse_length("0"), Some(Length::px(0.0)));
        assert_eq!(parse_length("4"), None);

        let pi = std::f32::consts::PI;
        for text in ["180deg", "0.5turn", "200grad"] {
            let angle = parse_angle(text).unwrap();
            assert!((angle - pi).abs() < 1e-5, "{text} -> {angle}");
        }
        assert_eq!(parse_angle("1rad"), Some(1.0));
        assert_eq!(parse_angle("45"), None);
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(parse_color("#f00"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("#ff000080"), Some(Color::rgba(255, 0, 0, 128)));
        assert_eq!(parse_color("rgba(0, 0, 255, 0.5)"), Some(Color::rgba(0, 0, 255, 128)));
        assert_eq!(parse_color("rgb(0 128 0 / 100%)"), Some(Color::rgb(0, 128, 0)));
        assert_eq!(parse_color("Red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("nonsense"), None);
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("rgb(1, 2, 3) 2px  4px"), vec!["rgb(1, 2, 3)", "2px", "4px"]);
        assert_eq!(split_commas("to right, red 10%, blue"), vec!["to right", "red 10%", "blue"]);
    }

    #[test]
    fn test_parse_property_value() {
        assert_eq!(parse_property_value(PropertyId::Opacity, "50%").unwrap(), PropertyValue::Number(0.5));
        assert!(matches!(
            parse_property_value(PropertyId::Filter, "blur(2px)").unwrap(),
            PropertyValue::Decorators(_)
        ));
        assert!(parse_property_value(PropertyId::Color, "bogus").is_err());
    }
}
