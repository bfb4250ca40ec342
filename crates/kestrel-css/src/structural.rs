//! Structural pseudo-classes
//!
//! `:nth-child(An+B)` and friends. These depend on an element's position
//! among its siblings, which is why rules using them make a sheet
//! structurally volatile.

use crate::element::SelectorElement;

/// Structural selector algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    NthChild,
    NthLastChild,
    NthOfType,
    NthLastOfType,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
}

/// Structural selector with its An+B parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructuralSelector {
    pub kind: StructuralKind,
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl StructuralSelector {
    pub fn new(kind: StructuralKind, a: i32, b: i32) -> Self {
        Self { kind, a, b }
    }

    /// Parse a pseudo-class name and optional argument
    ///
    /// Returns `None` for names that are not structural.
    pub fn parse(name: &str, argument: Option<&str>) -> Option<Self> {
        let kind = match name {
            "nth-child" => StructuralKind::NthChild,
            "nth-last-child" => StructuralKind::NthLastChild,
            "nth-of-type" => StructuralKind::NthOfType,
            "nth-last-of-type" => StructuralKind::NthLastOfType,
            "first-child" => StructuralKind::FirstChild,
            "last-child" => StructuralKind::LastChild,
            "only-child" => StructuralKind::OnlyChild,
            "first-of-type" => StructuralKind::FirstOfType,
            "last-of-type" => StructuralKind::LastOfType,
            "only-of-type" => StructuralKind::OnlyOfType,
            "empty" => StructuralKind::Empty,
            _ => return None,
        };

        let takes_argument = matches!(
            kind,
            StructuralKind::NthChild
                | StructuralKind::NthLastChild
                | StructuralKind::NthOfType
                | StructuralKind::NthLastOfType
        );
        let (a, b) = match (takes_argument, argument) {
            (true, Some(arg)) => parse_nth(arg)?,
            (true, None) | (false, Some(_)) => return None,
            (false, None) => (0, 1),
        };
        Some(Self { kind, a, b })
    }

    /// Evaluate against an element's position among its siblings
    pub fn is_applicable<E: SelectorElement>(&self, element: E) -> bool {
        // Elements without a parent have no siblings to be positioned among;
        // `:empty` only looks at the element's own children
        if self.kind != StructuralKind::Empty && element.parent_element().is_none() {
            return false;
        }

        let tag = element.tag_name();
        let before = || count_siblings(element, E::prev_sibling_element, |_| true);
        let after = || count_siblings(element, E::next_sibling_element, |_| true);
        let before_of_type = || count_siblings(element, E::prev_sibling_element, |s| s.tag_name() == tag);
        let after_of_type = || count_siblings(element, E::next_sibling_element, |s| s.tag_name() == tag);

        match self.kind {
            StructuralKind::NthChild => nth_matches(self.a, self.b, before() + 1),
            StructuralKind::NthLastChild => nth_matches(self.a, self.b, after() + 1),
            StructuralKind::NthOfType => nth_matches(self.a, self.b, before_of_type() + 1),
            StructuralKind::NthLastOfType => nth_matches(self.a, self.b, after_of_type() + 1),
            StructuralKind::FirstChild => before() == 0,
            StructuralKind::LastChild => after() == 0,
            StructuralKind::OnlyChild => before() == 0 && after() == 0,
            StructuralKind::FirstOfType => before_of_type() == 0,
            StructuralKind::LastOfType => after_of_type() == 0,
            StructuralKind::OnlyOfType => before_of_type() == 0 && after_of_type() == 0,
            StructuralKind::Empty => !element.has_children(),
        }
    }
}

fn count_siblings<E: SelectorElement>(element: E, step: fn(&E) -> Option<E>, filter: impl Fn(&E) -> bool) -> i32 {
    let mut count = 0;
    let mut current = step(&element);
    while let Some(sibling) = current {
        if filter(&sibling) {
            count += 1;
        }
        current = step(&sibling);
    }
    count
}

/// Check if 1-based `index` is of the form An+B for some n >= 0
///
/// Evaluated in `i64` since `A` and `B` may be anywhere in the `i32` range.
pub fn nth_matches(a: i32, b: i32, index: i32) -> bool {
    let (a, b, index) = (i64::from(a), i64::from(b), i64::from(index));
    if a == 0 {
        return index == b;
    }
    let diff = index - b;
    if a > 0 {
        diff >= 0 && diff % a == 0
    } else {
        diff <= 0 && diff % a == 0
    }
}

/// Parse `odd`, `even`, `3`, `2n+1`, `-n+3`
pub fn parse_nth(text: &str) -> Option<(i32, i32)> {
    let text: String = text.trim().to_ascii_lowercase().chars().filter(|c| !c.is_whitespace()).collect();

    match text.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }

    if let Ok(b) = text.parse::<i32>() {
        return Some((0, b));
    }

    let n_pos = text.find('n')?;
    let a = match &text[..n_pos] {
        "" | "+" => 1,
        "-" => -1,
        a => a.parse().ok()?,
    };
    let rest = &text[n_pos + 1..];
    let b = if rest.is_empty() { 0 } else { rest.trim_start_matches('+').parse().ok()? };
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_dom::{DomTree, ElementId, ElementRef};

    fn list(tags: &[&str]) -> (DomTree, Vec<ElementId>) {
        let mut tree = DomTree::new();
        let parent = tree.create_element("ul");
        let children = tags
            .iter()
            .map(|tag| {
                let id = tree.create_element(tag);
                tree.append_child(parent, id);
                id
            })
            .collect();
        (tree, children)
    }

    fn applies(tree: &DomTree, id: ElementId, selector: &StructuralSelector) -> bool {
        ElementRef::new(tree, id).is_some_and(|e| selector.is_applicable(e))
    }

    #[test]
    fn test_parse_nth() {
        assert_eq!(parse_nth("odd"), Some((2, 1)));
        assert_eq!(parse_nth("even"), Some((2, 0)));
        assert_eq!(parse_nth("3"), Some((0, 3)));
        assert_eq!(parse_nth("2n + 1"), Some((2, 1)));
        assert_eq!(parse_nth("-n+3"), Some((-1, 3)));
        assert_eq!(parse_nth("n"), Some((1, 0)));
        assert_eq!(parse_nth("x"), None);
    }

    #[test]
    fn test_nth_matches() {
        assert!(nth_matches(2, 1, 1));
        assert!(!nth_matches(2, 1, 2));
        assert!(nth_matches(-1, 3, 3));
        assert!(!nth_matches(-1, 3, 4));
        assert!(nth_matches(0, 2, 2));
    }

    #[test]
    fn test_nth_child() {
        let (tree, items) = list(&["li", "li", "li", "li"]);
        let odd = StructuralSelector::parse("nth-child", Some("odd")).unwrap();
        let matched: Vec<bool> = items.iter().map(|&id| applies(&tree, id, &odd)).collect();
        assert_eq!(matched, vec![true, false, true, false]);

        let last_two = StructuralSelector::parse("nth-last-child", Some("-n+2")).unwrap();
        let matched: Vec<bool> = items.iter().map(|&id| applies(&tree, id, &last_two)).collect();
        assert_eq!(matched, vec![false, false, true, true]);
    }

    #[test]
    fn test_of_type() {
        let (tree, items) = list(&["p", "span", "p", "span"]);
        let first_span = StructuralSelector::parse("first-of-type", None).unwrap();
        assert!(applies(&tree, items[1], &first_span));
        assert!(!applies(&tree, items[3], &first_span));

        let second_p = StructuralSelector::parse("nth-of-type", Some("2")).unwrap();
        assert!(applies(&tree, items[2], &second_p));
        assert!(!applies(&tree, items[0], &second_p));
    }

    #[test]
    fn test_first_last_only_empty() {
        let (tree, items) = list(&["li", "li"]);
        let first = StructuralSelector::parse("first-child", None).unwrap();
        let last = StructuralSelector::parse("last-child", None).unwrap();
        let only = StructuralSelector::parse("only-child", None).unwrap();
        let empty = StructuralSelector::parse("empty", None).unwrap();

        assert!(applies(&tree, items[0], &first));
        assert!(applies(&tree, items[1], &last));
        assert!(!applies(&tree, items[0], &only));
        assert!(applies(&tree, items[0], &empty));
    }

    #[test]
    fn test_extreme_offsets_do_not_overflow() {
        let (tree, items) = list(&["li", "li"]);
        let selector = StructuralSelector::parse("nth-child", Some("n-2147483648")).unwrap();
        assert_eq!((selector.a, selector.b), (1, i32::MIN));
        assert!(applies(&tree, items[0], &selector));

        let reversed = StructuralSelector::parse("nth-child", Some("-n+2147483647")).unwrap();
        assert!(applies(&tree, items[1], &reversed));
        assert!(!nth_matches(i32::MIN, i32::MAX, 1));
        assert!(nth_matches(-1, i32::MIN, i32::MIN));
    }

    #[test]
    fn test_empty_without_parent() {
        let mut tree = DomTree::new();
        let detached = tree.create_element("div");
        let empty = StructuralSelector::parse("empty", None).unwrap();
        let first = StructuralSelector::parse("first-child", None).unwrap();
        assert!(applies(&tree, detached, &empty));
        assert!(!applies(&tree, detached, &first));

        let child = tree.create_element("span");
        tree.append_child(detached, child);
        assert!(!applies(&tree, detached, &empty));
    }

    #[test]
    fn test_parse_rejects_non_structural() {
        assert_eq!(StructuralSelector::parse("hover", None), None);
        assert_eq!(StructuralSelector::parse("nth-child", None), None);
        assert_eq!(StructuralSelector::parse("first-child", Some("2")), None);
    }
}
