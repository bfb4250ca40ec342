//! Style sheet compilation and matching through the public API

use kestrel_css::{
    parse_stylesheet, PropertyId, PropertyValue, StyleSheet, StyleSheetIndex, CLASS_SPECIFICITY,
    ID_SPECIFICITY, TAG_SPECIFICITY,
};
use kestrel_dom::{Document, ElementId, ElementRef};

const CSS: &str = r#"
div .a > .b { opacity: 0.5; }
#id.cls1.cls2 tag { opacity: 0.25; }
li:nth-child(odd) { filter: grayscale(0.5) blur(4px); }
.panel { decorator: gradient(vertical #ff0000 #0000ff); backdrop-filter: blur(2px); }
:hover { opacity: 0.75; }
"#;

fn sheet() -> StyleSheet {
    parse_stylesheet(CSS, "file:///ui/test.rcss").expect("style sheet should parse")
}

fn leaf_with_property(sheet: &StyleSheet, id: PropertyId) -> Vec<i32> {
    let tree = sheet.tree();
    tree.handles()
        .filter(|&h| tree[h].properties().contains(id))
        .map(|h| tree[h].specificity())
        .collect()
}

#[test]
fn test_specificity_of_compound_chain() {
    let sheet = sheet();
    let specificities = leaf_with_property(&sheet, PropertyId::Opacity);
    let expected = ID_SPECIFICITY + 2 * CLASS_SPECIFICITY + TAG_SPECIFICITY;
    assert_eq!(expected, 1_210_000);
    assert!(specificities.contains(&expected));
}

#[test]
fn test_child_combinator_scenario() {
    let sheet = sheet();
    let mut doc = Document::new("mem://doc");
    let root = doc.root();
    let div = doc.append_element(root, "div");
    let span = doc.append_element(div, "span");
    doc.tree.set_class(span, "a", true);
    let p = doc.append_element(span, "p");
    doc.tree.set_class(p, "b", true);

    let span2 = doc.append_element(div, "span");
    doc.tree.set_class(span2, "a", true);
    let em = doc.append_element(span2, "em");
    let p2 = doc.append_element(em, "p");
    doc.tree.set_class(p2, "b", true);

    let opacity = |id: ElementId| {
        sheet
            .element_definition(doc.get(id).unwrap())
            .get(PropertyId::Opacity)
            .and_then(|p| p.value.as_number())
    };
    assert_eq!(opacity(p), Some(0.5));
    assert_eq!(opacity(p2), None);
}

#[test]
fn test_index_completeness() {
    let sheet = sheet();
    let index: &StyleSheetIndex = sheet.index();
    let tree = sheet.tree();

    for handle in tree.handles() {
        let node = &tree[handle];
        if node.properties().is_empty() {
            continue;
        }
        let selector = node.selector();
        let buckets = [
            index.ids.values().filter(|v| v.contains(&handle)).count(),
            index.classes.values().filter(|v| v.contains(&handle)).count(),
            index.tags.values().filter(|v| v.contains(&handle)).count(),
            usize::from(index.other.contains(&handle)),
        ];
        assert_eq!(buckets.iter().sum::<usize>(), 1, "node {} indexed once", tree.selector_path(handle));

        if !selector.id.is_empty() {
            assert!(index.ids[&selector.id].contains(&handle));
        } else if let Some(first) = selector.classes.first() {
            assert!(index.classes[first].contains(&handle));
        }
    }
}

#[test]
fn test_structural_rules_make_sheet_volatile() {
    let sheet = sheet();
    assert!(sheet.is_structurally_volatile());

    let mut doc = Document::new("mem://doc");
    let root = doc.root();
    let ul = doc.append_element(root, "ul");
    let items: Vec<_> = (0..3).map(|_| doc.append_element(ul, "li")).collect();

    let filtered: Vec<bool> =
        items.iter().map(|&li| sheet.element_definition(doc.get(li).unwrap()).contains(PropertyId::Filter)).collect();
    assert_eq!(filtered, vec![true, false, true]);
}

#[test]
fn test_decorator_properties_and_sources() {
    let sheet = sheet();
    let mut doc = Document::new("mem://doc");
    let root = doc.root();
    let panel = doc.append_element(root, "div");
    doc.tree.set_class(panel, "panel", true);

    let def = sheet.element_definition(doc.get(panel).unwrap());
    let decorator = def.get(PropertyId::Decorator).expect("decorator declared");
    match &decorator.value {
        PropertyValue::Decorators(d) => assert_eq!(d.list[0].type_name, "gradient"),
        other => panic!("unexpected value {other:?}"),
    }
    let source = decorator.source.as_ref().expect("source attached");
    assert_eq!(source.path, "file:///ui/test.rcss");
    assert_eq!(source.line, 5);
    assert!(def.contains(PropertyId::BackdropFilter));
}

#[test]
fn test_pseudo_class_rules_land_in_other_bucket() {
    let sheet = sheet();
    assert_eq!(sheet.index().other.len(), 1);

    let mut doc = Document::new("mem://doc");
    let root = doc.root();
    let button = doc.append_element(root, "button");
    let view: ElementRef<'_> = doc.get(button).unwrap();
    assert_eq!(view.tag_name(), "button");
    assert!(!sheet.element_definition(view).contains(PropertyId::Opacity));

    doc.tree.set_pseudo_class(button, "hover", true);
    let view = doc.get(button).unwrap();
    assert!(view.is_pseudo_class_set("hover"));
    assert!(sheet.element_definition(view).contains(PropertyId::Opacity));
}
