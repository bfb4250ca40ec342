//! Document changes through restyle and decoration to render calls

use kestrel_dom::{LayoutBox, Vector2f};
use kestrel_engine::{Config, Context, EngineError, RecordingRenderInterface};
use kestrel_render::{DecoratorClass, RenderCall, RenderCommand};
use std::cell::RefCell;
use std::rc::Rc;

const SHEET: &str = r#"
div.card { filter: grayscale(0.5); }
div.frosted { backdrop-filter: blur(2px); }
div.banner { decorator: gradient(vertical red blue); }
.hidden { display: none; }
"#;

fn setup() -> (Context, Rc<RefCell<RecordingRenderInterface>>) {
    setup_with(SHEET)
}

fn setup_with(css: &str) -> (Context, Rc<RefCell<RecordingRenderInterface>>) {
    let recorder = Rc::new(RefCell::new(RecordingRenderInterface::new()));
    let mut context = Context::new(Config::default().with_viewport(800, 600), recorder.clone());
    context.add_style_sheet(css, "mem://app.rcss").unwrap();
    (context, recorder)
}

fn append_div(context: &mut Context, parent: kestrel_engine::ElementId) -> kestrel_engine::ElementId {
    let document = context.document_mut();
    let div = document.append_element(parent, "div");
    document
        .tree
        .set_layout(div, LayoutBox::new(Vector2f::new(10.0, 10.0), Vector2f::new(100.0, 40.0)));
    div
}

#[test]
fn test_class_change_enables_filter() {
    let (mut context, recorder) = setup();
    let root = context.document().root();
    let div = append_div(&mut context, root);

    context.update();
    context.render();
    assert!(recorder.borrow().commands().is_empty());

    context.document_mut().tree.set_class(div, "card", true);
    context.update();
    recorder.borrow_mut().take_calls();
    context.render();

    let recorder = recorder.borrow();
    assert_eq!(
        recorder.commands(),
        vec![RenderCommand::StackPush, RenderCommand::StackToFilter, RenderCommand::StackPop, RenderCommand::FilterToStack]
    );
    assert_eq!(recorder.rendered_effects(), vec!["grayscale".to_string()]);
    assert_eq!(context.decoration(div).unwrap().count(DecoratorClass::Filter), 1);
}

#[test]
fn test_nested_filters_composite_inside_out() {
    let (mut context, recorder) = setup();
    let root = context.document().root();
    let outer = append_div(&mut context, root);
    let inner = append_div(&mut context, outer);
    context.document_mut().tree.set_class(outer, "card", true);
    context.document_mut().tree.set_class(inner, "frosted", true);

    context.update();
    context.render();

    use RenderCommand::*;
    assert_eq!(
        recorder.borrow().commands(),
        vec![
            // outer Enter
            StackPush,
            // inner Enter: backdrop pass
            StackToFilter,
            FilterToStack,
            // outer Exit
            StackToFilter,
            StackPop,
            FilterToStack,
        ]
    );
    assert_eq!(recorder.borrow().rendered_effects(), vec!["blur".to_string(), "grayscale".to_string()]);
}

#[test]
fn test_display_none_skips_subtree() {
    let (mut context, recorder) = setup();
    let root = context.document().root();
    let outer = append_div(&mut context, root);
    let inner = append_div(&mut context, outer);
    context.document_mut().tree.set_class(inner, "card", true);
    context.document_mut().tree.set_class(outer, "hidden", true);

    context.update();
    context.render();
    assert!(recorder.borrow().commands().is_empty());

    context.document_mut().tree.set_class(outer, "hidden", false);
    context.update();
    context.render();
    assert_eq!(recorder.borrow().rendered_effects(), vec!["grayscale".to_string()]);
}

#[test]
fn test_inline_style_overrides_sheet() {
    let (mut context, recorder) = setup();
    let root = context.document().root();
    let div = append_div(&mut context, root);
    context.document_mut().tree.set_class(div, "card", true);
    context.document_mut().tree.set_inline_style(div, Some("filter: sepia(1)"));

    context.update();
    context.render();
    assert_eq!(recorder.borrow().rendered_effects(), vec!["sepia".to_string()]);
}

#[test]
fn test_layout_change_regenerates_data() {
    let (mut context, recorder) = setup();
    let root = context.document().root();
    let div = append_div(&mut context, root);
    context.document_mut().tree.set_class(div, "banner", true);

    context.update();
    context.render();
    assert!(!context.decoration(div).unwrap().is_data_dirty());

    context
        .document_mut()
        .tree
        .set_layout(div, LayoutBox::new(Vector2f::new(0.0, 0.0), Vector2f::new(300.0, 40.0)));
    context.update();
    assert!(context.decoration(div).unwrap().is_data_dirty());
    assert!(!context.decoration(div).unwrap().is_dirty());

    recorder.borrow_mut().take_calls();
    context.render();
    let calls = recorder.borrow_mut().take_calls();
    assert!(calls.iter().any(|call| matches!(call, RenderCall::ReleaseGeometry(_))));
    assert!(calls.iter().any(|call| matches!(call, RenderCall::CompileGeometry { .. })));
    assert_eq!(recorder.borrow().live_geometries(), 1);
}

#[test]
fn test_removed_element_releases_resources() {
    let (mut context, recorder) = setup();
    let root = context.document().root();
    let outer = append_div(&mut context, root);
    let inner = append_div(&mut context, outer);
    context.document_mut().tree.set_class(outer, "banner", true);
    context.document_mut().tree.set_class(inner, "card", true);

    context.update();
    context.render();
    assert_eq!(context.num_styled(), 3);
    assert!(!recorder.borrow().is_clean());

    context.document_mut().tree.remove_child(root, outer);
    context.update();

    assert_eq!(context.num_styled(), 1);
    assert!(recorder.borrow().is_clean());
    assert!(matches!(context.element_style(inner), Err(EngineError::UnknownElement(id)) if id == inner));
}

#[test]
fn test_viewport_change_dirties_data() {
    let (mut context, _recorder) = setup();
    let root = context.document().root();
    let div = append_div(&mut context, root);
    context.document_mut().tree.set_class(div, "card", true);

    context.update();
    context.render();
    assert!(!context.decoration(div).unwrap().is_data_dirty());

    context.set_viewport(400, 300);
    assert!(context.decoration(div).unwrap().is_data_dirty());
    assert_eq!(context.resources().viewport(), kestrel_dom::Vector2i::new(400, 300));
}

#[test]
fn test_child_list_change_restyles_empty_parent() {
    let (mut context, recorder) = setup_with("div:empty { filter: grayscale(1); }");
    let root = context.document().root();
    let div = append_div(&mut context, root);

    context.update();
    context.render();
    assert_eq!(recorder.borrow().rendered_effects(), vec!["grayscale".to_string()]);

    let span = context.document_mut().append_element(div, "span");
    context.update();
    recorder.borrow_mut().take_calls();
    context.render();
    assert!(recorder.borrow().rendered_effects().is_empty());
    assert_eq!(context.decoration(div).unwrap().count(DecoratorClass::Filter), 0);

    context.document_mut().tree.remove_child(div, span);
    context.update();
    recorder.borrow_mut().take_calls();
    context.render();
    assert_eq!(recorder.borrow().rendered_effects(), vec!["grayscale".to_string()]);
}

#[test]
fn test_layout_change_resolves_percentage_radius() {
    let (mut context, _recorder) = setup_with("div { border-radius: 10%; }");
    let root = context.document().root();
    let div = append_div(&mut context, root);

    context.update();
    assert_eq!(context.element_style(div).unwrap().computed.border_radius, [10.0; 4]);

    context
        .document_mut()
        .tree
        .set_layout(div, LayoutBox::new(Vector2f::new(10.0, 10.0), Vector2f::new(300.0, 40.0)));
    context.update();
    assert_eq!(context.element_style(div).unwrap().computed.border_radius, [30.0; 4]);
}
