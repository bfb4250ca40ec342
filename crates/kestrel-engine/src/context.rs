//! Context - document, style sheet and decorations
//!
//! `update()` turns the document's mutation journal into restyles and
//! decoration invalidation; `render()` walks the tree depth-first driving
//! each element's decoration through its render stages.

use crate::{Config, EngineError};
use kestrel_css::{
    parse_inline_style, ComputedValues, DecoratorChange, ElementStyle, Property, PropertyId, PropertyValue,
    StyleResolver, StyleSheet,
};
use kestrel_dom::{Document, ElementId, ElementNode, LayoutBox, Mutation, Rectanglei, Transform2D, Vector2f};
use kestrel_render::{
    DecoratedElement, DecoratorFactory, DecoratorSource, ElementDecoration, RenderResources, RenderStage,
    SharedRenderInterface, StyleSheetDecorators,
};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

struct ElementState {
    style: ElementStyle,
    decoration: ElementDecoration,
}

/// The decoration layer's view of one styled element
struct ElementView<'a> {
    node: &'a ElementNode,
    style: &'a ElementStyle,
    decorators: &'a StyleSheetDecorators,
    document_url: &'a str,
}

impl DecoratedElement for ElementView<'_> {
    fn computed_values(&self) -> ComputedValues {
        self.style.computed
    }

    fn local_property(&self, id: PropertyId) -> Option<&Property> {
        self.style.local_property(id)
    }

    fn decorator_source(&self) -> Option<&dyn DecoratorSource> {
        Some(self.decorators)
    }

    fn document_url(&self) -> &str {
        self.document_url
    }

    fn layout_box(&self) -> LayoutBox {
        self.node.layout
    }

    fn transform(&self) -> Option<Transform2D> {
        (!self.node.transform.is_identity()).then_some(self.node.transform)
    }

    fn clip_region(&self) -> Option<Rectanglei> {
        None
    }
}

/// Changes collected from one drain of the mutation journal
#[derive(Default)]
struct PendingChanges {
    restyle: HashSet<ElementId>,
    relayout: HashSet<ElementId>,
}

/// A document with its style sheet and render state
pub struct Context {
    config: Config,
    document: Document,
    style_sheet: StyleSheet,
    factory: Rc<DecoratorFactory>,
    decorators: StyleSheetDecorators,
    resources: Rc<RenderResources>,
    elements: HashMap<ElementId, ElementState>,
    full_restyle: bool,
}

impl Context {
    pub fn new(config: Config, render_interface: SharedRenderInterface) -> Self {
        let factory = Rc::new(DecoratorFactory::with_builtins());
        let resources = Rc::new(RenderResources::new(render_interface, config.viewport));
        tracing::info!("Kestrel {} context created", crate::VERSION);
        Self {
            document: Document::new(&config.base_url),
            style_sheet: StyleSheet::default(),
            decorators: StyleSheetDecorators::new(factory.clone()),
            factory,
            resources,
            elements: HashMap::new(),
            full_restyle: true,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutate the document; changes take effect on the next [`update`](Self::update)
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn style_sheet(&self) -> &StyleSheet {
        &self.style_sheet
    }

    pub fn resources(&self) -> &Rc<RenderResources> {
        &self.resources
    }

    /// Parse `css` and merge it after the current rules
    pub fn add_style_sheet(&mut self, css: &str, source_url: &str) -> Result<(), EngineError> {
        let sheet = StyleSheet::parse(css, source_url)?;
        self.style_sheet.merge(&sheet);
        self.style_sheet_changed();
        Ok(())
    }

    /// Replace the style sheet
    pub fn set_style_sheet(&mut self, sheet: StyleSheet) {
        self.style_sheet = sheet;
        self.style_sheet_changed();
    }

    fn style_sheet_changed(&mut self) {
        self.decorators = StyleSheetDecorators::new(self.factory.clone());
        self.full_restyle = true;
    }

    /// Resize the window; every decoration regenerates its data
    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.config = std::mem::take(&mut self.config).with_viewport(width, height);
        self.resources.set_viewport(self.config.viewport);
        self.full_restyle = true;
        for state in self.elements.values_mut() {
            state.decoration.dirty_decorators_data();
        }
    }

    pub fn element_style(&self, id: ElementId) -> Result<&ElementStyle, EngineError> {
        self.elements.get(&id).map(|state| &state.style).ok_or(EngineError::UnknownElement(id))
    }

    pub fn decoration(&self, id: ElementId) -> Result<&ElementDecoration, EngineError> {
        self.elements.get(&id).map(|state| &state.decoration).ok_or(EngineError::UnknownElement(id))
    }

    /// Number of elements with a computed style
    pub fn num_styled(&self) -> usize {
        self.elements.len()
    }

    /// Apply pending document changes
    pub fn update(&mut self) {
        let mutations = self.document.tree.take_mutations();
        let volatile = self.style_sheet.is_structurally_volatile();
        let mut changes = PendingChanges::default();

        for mutation in &mutations {
            match *mutation {
                Mutation::ClassChanged(id)
                | Mutation::PseudoClassChanged(id)
                | Mutation::IdChanged(id)
                | Mutation::InlineStyleChanged(id) => {
                    changes.restyle.insert(id);
                }
                Mutation::LayoutChanged(id) => {
                    changes.relayout.insert(id);
                }
                Mutation::ChildAdded { parent, child } => {
                    changes.restyle.insert(child);
                    if volatile {
                        // `:empty` depends on the parent's child list
                        changes.restyle.insert(parent);
                        changes.restyle.extend(self.document.tree.children(parent));
                    }
                }
                Mutation::ChildRemoved { parent, .. } => {
                    if volatile {
                        changes.restyle.insert(parent);
                        changes.restyle.extend(self.document.tree.children(parent));
                    }
                }
            }
        }

        let document = &self.document;
        let before = self.elements.len();
        self.elements.retain(|id, _| document.is_attached(*id));
        let removed = before - self.elements.len();

        let root = self.document.root();
        let force = std::mem::take(&mut self.full_restyle);
        self.update_subtree(root, None, force, &changes);

        tracing::debug!(
            mutations = mutations.len(),
            restyled = changes.restyle.len(),
            removed,
            full = force,
            "Context updated"
        );
    }

    fn update_subtree(
        &mut self,
        id: ElementId,
        parent: Option<ComputedValues>,
        force: bool,
        changes: &PendingChanges,
    ) {
        let force = force || changes.restyle.contains(&id) || !self.elements.contains_key(&id);
        let relayout = changes.relayout.contains(&id);
        // Percentage radii resolve against the layout box, so a relayout
        // restyles the element itself but not its subtree
        if force || relayout {
            self.restyle_element(id, parent.as_ref());
        }
        if relayout {
            if let Some(state) = self.elements.get_mut(&id) {
                state.decoration.dirty_decorators_data();
            }
        }

        let computed = self.elements.get(&id).map(|state| state.style.computed);
        let children: Vec<ElementId> = self.document.tree.children(id).collect();
        for child in children {
            self.update_subtree(child, computed, force, changes);
        }
    }

    fn restyle_element(&mut self, id: ElementId, parent: Option<&ComputedValues>) {
        let Some(element) = self.document.get(id) else {
            return;
        };

        let inline = element.node().inline_style.as_deref().and_then(|text| match parse_inline_style(text) {
            Ok(dictionary) => Some(dictionary),
            Err(err) => {
                tracing::warn!(source = %self.document.url(), element = ?id, "{err}");
                None
            }
        });

        let viewport = Vector2f::new(self.config.viewport.x as f32, self.config.viewport.y as f32);
        let style = StyleResolver::new(&self.style_sheet, viewport).compute_style(element, inline.as_ref(), parent);

        match self.elements.entry(id) {
            Entry::Occupied(mut entry) => {
                let state = entry.get_mut();
                match style.decorator_change(&state.style) {
                    DecoratorChange::Decorators => state.decoration.dirty_decorators(),
                    DecoratorChange::Data => state.decoration.dirty_decorators_data(),
                    DecoratorChange::None => {}
                }
                state.style = style;
            }
            Entry::Vacant(entry) => {
                let mut decoration = ElementDecoration::new(self.resources.clone());
                decoration.dirty_decorators();
                entry.insert(ElementState { style, decoration });
            }
        }
    }

    /// Paint the document
    ///
    /// Each element goes through `Enter`, `Decoration`, its children, then
    /// `Exit`. Elements with `display: none` are skipped with their subtree.
    pub fn render(&mut self) {
        let root = self.document.root();
        self.render_element(root);
    }

    fn render_element(&mut self, id: ElementId) {
        let hidden = self.elements.get(&id).is_none_or(|state| {
            matches!(
                state.style.local_property(PropertyId::Display).map(|p| &p.value),
                Some(PropertyValue::Keyword(k)) if k == "none"
            )
        });
        if hidden {
            return;
        }

        self.render_stage(id, RenderStage::Enter);
        self.render_stage(id, RenderStage::Decoration);
        let children: Vec<ElementId> = self.document.tree.children(id).collect();
        for child in children {
            self.render_element(child);
        }
        self.render_stage(id, RenderStage::Exit);
    }

    fn render_stage(&mut self, id: ElementId, stage: RenderStage) {
        let Some(node) = self.document.tree.element(id) else {
            return;
        };
        let Some(ElementState { style, decoration }) = self.elements.get_mut(&id) else {
            return;
        };
        let view = ElementView { node, style, decorators: &self.decorators, document_url: self.document.url() };
        decoration.render_decorators(&view, stage);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("elements", &self.elements.len())
            .field("resources", &self.resources)
            .finish()
    }
}
