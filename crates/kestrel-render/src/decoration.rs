//! Element decoration
//!
//! Owns the decorators instanced for one element and their per-element data,
//! and drives the layer-stack protocol that composites backgrounds,
//! backdrop-filters, filters and mask-images around the element's paint.
//!
//! Decorators are stored contiguously by class in the order
//! Background, BackdropFilter, Filter, MaskImage.

use crate::decorator::{DecoratedElement, Decorator, DecoratorClass};
use crate::interface::RenderCommand;
use crate::pool::{DecoratorDataHandle, RenderResources};
use crate::utilities::{
    apply_active_clip_region, apply_transform, disable_clipping_region, element_region_in_window_space,
    set_clipping_region,
};
use kestrel_css::PropertySource;
use kestrel_dom::{BoxArea, Vector2f, Vector2i};
use std::fmt;
use std::rc::Rc;

/// Point in the depth-first paint traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Before the element and its children paint
    Enter,
    /// The element's own paint
    Decoration,
    /// After the children painted
    Exit,
}

struct DecoratorHandle {
    decorator: Rc<dyn Decorator>,
    data: Option<DecoratorDataHandle>,
    class: DecoratorClass,
}

/// Decorators and decorator data of one element
pub struct ElementDecoration {
    resources: Rc<RenderResources>,
    decorators: Vec<DecoratorHandle>,
    num_backgrounds: usize,
    num_backdrop_filters: usize,
    num_filters: usize,
    num_mask_images: usize,
    decorators_dirty: bool,
    decorators_data_dirty: bool,
}

impl ElementDecoration {
    pub fn new(resources: Rc<RenderResources>) -> Self {
        Self {
            resources,
            decorators: Vec::new(),
            num_backgrounds: 0,
            num_backdrop_filters: 0,
            num_filters: 0,
            num_mask_images: 0,
            decorators_dirty: false,
            decorators_data_dirty: false,
        }
    }

    /// Re-instance decorators on the next render
    pub fn dirty_decorators(&mut self) {
        self.decorators_dirty = true;
    }

    /// Regenerate decorator data on the next render
    pub fn dirty_decorators_data(&mut self) {
        self.decorators_data_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.decorators_dirty
    }

    pub fn is_data_dirty(&self) -> bool {
        self.decorators_data_dirty
    }

    /// Number of decorators of one class
    pub fn count(&self, class: DecoratorClass) -> usize {
        match class {
            DecoratorClass::Background => self.num_backgrounds,
            DecoratorClass::BackdropFilter => self.num_backdrop_filters,
            DecoratorClass::Filter => self.num_filters,
            DecoratorClass::MaskImage => self.num_mask_images,
        }
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Decorators in storage order with their class
    pub fn decorators(&self) -> impl Iterator<Item = (DecoratorClass, &Rc<dyn Decorator>)> {
        self.decorators.iter().map(|handle| (handle.class, &handle.decorator))
    }

    /// Number of decorators currently holding element data
    pub fn num_generated(&self) -> usize {
        self.decorators.iter().filter(|handle| handle.data.is_some()).count()
    }

    /// Instance decorators if the decorator list is dirty
    pub fn instance_decorators(&mut self, element: &dyn DecoratedElement) {
        if self.decorators_dirty {
            self.decorators_dirty = false;
            self.decorators_data_dirty = true;
            self.reload_decorators(element);
        }
    }

    /// Release everything, then instance the element's decorator properties
    pub fn reload_decorators(&mut self, element: &dyn DecoratedElement) {
        self.release_decorators();
        self.num_backgrounds = 0;
        self.num_backdrop_filters = 0;
        self.num_filters = 0;
        self.num_mask_images = 0;

        if !element.computed_values().has_decoration() {
            return;
        }

        for class in DecoratorClass::ALL {
            let Some(declaration) = element.local_property(class.property()).and_then(|p| p.value.as_decorators())
            else {
                continue;
            };
            let Some(decorator_source) = element.decorator_source() else {
                return;
            };

            let property_source = element.local_property(class.property()).and_then(|p| p.source.clone());
            let document_source;
            let source = match property_source.as_deref() {
                Some(source) => source,
                None => {
                    document_source = PropertySource::new(element.document_url(), 0, "");
                    &document_source
                }
            };

            let list = decorator_source.instance_decorators(class, declaration, source);
            match class {
                DecoratorClass::Background => self.num_backgrounds = list.len(),
                DecoratorClass::BackdropFilter => self.num_backdrop_filters = list.len(),
                DecoratorClass::Filter => self.num_filters = list.len(),
                DecoratorClass::MaskImage => self.num_mask_images = list.len(),
            }
            self.decorators.extend(list.into_iter().map(|decorator| DecoratorHandle { decorator, data: None, class }));
        }

        tracing::trace!(
            backgrounds = self.num_backgrounds,
            backdrop_filters = self.num_backdrop_filters,
            filters = self.num_filters,
            mask_images = self.num_mask_images,
            "Reloaded decorators"
        );
    }

    /// Regenerate the element data of every decorator if it is dirty
    pub fn reload_decorators_data(&mut self, element: &dyn DecoratedElement) {
        if !self.decorators_data_dirty {
            return;
        }
        self.decorators_data_dirty = false;

        for handle in &mut self.decorators {
            if let Some(data) = handle.data.take() {
                handle.decorator.release_element_data(data, &self.resources);
            }
            handle.data = handle.decorator.generate_element_data(element, handle.class.painting_area(), &self.resources);
        }
    }

    fn release_decorators(&mut self) {
        for handle in self.decorators.drain(..) {
            if let Some(data) = handle.data {
                handle.decorator.release_element_data(data, &self.resources);
            }
        }
    }

    fn render_range(&self, element: &dyn DecoratedElement, start: usize, count: usize) {
        for handle in &self.decorators[start..start + count] {
            if let Some(data) = handle.data {
                handle.decorator.render_element(element, data, &self.resources);
            }
        }
    }

    fn command(&self, command: RenderCommand, offset: Vector2i, size: Vector2i) {
        self.resources.render_interface().execute_render_command(command, offset, size);
    }

    /// Render the decorators belonging to `stage`
    pub fn render_decorators(&mut self, element: &dyn DecoratedElement, stage: RenderStage) {
        self.instance_decorators(element);
        self.reload_decorators_data(element);

        debug_assert_eq!(
            self.num_backgrounds + self.num_backdrop_filters + self.num_filters + self.num_mask_images,
            self.decorators.len()
        );

        if self.num_backgrounds > 0 && stage == RenderStage::Decoration {
            for handle in self.decorators[..self.num_backgrounds].iter().rev() {
                if let Some(data) = handle.data {
                    handle.decorator.render_element(element, data, &self.resources);
                }
            }
        }

        if self.num_backdrop_filters == 0 && self.num_filters == 0 && self.num_mask_images == 0 {
            return;
        }

        let viewport = self.resources.viewport();

        if self.num_backdrop_filters > 0 && stage == RenderStage::Enter {
            tracing::trace!(count = self.num_backdrop_filters, "Rendering backdrop filters");
            {
                let mut render_interface = self.resources.render_interface();
                apply_transform(element, &mut *render_interface);
                set_clipping_region(element, &mut *render_interface, true, viewport);
            }

            let region = element_region_in_window_space(element, BoxArea::Border, Vector2f::ZERO, Vector2f::ZERO, viewport);
            self.command(RenderCommand::StackToFilter, region.position, region.size);

            self.render_range(element, self.num_backgrounds, self.num_backdrop_filters);

            self.command(RenderCommand::FilterToStack, Vector2i::ZERO, Vector2i::ZERO);
            set_clipping_region(element, &mut *self.resources.render_interface(), false, viewport);
        }

        if self.num_filters == 0 && self.num_mask_images == 0 {
            return;
        }

        match stage {
            RenderStage::Enter => self.command(RenderCommand::StackPush, Vector2i::ZERO, Vector2i::ZERO),
            RenderStage::Exit => {
                tracing::trace!(filters = self.num_filters, mask_images = self.num_mask_images, "Compositing filters");
                disable_clipping_region(&mut *self.resources.render_interface());

                let first_filter = self.num_backgrounds + self.num_backdrop_filters;
                let (max_top_left, max_bottom_right) = self.decorators[first_filter..first_filter + self.num_filters]
                    .iter()
                    .map(|handle| handle.decorator.clip_extension())
                    .fold((Vector2f::ZERO, Vector2f::ZERO), |(tl, br), (top_left, bottom_right)| {
                        (tl.max(top_left), br.max(bottom_right))
                    });

                let region =
                    element_region_in_window_space(element, BoxArea::Border, max_top_left, max_bottom_right, viewport);
                self.command(RenderCommand::StackToFilter, region.position, region.size);

                self.render_range(element, first_filter, self.num_filters);

                self.command(RenderCommand::StackPop, Vector2i::ZERO, Vector2i::ZERO);

                if self.num_mask_images > 0 {
                    self.command(RenderCommand::StackPush, Vector2i::ZERO, Vector2i::ZERO);
                    self.render_range(element, first_filter + self.num_filters, self.num_mask_images);
                    self.command(RenderCommand::StackToMask, region.position, region.size);
                    self.command(RenderCommand::StackPop, Vector2i::ZERO, Vector2i::ZERO);
                }

                self.command(RenderCommand::FilterToStack, Vector2i::ZERO, Vector2i::ZERO);
                apply_active_clip_region(element, &mut *self.resources.render_interface());
            }
            RenderStage::Decoration => {}
        }
    }
}

impl Drop for ElementDecoration {
    fn drop(&mut self) {
        self.release_decorators();
    }
}

impl fmt::Debug for ElementDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDecoration")
            .field("backgrounds", &self.num_backgrounds)
            .field("backdrop_filters", &self.num_backdrop_filters)
            .field("filters", &self.num_filters)
            .field("mask_images", &self.num_mask_images)
            .field("decorators_dirty", &self.decorators_dirty)
            .field("decorators_data_dirty", &self.decorators_data_dirty)
            .finish()
    }
}
