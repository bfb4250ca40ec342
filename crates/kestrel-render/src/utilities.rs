//! Window-space regions and clipping

use crate::decorator::DecoratedElement;
use crate::interface::RenderInterface;
use kestrel_dom::{BoxArea, Rectanglef, Rectanglei, Vector2f, Vector2i};

/// Bounding box of an element area in window space, before clamping
pub fn bounding_box(
    element: &dyn DecoratedElement,
    area: BoxArea,
    expand_top_left: Vector2f,
    expand_bottom_right: Vector2f,
) -> Rectanglef {
    let region = element.layout_box().rectangle(area).extend(expand_top_left, expand_bottom_right);
    match element.transform() {
        Some(transform) if !transform.is_identity() => transform.bounding_box(&region),
        _ => region,
    }
}

/// Pixel region covered by an element area, clamped to the viewport
///
/// The area is grown by the given extensions, transformed, and snapped
/// outwards to whole pixels.
pub fn element_region_in_window_space(
    element: &dyn DecoratedElement,
    area: BoxArea,
    expand_top_left: Vector2f,
    expand_bottom_right: Vector2f,
    viewport: Vector2i,
) -> Rectanglei {
    let region = bounding_box(element, area, expand_top_left, expand_bottom_right).expand_to_pixel_grid();
    let size = region.size();
    let region = Rectanglei::new(region.min.x as i32, region.min.y as i32, size.x as i32, size.y as i32);
    region.intersect(&Rectanglei::new(0, 0, viewport.x, viewport.y))
}

/// Apply the element's transform, or reset to identity
pub fn apply_transform(element: &dyn DecoratedElement, render_interface: &mut dyn RenderInterface) {
    render_interface.set_transform(element.transform().as_ref());
}

/// Clip to the ambient region, and to the element's own border box when
/// `force_clip_self` is set
///
/// Returns whether a scissor region is active afterwards.
pub fn set_clipping_region(
    element: &dyn DecoratedElement,
    render_interface: &mut dyn RenderInterface,
    force_clip_self: bool,
    viewport: Vector2i,
) -> bool {
    let own = force_clip_self
        .then(|| element_region_in_window_space(element, BoxArea::Border, Vector2f::ZERO, Vector2f::ZERO, viewport));
    let region = match (element.clip_region(), own) {
        (Some(ambient), Some(own)) => Some(ambient.intersect(&own)),
        (ambient, own) => ambient.or(own),
    };

    match region {
        Some(region) => {
            render_interface.enable_scissor_region(true);
            render_interface.set_scissor_region(region);
            true
        }
        None => {
            render_interface.enable_scissor_region(false);
            false
        }
    }
}

pub fn disable_clipping_region(render_interface: &mut dyn RenderInterface) {
    render_interface.enable_scissor_region(false);
}

/// Restore the clip region inherited from the element's ancestors
pub fn apply_active_clip_region(element: &dyn DecoratedElement, render_interface: &mut dyn RenderInterface) {
    match element.clip_region() {
        Some(region) => {
            render_interface.enable_scissor_region(true);
            render_interface.set_scissor_region(region);
        }
        None => render_interface.enable_scissor_region(false),
    }
}
