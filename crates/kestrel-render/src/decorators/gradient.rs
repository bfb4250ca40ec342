//! `gradient(horizontal|vertical start-color stop-color)`
//!
//! Two-color gradient baked into vertex colors.

use crate::decorator::{DecoratedElement, Decorator, DecoratorClasses, DecoratorInstancer};
use crate::interface::generate_quad;
use crate::pool::{BasicEffectElementData, DecoratorDataHandle, RenderResources};
use crate::DecoratorError;
use kestrel_css::values::{parse_color, split_arguments};
use kestrel_css::Color;
use kestrel_dom::BoxArea;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientDecorator {
    direction: GradientDirection,
    start: Color,
    stop: Color,
}

impl GradientDecorator {
    pub fn new(direction: GradientDirection, start: Color, stop: Color) -> Self {
        Self { direction, start, stop }
    }
}

fn lerp_color(t: f32, a: Color, b: Color) -> Color {
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color::rgba(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b), channel(a.a, b.a))
}

impl Decorator for GradientDecorator {
    fn generate_element_data(
        &self,
        element: &dyn DecoratedElement,
        painting_area: BoxArea,
        resources: &RenderResources,
    ) -> Option<DecoratorDataHandle> {
        let layout = element.layout_box();
        let opacity = element.computed_values().opacity;
        let start = self.start.with_opacity(opacity);
        let stop = self.stop.with_opacity(opacity);

        let padding_offset = layout.position(BoxArea::Padding);
        let padding_size = layout.size(BoxArea::Padding);

        // TODO: follow the computed border radii instead of painting a plain quad
        let (mut vertices, indices) =
            generate_quad(layout.position(painting_area), layout.size(painting_area), Color::WHITE);
        for vertex in &mut vertices {
            let (position, extent, origin) = match self.direction {
                GradientDirection::Horizontal => (vertex.position.x, padding_size.x, padding_offset.x),
                GradientDirection::Vertical => (vertex.position.y, padding_size.y, padding_offset.y),
            };
            let t = if extent > 0.0 { ((position - origin) / extent).clamp(0.0, 1.0) } else { 0.0 };
            vertex.colour = lerp_color(t, start, stop);
        }

        let geometry = resources.render_interface().compile_geometry(&vertices, &indices, None);
        resources.store(BasicEffectElementData { effect: None, geometry })
    }

    fn render_element(&self, element: &dyn DecoratedElement, data: DecoratorDataHandle, resources: &RenderResources) {
        if let Some(geometry) = resources.data(data).and_then(|d| d.geometry) {
            let offset = element.layout_box().absolute_offset(BoxArea::Border);
            resources.render_interface().render_geometry(geometry, offset);
        }
    }
}

#[derive(Debug, Default)]
pub struct GradientInstancer;

impl DecoratorInstancer for GradientInstancer {
    fn classes(&self) -> DecoratorClasses {
        DecoratorClasses::BACKGROUND | DecoratorClasses::MASK_IMAGE
    }

    fn instance_decorator(&self, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError> {
        let invalid = || DecoratorError::InvalidArguments { name: name.to_string(), arguments: arguments.to_string() };

        let mut direction = None;
        let mut colors = Vec::with_capacity(2);
        for token in split_arguments(arguments) {
            match token.to_ascii_lowercase().as_str() {
                "horizontal" if direction.is_none() => direction = Some(GradientDirection::Horizontal),
                "vertical" if direction.is_none() => direction = Some(GradientDirection::Vertical),
                other if colors.len() < 2 => colors.push(parse_color(other).ok_or_else(invalid)?),
                _ => return Err(invalid()),
            }
        }

        let start = colors.first().copied().unwrap_or(Color::WHITE);
        let stop = colors.get(1).copied().unwrap_or(Color::WHITE);
        Ok(Rc::new(GradientDecorator::new(direction.unwrap_or(GradientDirection::Horizontal), start, stop)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_rounds() {
        let c = lerp_color(0.5, Color::rgb(0, 0, 0), Color::rgb(255, 255, 1));
        assert_eq!(c, Color::rgb(128, 128, 1));
    }

    #[test]
    fn test_instancer_defaults() {
        let instancer = GradientInstancer;
        assert!(instancer.instance_decorator("gradient", "").is_ok());
        assert!(instancer.instance_decorator("gradient", "vertical #ff0000 #0000ff").is_ok());
        assert!(instancer.instance_decorator("gradient", "vertical horizontal").is_err());
        assert!(instancer.instance_decorator("gradient", "vertical red blue green").is_err());
        assert!(instancer.instance_decorator("gradient", "diagonal red blue").is_err());
    }
}
