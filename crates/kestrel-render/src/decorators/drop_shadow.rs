//! `drop-shadow(color? offset-x offset-y blur?)`

use crate::decorator::{DecoratedElement, Decorator, DecoratorClasses, DecoratorInstancer};
use crate::interface::{EffectParameters, EffectValue};
use crate::pool::{BasicEffectElementData, DecoratorDataHandle, RenderResources};
use crate::DecoratorError;
use kestrel_css::values::{parse_color, parse_length, split_arguments};
use kestrel_css::{Color, Length};
use kestrel_dom::{BoxArea, Vector2f};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct DropShadowDecorator {
    color: Color,
    offset: [Length; 2],
    blur_radius: Length,
}

impl DropShadowDecorator {
    pub fn new(color: Color, offset_x: Length, offset_y: Length, blur_radius: Length) -> Self {
        Self { color, offset: [offset_x, offset_y], blur_radius }
    }

    fn offset_px(&self, viewport: Vector2f) -> Vector2f {
        Vector2f::new(self.offset[0].to_px(viewport.x, viewport.y), self.offset[1].to_px(viewport.x, viewport.y))
    }
}

impl Decorator for DropShadowDecorator {
    fn generate_element_data(
        &self,
        _element: &dyn DecoratedElement,
        _painting_area: BoxArea,
        resources: &RenderResources,
    ) -> Option<DecoratorDataHandle> {
        let viewport = resources.viewport();
        let viewport = Vector2f::new(viewport.x as f32, viewport.y as f32);
        let sigma = 0.5 * self.blur_radius.to_px(viewport.x, viewport.y);

        let parameters = EffectParameters::new()
            .with("color", EffectValue::Color(self.color))
            .with("offset", EffectValue::Vector(self.offset_px(viewport)))
            .with("sigma", EffectValue::Float(sigma));
        let effect = resources.render_interface().compile_effect("drop-shadow", &parameters);
        resources.store(BasicEffectElementData { effect, geometry: None })
    }

    fn render_element(&self, _element: &dyn DecoratedElement, data: DecoratorDataHandle, resources: &RenderResources) {
        if let Some(effect) = resources.data(data).and_then(|d| d.effect) {
            resources.render_interface().render_effect(effect, None, Vector2f::ZERO);
        }
    }

    fn clip_extension(&self) -> (Vector2f, Vector2f) {
        let offset = Vector2f::new(self.offset[0].value, self.offset[1].value);
        let extent = Vector2f::splat(1.5 * self.blur_radius.value.max(0.0));
        let top_left = (extent - offset).max(Vector2f::ZERO);
        let bottom_right = (extent + offset).max(Vector2f::ZERO);
        (top_left, bottom_right)
    }
}

#[derive(Debug, Default)]
pub struct DropShadowInstancer;

impl DecoratorInstancer for DropShadowInstancer {
    fn classes(&self) -> DecoratorClasses {
        DecoratorClasses::FILTER | DecoratorClasses::BACKDROP_FILTER
    }

    fn instance_decorator(&self, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError> {
        let invalid = || DecoratorError::InvalidArguments { name: name.to_string(), arguments: arguments.to_string() };

        let mut color = None;
        let mut lengths = Vec::with_capacity(3);
        for token in split_arguments(arguments) {
            if let Some(length) = parse_length(&token) {
                lengths.push(length);
            } else if color.is_none() {
                color = Some(parse_color(&token).ok_or_else(invalid)?);
            } else {
                return Err(invalid());
            }
        }

        let (offset_x, offset_y, blur) = match lengths[..] {
            [] => (Length::px(0.0), Length::px(0.0), Length::px(0.0)),
            [x, y] => (x, y, Length::px(0.0)),
            [x, y, blur] if blur.value >= 0.0 => (x, y, blur),
            _ => return Err(invalid()),
        };
        Ok(Rc::new(DropShadowDecorator::new(color.unwrap_or(Color::BLACK), offset_x, offset_y, blur)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_extension_follows_offset() {
        let shadow = DropShadowDecorator::new(Color::BLACK, Length::px(10.0), Length::px(-2.0), Length::px(2.0));
        let (top_left, bottom_right) = shadow.clip_extension();
        assert_eq!(top_left, Vector2f::new(0.0, 5.0));
        assert_eq!(bottom_right, Vector2f::new(13.0, 1.0));
    }

    #[test]
    fn test_color_position_is_free() {
        let instancer = DropShadowInstancer;
        assert!(instancer.instance_decorator("drop-shadow", "#f00 2px 3px").is_ok());
        assert!(instancer.instance_decorator("drop-shadow", "2px 3px 4px rgba(0, 0, 0, 0.5)").is_ok());
        assert!(instancer.instance_decorator("drop-shadow", "").is_ok());
    }

    #[test]
    fn test_invalid_arguments() {
        let instancer = DropShadowInstancer;
        assert!(instancer.instance_decorator("drop-shadow", "2px").is_err());
        assert!(instancer.instance_decorator("drop-shadow", "red blue 2px 2px").is_err());
        assert!(instancer.instance_decorator("drop-shadow", "2px 2px -1px").is_err());
        assert!(instancer.instance_decorator("drop-shadow", "1px 2px 3px 4px").is_err());
    }
}
