//! `blur(radius)`

use crate::decorator::{DecoratedElement, Decorator, DecoratorClasses, DecoratorInstancer};
use crate::interface::{EffectParameters, EffectValue};
use crate::pool::{BasicEffectElementData, DecoratorDataHandle, RenderResources};
use crate::DecoratorError;
use kestrel_css::values::parse_length;
use kestrel_css::Length;
use kestrel_dom::{BoxArea, Vector2f};
use std::rc::Rc;

/// Gaussian blur of the filter target
#[derive(Debug, Clone, PartialEq)]
pub struct BlurDecorator {
    radius: Length,
}

impl BlurDecorator {
    pub fn new(radius: Length) -> Self {
        Self { radius }
    }
}

impl Decorator for BlurDecorator {
    fn generate_element_data(
        &self,
        _element: &dyn DecoratedElement,
        _painting_area: BoxArea,
        resources: &RenderResources,
    ) -> Option<DecoratorDataHandle> {
        let viewport = resources.viewport();
        let radius = self.radius.to_px(viewport.x as f32, viewport.y as f32);
        let parameters = EffectParameters::new().with("radius", EffectValue::Float(radius));
        let effect = resources.render_interface().compile_effect("blur", &parameters);
        resources.store(BasicEffectElementData { effect, geometry: None })
    }

    fn render_element(&self, _element: &dyn DecoratedElement, data: DecoratorDataHandle, resources: &RenderResources) {
        if let Some(effect) = resources.data(data).and_then(|d| d.effect) {
            resources.render_interface().render_effect(effect, None, Vector2f::ZERO);
        }
    }

    fn clip_extension(&self) -> (Vector2f, Vector2f) {
        let extent = Vector2f::splat(1.5 * self.radius.value.max(0.0));
        (extent, extent)
    }
}

#[derive(Debug, Default)]
pub struct BlurInstancer;

impl DecoratorInstancer for BlurInstancer {
    fn classes(&self) -> DecoratorClasses {
        DecoratorClasses::FILTER | DecoratorClasses::BACKDROP_FILTER
    }

    fn instance_decorator(&self, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError> {
        let arguments = arguments.trim();
        let radius = if arguments.is_empty() { Some(Length::px(0.0)) } else { parse_length(arguments) };
        match radius {
            Some(radius) if radius.value >= 0.0 => Ok(Rc::new(BlurDecorator::new(radius))),
            _ => Err(DecoratorError::InvalidArguments { name: name.to_string(), arguments: arguments.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_extension() {
        let blur = BlurDecorator::new(Length::px(4.0));
        assert_eq!(blur.clip_extension(), (Vector2f::splat(6.0), Vector2f::splat(6.0)));
    }

    #[test]
    fn test_instancer() {
        let instancer = BlurInstancer;
        assert!(instancer.instance_decorator("blur", "4px").is_ok());
        assert!(instancer.instance_decorator("blur", "").is_ok());
        assert!(instancer.instance_decorator("blur", "-2px").is_err());
        assert!(instancer.instance_decorator("blur", "4").is_err());
    }
}
