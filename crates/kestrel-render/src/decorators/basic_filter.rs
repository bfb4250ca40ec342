//! Single-value filters: `grayscale(0.5)`, `hue-rotate(90deg)`, ...

use crate::decorator::{DecoratedElement, Decorator, DecoratorClasses, DecoratorInstancer};
use crate::interface::{EffectParameters, EffectValue};
use crate::pool::{BasicEffectElementData, DecoratorDataHandle, RenderResources};
use crate::DecoratorError;
use kestrel_css::values::{parse_angle, parse_number_percent};
use kestrel_dom::{BoxArea, Vector2f};
use std::rc::Rc;

/// Filter compiled as a named effect with one `value` parameter
#[derive(Debug, Clone, PartialEq)]
pub struct BasicFilterDecorator {
    name: String,
    value: f32,
}

impl BasicFilterDecorator {
    pub fn new(name: &str, value: f32) -> Self {
        Self { name: name.to_string(), value }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

impl Decorator for BasicFilterDecorator {
    fn generate_element_data(
        &self,
        _element: &dyn DecoratedElement,
        _painting_area: BoxArea,
        resources: &RenderResources,
    ) -> Option<DecoratorDataHandle> {
        let parameters = EffectParameters::new().with("value", EffectValue::Float(self.value));
        let effect = resources.render_interface().compile_effect(&self.name, &parameters);
        resources.store(BasicEffectElementData { effect, geometry: None })
    }

    fn render_element(&self, _element: &dyn DecoratedElement, data: DecoratorDataHandle, resources: &RenderResources) {
        if let Some(effect) = resources.data(data).and_then(|d| d.effect) {
            resources.render_interface().render_effect(effect, None, Vector2f::ZERO);
        }
    }
}

/// How the single argument is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicFilterValue {
    /// Number or percentage, defaulting to 1
    NumberPercent,
    /// Angle in radians, defaulting to 0
    Angle,
}

#[derive(Debug)]
pub struct BasicFilterInstancer {
    value_type: BasicFilterValue,
}

impl BasicFilterInstancer {
    pub fn new(value_type: BasicFilterValue) -> Self {
        Self { value_type }
    }

    fn parse_value(&self, arguments: &str) -> Option<f32> {
        match (self.value_type, arguments.is_empty()) {
            (BasicFilterValue::NumberPercent, true) => Some(1.0),
            (BasicFilterValue::Angle, true) => Some(0.0),
            (BasicFilterValue::NumberPercent, false) => parse_number_percent(arguments),
            (BasicFilterValue::Angle, false) => parse_angle(arguments),
        }
    }
}

impl DecoratorInstancer for BasicFilterInstancer {
    fn classes(&self) -> DecoratorClasses {
        DecoratorClasses::FILTER | DecoratorClasses::BACKDROP_FILTER
    }

    fn instance_decorator(&self, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError> {
        let arguments = arguments.trim();
        let value = self.parse_value(arguments).ok_or_else(|| DecoratorError::InvalidArguments {
            name: name.to_string(),
            arguments: arguments.to_string(),
        })?;
        Ok(Rc::new(BasicFilterDecorator::new(name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(instancer: &BasicFilterInstancer, arguments: &str) -> Option<f32> {
        instancer.parse_value(arguments)
    }

    #[test]
    fn test_number_percent() {
        let instancer = BasicFilterInstancer::new(BasicFilterValue::NumberPercent);
        assert_eq!(value_of(&instancer, "0.5"), Some(0.5));
        assert_eq!(value_of(&instancer, "25%"), Some(0.25));
        assert_eq!(value_of(&instancer, ""), Some(1.0));
        assert!(instancer.instance_decorator("grayscale", "lots").is_err());
    }

    #[test]
    fn test_angle() {
        let instancer = BasicFilterInstancer::new(BasicFilterValue::Angle);
        assert_eq!(value_of(&instancer, ""), Some(0.0));
        let half_turn = value_of(&instancer, "180deg").unwrap();
        assert!((half_turn - std::f32::consts::PI).abs() < 1e-5);
        assert!(instancer.instance_decorator("hue-rotate", "0.5").is_err());
    }

    #[test]
    fn test_classes() {
        let classes = BasicFilterInstancer::new(BasicFilterValue::Angle).classes();
        assert!(classes.contains(crate::DecoratorClass::Filter));
        assert!(classes.contains(crate::DecoratorClass::BackdropFilter));
        assert!(!classes.contains(crate::DecoratorClass::Background));
    }
}
