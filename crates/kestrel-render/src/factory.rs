//! Decorator registry and per-style-sheet instancing

use crate::decorator::{Decorator, DecoratorClass, DecoratorInstancer, DecoratorSource};
use crate::decorators::{
    BasicFilterInstancer, BasicFilterValue, BlurInstancer, DropShadowInstancer, GradientInstancer,
    LinearGradientInstancer,
};
use crate::DecoratorError;
use kestrel_css::{DecoratorsDeclaration, PropertySource};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Instancers by decorator type name
#[derive(Default)]
pub struct DecoratorFactory {
    instancers: HashMap<String, Rc<dyn DecoratorInstancer>>,
}

impl DecoratorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with every built-in decorator registered
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();

        let number_filter: Rc<dyn DecoratorInstancer> = Rc::new(BasicFilterInstancer::new(BasicFilterValue::NumberPercent));
        for name in ["opacity", "brightness", "contrast", "invert", "grayscale", "sepia", "saturate"] {
            factory.register_shared(name, number_filter.clone());
        }
        factory.register("hue-rotate", BasicFilterInstancer::new(BasicFilterValue::Angle));
        factory.register("blur", BlurInstancer);
        factory.register("drop-shadow", DropShadowInstancer);
        factory.register("gradient", GradientInstancer);
        factory.register("linear-gradient", LinearGradientInstancer);
        factory
    }

    pub fn register(&mut self, name: &str, instancer: impl DecoratorInstancer + 'static) {
        self.register_shared(name, Rc::new(instancer));
    }

    /// Register one instancer under several names
    pub fn register_shared(&mut self, name: &str, instancer: Rc<dyn DecoratorInstancer>) {
        if self.instancers.insert(name.to_ascii_lowercase(), instancer).is_some() {
            tracing::debug!(name, "Replaced decorator instancer");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rc<dyn DecoratorInstancer>> {
        self.instancers.get(name)
    }

    /// Instance one decorator for use in `class`
    pub fn instance(&self, class: DecoratorClass, name: &str, arguments: &str) -> Result<Rc<dyn Decorator>, DecoratorError> {
        let instancer = self.get(name).ok_or_else(|| DecoratorError::UnknownDecorator(name.to_string()))?;
        if !instancer.classes().contains(class) {
            return Err(DecoratorError::UnsupportedClass { name: name.to_string(), class });
        }
        instancer.instance_decorator(name, arguments)
    }
}

impl fmt::Debug for DecoratorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.instancers.keys().collect();
        names.sort();
        f.debug_struct("DecoratorFactory").field("instancers", &names).finish()
    }
}

/// Decorator instances of one style sheet
///
/// Lists are cached by property class and declared value, so every element
/// matching the same rule shares one set of decorator definitions.
pub struct StyleSheetDecorators {
    factory: Rc<DecoratorFactory>,
    cache: RefCell<HashMap<(DecoratorClass, String), Vec<Rc<dyn Decorator>>>>,
}

impl StyleSheetDecorators {
    pub fn new(factory: Rc<DecoratorFactory>) -> Self {
        Self { factory, cache: RefCell::new(HashMap::new()) }
    }

    /// Number of cached decorator lists
    pub fn cached_lists(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Drop cached instances, e.g. after the style sheet changed
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    fn instance_list(
        &self,
        class: DecoratorClass,
        declaration: &DecoratorsDeclaration,
        source: &PropertySource,
    ) -> Vec<Rc<dyn Decorator>> {
        let mut list = Vec::with_capacity(declaration.list.len());
        for item in &declaration.list {
            match self.factory.instance(class, &item.type_name, &item.arguments) {
                Ok(decorator) => list.push(decorator),
                Err(err) => {
                    tracing::warn!(source = %source, property = %class, "{err}");
                    return Vec::new();
                }
            }
        }
        tracing::debug!(property = %class, value = %declaration.value, count = list.len(), "Instanced decorators");
        list
    }
}

impl DecoratorSource for StyleSheetDecorators {
    fn instance_decorators(
        &self,
        class: DecoratorClass,
        declaration: &DecoratorsDeclaration,
        source: &PropertySource,
    ) -> Vec<Rc<dyn Decorator>> {
        if declaration.list.is_empty() {
            return Vec::new();
        }
        let key = (class, declaration.value.clone());
        if let Some(list) = self.cache.borrow().get(&key) {
            return list.clone();
        }
        let list = self.instance_list(class, declaration, source);
        self.cache.borrow_mut().insert(key, list.clone());
        list
    }
}

impl fmt::Debug for StyleSheetDecorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSheetDecorators")
            .field("factory", &self.factory)
            .field("cached_lists", &self.cached_lists())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_css::values::parse_decorators;

    fn decorators() -> StyleSheetDecorators {
        StyleSheetDecorators::new(Rc::new(DecoratorFactory::with_builtins()))
    }

    fn source() -> PropertySource {
        PropertySource::new("mem://test", 3, ".x")
    }

    #[test]
    fn test_instance_in_order() {
        let decorators = decorators();
        let declaration = parse_decorators("grayscale(0.5) blur(4px)").unwrap();
        let list = decorators.instance_decorators(DecoratorClass::Filter, &declaration, &source());
        assert_eq!(list.len(), 2);
        assert!(format!("{:?}", list[0]).starts_with("BasicFilterDecorator"));
        assert!(format!("{:?}", list[1]).starts_with("BlurDecorator"));
    }

    #[test]
    fn test_cache_shares_instances() {
        let decorators = decorators();
        let declaration = parse_decorators("blur(2px)").unwrap();
        let a = decorators.instance_decorators(DecoratorClass::Filter, &declaration, &source());
        let b = decorators.instance_decorators(DecoratorClass::Filter, &declaration, &source());
        assert!(Rc::ptr_eq(&a[0], &b[0]));
        assert_eq!(decorators.cached_lists(), 1);

        decorators.instance_decorators(DecoratorClass::BackdropFilter, &declaration, &source());
        assert_eq!(decorators.cached_lists(), 2);
    }

    #[test]
    fn test_failures_empty_the_list() {
        let decorators = decorators();
        let unknown = parse_decorators("grayscale(1) sparkle(3)").unwrap();
        assert!(decorators.instance_decorators(DecoratorClass::Filter, &unknown, &source()).is_empty());

        let wrong_class = parse_decorators("blur(2px)").unwrap();
        assert!(decorators.instance_decorators(DecoratorClass::Background, &wrong_class, &source()).is_empty());

        let none = parse_decorators("none").unwrap();
        assert!(decorators.instance_decorators(DecoratorClass::Filter, &none, &source()).is_empty());
    }

    #[test]
    fn test_factory_errors() {
        let factory = DecoratorFactory::with_builtins();
        assert!(matches!(
            factory.instance(DecoratorClass::Filter, "sparkle", ""),
            Err(DecoratorError::UnknownDecorator(_))
        ));
        assert!(matches!(
            factory.instance(DecoratorClass::Filter, "gradient", "red blue"),
            Err(DecoratorError::UnsupportedClass { .. })
        ));
        assert!(factory.instance(DecoratorClass::MaskImage, "gradient", "red blue").is_ok());
    }
}
