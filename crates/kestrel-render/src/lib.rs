//! Kestrel Render - Decorators & filter compositing
//!
//! Turns decorator-class style properties (`decorator`, `backdrop-filter`,
//! `filter`, `mask-image`) into calls on an abstract [`RenderInterface`].

mod decoration;
mod decorator;
pub mod decorators;
mod factory;
mod interface;
mod pool;
mod recording;
pub mod utilities;

pub use decoration::{ElementDecoration, RenderStage};
pub use decorator::{
    DecoratedElement, Decorator, DecoratorClass, DecoratorClasses, DecoratorInstancer, DecoratorSource,
};
pub use factory::{DecoratorFactory, StyleSheetDecorators};
pub use interface::{
    generate_quad, CompiledEffectHandle, CompiledGeometryHandle, EffectParameters, EffectValue, RenderCommand,
    RenderInterface, ResolvedColorStop, SharedRenderInterface, TextureHandle, Vertex,
};
pub use pool::{BasicEffectElementData, DecoratorDataHandle, ElementDataPool, RenderResources};
pub use recording::{RecordingRenderInterface, RenderCall};

/// Decorator configuration errors
#[derive(Debug, thiserror::Error)]
pub enum DecoratorError {
    #[error("Unknown decorator '{0}'")]
    UnknownDecorator(String),

    #[error("Invalid arguments '{arguments}' for decorator '{name}'")]
    InvalidArguments { name: String, arguments: String },

    #[error("Decorator '{name}' cannot be used in '{class}'")]
    UnsupportedClass { name: String, class: DecoratorClass },
}
