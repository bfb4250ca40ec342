//! Render interface contract
//!
//! The engine never talks to a GPU directly. Backends implement
//! [`RenderInterface`]; every resource crosses the boundary as an opaque
//! handle whose release the engine pairs with its creation.

use kestrel_css::Color;
use kestrel_dom::{Rectanglei, Transform2D, Vector2f, Vector2i};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::num::NonZeroU64;
use std::rc::Rc;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Wrap a backend identifier; zero is never a valid handle
            pub fn new(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            pub fn get(self) -> u64 {
                self.0.get()
            }
        }
    };
}

opaque_handle!(
    /// Geometry uploaded to the backend
    CompiledGeometryHandle
);
opaque_handle!(
    /// Compiled shader effect (filter, gradient)
    CompiledEffectHandle
);
opaque_handle!(
    /// Texture owned by the backend
    TextureHandle
);

/// Layer-stack operations executed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderCommand {
    None,
    /// Push a fresh offscreen target
    StackPush,
    /// Discard the top target
    StackPop,
    /// Copy a region of the top target into a new texture
    StackToTexture,
    /// Copy a region of the top target into the filter scratch target
    StackToFilter,
    /// Composite the filter scratch target onto the top target
    FilterToStack,
    /// Use the top target as mask for the filter scratch target
    StackToMask,
}

/// One vertex of compiled geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector2f,
    pub colour: Color,
    pub tex_coord: Vector2f,
}

impl Vertex {
    pub fn new(position: Vector2f, colour: Color) -> Self {
        Self { position, colour, tex_coord: Vector2f::ZERO }
    }
}

/// Color stop with a resolved position along the gradient line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColorStop {
    pub color: Color,
    pub position: f32,
}

/// A value passed to [`RenderInterface::compile_effect`]
#[derive(Debug, Clone, PartialEq)]
pub enum EffectValue {
    Float(f32),
    Vector(Vector2f),
    Color(Color),
    ColorStops(Vec<ResolvedColorStop>),
}

/// Named parameters of an effect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectParameters {
    values: BTreeMap<String, EffectValue>,
}

impl EffectParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: EffectValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&EffectValue> {
        self.values.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(EffectValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Backend contract
///
/// All calls are synchronous. Compilation calls return `None` when the
/// backend cannot create the resource; the engine then skips the
/// corresponding render call.
pub trait RenderInterface {
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: Option<TextureHandle>,
    ) -> Option<CompiledGeometryHandle>;

    fn render_geometry(&mut self, geometry: CompiledGeometryHandle, translation: Vector2f);

    fn release_geometry(&mut self, geometry: CompiledGeometryHandle);

    fn enable_scissor_region(&mut self, enable: bool);

    fn set_scissor_region(&mut self, region: Rectanglei);

    /// `None` resets to the identity transform
    fn set_transform(&mut self, transform: Option<&Transform2D>);

    fn load_texture(&mut self, source: &str) -> Option<(TextureHandle, Vector2i)>;

    fn generate_texture(&mut self, source: &[u8], dimensions: Vector2i) -> Option<TextureHandle>;

    fn release_texture(&mut self, texture: TextureHandle);

    /// Execute a layer-stack command over a window-space region
    ///
    /// Only [`RenderCommand::StackToTexture`] produces a texture.
    fn execute_render_command(
        &mut self,
        command: RenderCommand,
        offset: Vector2i,
        dimensions: Vector2i,
    ) -> Option<TextureHandle>;

    fn compile_effect(&mut self, name: &str, parameters: &EffectParameters) -> Option<CompiledEffectHandle>;

    /// Render an effect; filters pass no geometry and apply to the filter target
    fn render_effect(
        &mut self,
        effect: CompiledEffectHandle,
        geometry: Option<CompiledGeometryHandle>,
        translation: Vector2f,
    );

    fn release_compiled_effect(&mut self, effect: CompiledEffectHandle);
}

/// Render interface shared by every decoration of a context
pub type SharedRenderInterface = Rc<RefCell<dyn RenderInterface>>;

/// Two triangles covering `origin .. origin + size`, all vertices `colour`
pub fn generate_quad(origin: Vector2f, size: Vector2f, colour: Color) -> ([Vertex; 4], [u32; 6]) {
    let corners = [
        origin,
        Vector2f::new(origin.x + size.x, origin.y),
        origin + size,
        Vector2f::new(origin.x, origin.y + size.y),
    ];
    let vertices = corners.map(|position| {
        let tex = Vector2f::new(
            if size.x > 0.0 { (position.x - origin.x) / size.x } else { 0.0 },
            if size.y > 0.0 { (position.y - origin.y) / size.y } else { 0.0 },
        );
        Vertex { position, colour, tex_coord: tex }
    });
    (vertices, [0, 3, 1, 1, 3, 2])
}
