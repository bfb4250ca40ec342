//! Headless render interface
//!
//! Records every call in order and tracks live handles, so the render
//! protocol and resource pairing can be checked without a GPU.

use crate::interface::{
    CompiledEffectHandle, CompiledGeometryHandle, EffectParameters, RenderCommand, RenderInterface, TextureHandle,
    Vertex,
};
use kestrel_dom::{Rectanglei, Transform2D, Vector2f, Vector2i};
use std::collections::{BTreeMap, BTreeSet};

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CompileGeometry { geometry: CompiledGeometryHandle, vertices: usize },
    RenderGeometry { geometry: CompiledGeometryHandle, translation: Vector2f },
    ReleaseGeometry(CompiledGeometryHandle),
    EnableScissor(bool),
    SetScissor(Rectanglei),
    SetTransform(Option<Transform2D>),
    LoadTexture(String),
    GenerateTexture(Vector2i),
    ReleaseTexture(TextureHandle),
    Command { command: RenderCommand, offset: Vector2i, size: Vector2i },
    CompileEffect { effect: CompiledEffectHandle, name: String },
    RenderEffect { effect: CompiledEffectHandle, geometry: Option<CompiledGeometryHandle>, translation: Vector2f },
    ReleaseEffect(CompiledEffectHandle),
}

#[derive(Debug, Default)]
pub struct RecordingRenderInterface {
    calls: Vec<RenderCall>,
    next_handle: u64,
    geometries: BTreeMap<CompiledGeometryHandle, Vec<Vertex>>,
    effects: BTreeMap<CompiledEffectHandle, (String, EffectParameters)>,
    textures: BTreeSet<TextureHandle>,
    /// Effects with these names fail to compile
    rejected_effects: BTreeSet<String>,
}

impl RecordingRenderInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `compile_effect` fail for `name`
    pub fn reject_effect(&mut self, name: &str) {
        self.rejected_effects.insert(name.to_string());
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    /// Recorded layer-stack commands, in order
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Command { command, .. } => Some(*command),
                _ => None,
            })
            .collect()
    }

    /// Names of the effects rendered, in order
    pub fn rendered_effects(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::RenderEffect { effect, .. } => self.effect_name(*effect).map(str::to_string),
                _ => None,
            })
            .collect()
    }

    pub fn effect_name(&self, effect: CompiledEffectHandle) -> Option<&str> {
        self.effects.get(&effect).map(|(name, _)| name.as_str())
    }

    pub fn effect_parameters(&self, effect: CompiledEffectHandle) -> Option<&EffectParameters> {
        self.effects.get(&effect).map(|(_, parameters)| parameters)
    }

    pub fn geometry_vertices(&self, geometry: CompiledGeometryHandle) -> Option<&[Vertex]> {
        self.geometries.get(&geometry).map(Vec::as_slice)
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_effects(&self) -> usize {
        self.effects.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// No backend resource is alive
    pub fn is_clean(&self) -> bool {
        self.geometries.is_empty() && self.effects.is_empty() && self.textures.is_empty()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderInterface for RecordingRenderInterface {
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        _indices: &[u32],
        _texture: Option<TextureHandle>,
    ) -> Option<CompiledGeometryHandle> {
        let geometry = CompiledGeometryHandle::new(self.next())?;
        self.geometries.insert(geometry, vertices.to_vec());
        self.calls.push(RenderCall::CompileGeometry { geometry, vertices: vertices.len() });
        Some(geometry)
    }

    fn render_geometry(&mut self, geometry: CompiledGeometryHandle, translation: Vector2f) {
        debug_assert!(self.geometries.contains_key(&geometry), "rendering released geometry");
        self.calls.push(RenderCall::RenderGeometry { geometry, translation });
    }

    fn release_geometry(&mut self, geometry: CompiledGeometryHandle) {
        let released = self.geometries.remove(&geometry);
        debug_assert!(released.is_some(), "geometry released twice");
        self.calls.push(RenderCall::ReleaseGeometry(geometry));
    }

    fn enable_scissor_region(&mut self, enable: bool) {
        self.calls.push(RenderCall::EnableScissor(enable));
    }

    fn set_scissor_region(&mut self, region: Rectanglei) {
        self.calls.push(RenderCall::SetScissor(region));
    }

    fn set_transform(&mut self, transform: Option<&Transform2D>) {
        self.calls.push(RenderCall::SetTransform(transform.copied()));
    }

    fn load_texture(&mut self, source: &str) -> Option<(TextureHandle, Vector2i)> {
        self.calls.push(RenderCall::LoadTexture(source.to_string()));
        None
    }

    fn generate_texture(&mut self, _source: &[u8], dimensions: Vector2i) -> Option<TextureHandle> {
        let texture = TextureHandle::new(self.next())?;
        self.textures.insert(texture);
        self.calls.push(RenderCall::GenerateTexture(dimensions));
        Some(texture)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        self.calls.push(RenderCall::ReleaseTexture(texture));
    }

    fn execute_render_command(
        &mut self,
        command: RenderCommand,
        offset: Vector2i,
        size: Vector2i,
    ) -> Option<TextureHandle> {
        self.calls.push(RenderCall::Command { command, offset, size });
        if command != RenderCommand::StackToTexture {
            return None;
        }
        let texture = TextureHandle::new(self.next())?;
        self.textures.insert(texture);
        Some(texture)
    }

    fn compile_effect(&mut self, name: &str, parameters: &EffectParameters) -> Option<CompiledEffectHandle> {
        if self.rejected_effects.contains(name) {
            return None;
        }
        let effect = CompiledEffectHandle::new(self.next())?;
        self.effects.insert(effect, (name.to_string(), parameters.clone()));
        self.calls.push(RenderCall::CompileEffect { effect, name: name.to_string() });
        Some(effect)
    }

    fn render_effect(
        &mut self,
        effect: CompiledEffectHandle,
        geometry: Option<CompiledGeometryHandle>,
        translation: Vector2f,
    ) {
        debug_assert!(self.effects.contains_key(&effect), "rendering released effect");
        self.calls.push(RenderCall::RenderEffect { effect, geometry, translation });
    }

    fn release_compiled_effect(&mut self, effect: CompiledEffectHandle) {
        let released = self.effects.remove(&effect);
        debug_assert!(released.is_some(), "effect released twice");
        self.calls.push(RenderCall::ReleaseEffect(effect));
    }
}
