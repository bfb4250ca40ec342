//! Decorator element data
//!
//! Per-element resources created by decorators live in a slot arena owned by
//! [`RenderResources`]. Decorations hold only [`DecoratorDataHandle`]s.

use crate::interface::{CompiledEffectHandle, CompiledGeometryHandle, RenderInterface, SharedRenderInterface};
use kestrel_dom::Vector2i;
use std::cell::{Cell, RefCell, RefMut};
use std::fmt;

/// Handle to one entry of the [`ElementDataPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoratorDataHandle {
    index: u32,
    generation: u32,
}

/// Backend resources generated by a decorator for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasicEffectElementData {
    pub effect: Option<CompiledEffectHandle>,
    pub geometry: Option<CompiledGeometryHandle>,
}

impl BasicEffectElementData {
    /// Hand both resources back to the backend
    pub fn release(self, render_interface: &mut dyn RenderInterface) {
        if let Some(geometry) = self.geometry {
            render_interface.release_geometry(geometry);
        }
        if let Some(effect) = self.effect {
            render_interface.release_compiled_effect(effect);
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<BasicEffectElementData>,
}

/// Generational slot arena of element data
#[derive(Debug, Default)]
pub struct ElementDataPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ElementDataPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, data: BasicEffectElementData) -> DecoratorDataHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.data = Some(data);
            return DecoratorDataHandle { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, data: Some(data) });
        DecoratorDataHandle { index, generation: 0 }
    }

    pub fn get(&self, handle: DecoratorDataHandle) -> Option<&BasicEffectElementData> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    /// Remove an entry; `None` for stale or already released handles
    pub fn release(&mut self, handle: DecoratorDataHandle) -> Option<BasicEffectElementData> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let data = slot.data.take()?;
        self.free.push(handle.index);
        self.live -= 1;
        Some(data)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Forget every entry without releasing backend resources
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

/// Render state shared by the decorations of one context
pub struct RenderResources {
    render_interface: SharedRenderInterface,
    pool: RefCell<ElementDataPool>,
    viewport: Cell<Vector2i>,
}

impl RenderResources {
    pub fn new(render_interface: SharedRenderInterface, viewport: Vector2i) -> Self {
        Self { render_interface, pool: RefCell::new(ElementDataPool::new()), viewport: Cell::new(viewport) }
    }

    /// Borrow the backend; never hold the borrow across decorator calls
    pub fn render_interface(&self) -> RefMut<'_, dyn RenderInterface> {
        self.render_interface.borrow_mut()
    }

    pub fn shared_render_interface(&self) -> &SharedRenderInterface {
        &self.render_interface
    }

    pub fn pool(&self) -> RefMut<'_, ElementDataPool> {
        self.pool.borrow_mut()
    }

    pub fn viewport(&self) -> Vector2i {
        self.viewport.get()
    }

    pub fn set_viewport(&self, viewport: Vector2i) {
        self.viewport.set(viewport);
    }

    /// Store generated data, or release it again when nothing was created
    pub fn store(&self, data: BasicEffectElementData) -> Option<DecoratorDataHandle> {
        if data.effect.is_none() && data.geometry.is_none() {
            return None;
        }
        Some(self.pool().allocate(data))
    }

    /// Look up live data
    pub fn data(&self, handle: DecoratorDataHandle) -> Option<BasicEffectElementData> {
        self.pool.borrow().get(handle).copied()
    }

    /// Remove data from the pool and release its backend resources
    pub fn release(&self, handle: DecoratorDataHandle) {
        let data = self.pool().release(handle);
        debug_assert!(data.is_some(), "decorator data released twice");
        if let Some(data) = data {
            data.release(&mut *self.render_interface());
        }
    }
}

impl fmt::Debug for RenderResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderResources")
            .field("pool", &self.pool.borrow().len())
            .field("viewport", &self.viewport.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(raw: u64) -> BasicEffectElementData {
        BasicEffectElementData { effect: CompiledEffectHandle::new(raw), geometry: None }
    }

    #[test]
    fn test_allocate_and_release() {
        let mut pool = ElementDataPool::new();
        let a = pool.allocate(effect(1));
        let b = pool.allocate(effect(2));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(b), Some(&effect(2)));

        assert_eq!(pool.release(a), Some(effect(1)));
        assert_eq!(pool.release(a), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut pool = ElementDataPool::new();
        let a = pool.allocate(effect(1));
        pool.release(a);
        let c = pool.allocate(effect(3));
        assert_ne!(a, c);
        assert!(pool.get(a).is_none());
        assert_eq!(pool.get(c), Some(&effect(3)));
    }

    #[test]
    fn test_clear() {
        let mut pool = ElementDataPool::new();
        pool.allocate(effect(1));
        pool.clear();
        assert!(pool.is_empty());
    }
}
