//! # Entity: Lightweight Identifiers for Game Objects
//!
//! An [`Entity`] is just a number. It doesn't "contain" anything: the
//! [`World`](super::world::World) maps entities to their components. This
//! separation of identity from data is the core insight of the ECS pattern.
//!
//! ## Design: Monotonic, Never-Reused Ids
//!
//! Recycling ids is what makes stale handles dangerous:
//!
//! ```text
//! 1. Spawn entity #5
//! 2. Store a reference: saved = Entity(5)
//! 3. Despawn entity #5
//! 4. Spawn a new entity, gets recycled ID #5
//! 5. Use `saved`, it now refers to the wrong entity!
//! ```
//!
//! Generational indices solve this by pairing each slot with a counter. We
//! take the simpler route: ids come from a `u32` counter that only moves
//! forward, so a destroyed id never comes back and any handle to it simply
//! stops resolving. Id `0` is reserved as [`Entity::NULL`].
//!
//! The registry also keeps each live entity's [`ComponentMask`]. Live
//! entities sit in a `BTreeMap` keyed by id, so iterating it yields entities
//! in creation order, which is the order queries promise.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: generational `u64` ids with slot reuse.
//! - **Ours**: a plain counter. 4 billion creations is plenty for a demo.

use std::collections::BTreeMap;
use std::fmt;

use super::component::{ComponentMask, ComponentTypeId};

/// A lightweight handle to an entity in the [`World`](super::world::World).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub(crate) u32);

impl Entity {
    /// The reserved "no entity" id. Never returned by the registry.
    pub const NULL: Self = Self(0);

    /// Returns the raw id.
    pub fn id(self) -> u32 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues entity ids and tracks liveness plus the component mask of each
/// live entity.
///
/// ```text
/// next_id: 6
/// live:    { 1: 0b0011, 2: 0b0001, 5: 0b0111 }   ← 3 and 4 were destroyed
/// ```
pub(crate) struct EntityRegistry {
    /// Next id to hand out. Starts at 1.
    next_id: u32,
    /// Live entities → their component presence mask.
    live: BTreeMap<Entity, ComponentMask>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: BTreeMap::new(),
        }
    }

    /// Allocate a fresh entity with an empty mask.
    ///
    /// # Panics
    ///
    /// Panics if the `u32` id space is exhausted.
    pub fn create(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .unwrap_or_else(|| panic!("Entity id space exhausted after {} creations", id));
        let entity = Entity(id);
        self.live.insert(entity, ComponentMask::EMPTY);
        entity
    }

    /// Evict an entity from the live set, returning the mask it carried.
    /// Returns `None` if it was not alive.
    pub fn destroy(&mut self, entity: Entity) -> Option<ComponentMask> {
        self.live.remove(&entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live.contains_key(&entity)
    }

    pub fn mask(&self, entity: Entity) -> Option<ComponentMask> {
        self.live.get(&entity).copied()
    }

    /// Set a component bit. Returns `false` if the entity isn't alive.
    pub fn set_bit(&mut self, entity: Entity, id: ComponentTypeId) -> bool {
        match self.live.get_mut(&entity) {
            Some(mask) => {
                mask.set(id);
                true
            }
            None => false,
        }
    }

    /// Clear a component bit. Returns `false` if the entity isn't alive.
    pub fn clear_bit(&mut self, entity: Entity, id: ComponentTypeId) -> bool {
        match self.live.get_mut(&entity) {
            Some(mask) => {
                mask.clear(id);
                true
            }
            None => false,
        }
    }

    /// Live entities with their masks, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, ComponentMask)> + '_ {
        self.live.iter().map(|(&e, &m)| (e, m))
    }

    pub fn alive_count(&self) -> usize {
        self.live.len()
    }

    /// Drop every live entity. The id counter keeps going so old handles stay
    /// dead.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// The id the next [`create`](Self::create) will return.
    #[cfg(test)]
    pub fn peek_next(&self) -> u32 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::component_type_id;

    struct Bit;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut registry = EntityRegistry::new();
        let e1 = registry.create();
        let e2 = registry.create();
        assert_eq!(e1.id(), 1);
        assert_eq!(e2.id(), 2);
        assert!(!e1.is_null());
    }

    #[test]
    fn destroyed_ids_are_not_reused() {
        let mut registry = EntityRegistry::new();
        let e1 = registry.create();
        assert!(registry.destroy(e1).is_some());
        let e2 = registry.create();
        assert_ne!(e1, e2);
        assert!(!registry.is_alive(e1));
        assert!(registry.is_alive(e2));
    }

    #[test]
    fn double_destroy_returns_none() {
        let mut registry = EntityRegistry::new();
        let e = registry.create();
        assert!(registry.destroy(e).is_some());
        assert!(registry.destroy(e).is_none());
    }

    #[test]
    fn null_is_never_alive() {
        let mut registry = EntityRegistry::new();
        registry.create();
        assert!(!registry.is_alive(Entity::NULL));
        assert!(!registry.set_bit(Entity::NULL, component_type_id::<Bit>()));
    }

    #[test]
    fn mask_bits_follow_set_and_clear() {
        let mut registry = EntityRegistry::new();
        let e = registry.create();
        let id = component_type_id::<Bit>();
        assert!(registry.set_bit(e, id));
        assert!(registry.mask(e).unwrap().contains(id));
        assert!(registry.clear_bit(e, id));
        assert!(registry.mask(e).unwrap().is_empty());
    }

    #[test]
    fn iteration_is_creation_order() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        let b = registry.create();
        let c = registry.create();
        registry.destroy(b);
        let order: Vec<_> = registry.iter().map(|(e, _)| e).collect();
        assert_eq!(order, vec![a, c]);
        assert_eq!(registry.alive_count(), 2);
    }

    #[test]
    fn clear_keeps_counter() {
        let mut registry = EntityRegistry::new();
        registry.create();
        registry.create();
        registry.clear();
        assert_eq!(registry.alive_count(), 0);
        assert_eq!(registry.peek_next(), 3);
    }
}
