//! # Storage: Type-Erased Sparse Component Pools
//!
//! The store must hold *any* component type without knowing it at compile
//! time. Each component type gets one [`ComponentPool`]: a map from entity to
//! a boxed value. The pools themselves live in a map keyed by
//! [`ComponentTypeId`].
//!
//! ```text
//! ComponentStore
//! ┌────────────────────────────────────────────────────────┐
//! │ pools: HashMap<ComponentTypeId, ComponentPool>          │
//! │   0 (Transform) → { #1: Box<Transform>, #4: Box<..> }   │
//! │   1 (Velocity)  → { #1: Box<Velocity> }                 │
//! │   2 (RigidBody) → { #4: Box<RigidBody> }                │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why `Box<dyn Any>`?
//!
//! Same tradeoff as a columnar `Vec<Box<dyn Any>>`: each component is heap
//! allocated and reached through `downcast_ref`/`downcast_mut`. No `unsafe`,
//! easy to audit, and entity counts here are in the hundreds.
//!
//! The store doesn't know about masks. Keeping the presence bitmask in step
//! with the pools is the [`World`](super::world::World)'s job.

use std::any::Any;
use std::collections::HashMap;

use super::component::ComponentTypeId;
use super::entity::Entity;

/// All components of one type, keyed by entity.
pub(crate) struct ComponentPool {
    data: HashMap<Entity, Box<dyn Any + Send + Sync>>,
}

impl ComponentPool {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Insert or replace the component for `entity`.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, value: T) -> &mut T {
        self.data.insert(entity, Box::new(value));
        self.get_mut(entity)
            .unwrap_or_else(|| panic!("Component `{}` vanished right after insert", std::any::type_name::<T>()))
    }

    /// Get a shared reference to the component for `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the stored value is not a `T` (indicates a framework bug).
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.data.get(&entity).map(|boxed| {
            boxed.downcast_ref::<T>().unwrap_or_else(|| {
                panic!(
                    "Component type mismatch: expected `{}` in pool",
                    std::any::type_name::<T>()
                )
            })
        })
    }

    /// Get a mutable reference to the component for `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the stored value is not a `T` (indicates a framework bug).
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.data.get_mut(&entity).map(|boxed| {
            boxed.downcast_mut::<T>().unwrap_or_else(|| {
                panic!(
                    "Component type mismatch: expected `{}` in pool",
                    std::any::type_name::<T>()
                )
            })
        })
    }

    /// Remove and return the component for `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the stored value is not a `T` (indicates a framework bug).
    pub fn take<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.data.remove(&entity).map(|boxed| match boxed.downcast::<T>() {
            Ok(value) => *value,
            Err(_) => panic!(
                "Component type mismatch: expected `{}` in pool",
                std::any::type_name::<T>()
            ),
        })
    }

    /// Remove the component for `entity` without knowing its type.
    pub fn remove_any(&mut self, entity: Entity) -> bool {
        self.data.remove(&entity).is_some()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.data.contains_key(&entity)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Owns every component instance in a [`World`](super::world::World).
pub(crate) struct ComponentStore {
    pools: HashMap<ComponentTypeId, ComponentPool>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    pub fn insert<T: 'static + Send + Sync>(
        &mut self,
        type_id: ComponentTypeId,
        entity: Entity,
        value: T,
    ) -> &mut T {
        self.pools
            .entry(type_id)
            .or_insert_with(ComponentPool::new)
            .insert(entity, value)
    }

    pub fn get<T: 'static>(&self, type_id: ComponentTypeId, entity: Entity) -> Option<&T> {
        self.pools.get(&type_id)?.get(entity)
    }

    pub fn get_mut<T: 'static>(&mut self, type_id: ComponentTypeId, entity: Entity) -> Option<&mut T> {
        self.pools.get_mut(&type_id)?.get_mut(entity)
    }

    pub fn take<T: 'static>(&mut self, type_id: ComponentTypeId, entity: Entity) -> Option<T> {
        self.pools.get_mut(&type_id)?.take(entity)
    }

    pub fn contains(&self, type_id: ComponentTypeId, entity: Entity) -> bool {
        self.pools
            .get(&type_id)
            .is_some_and(|pool| pool.contains(entity))
    }

    /// Drop every component belonging to `entity`. Returns how many were
    /// removed.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        self.pools
            .values_mut()
            .filter_map(|pool| pool.remove_any(entity).then_some(()))
            .count()
    }

    /// Total number of component instances across all pools.
    pub fn component_count(&self) -> usize {
        self.pools.values().map(ComponentPool::len).sum()
    }

    pub fn clear(&mut self) {
        self.pools.clear();
    }
}
