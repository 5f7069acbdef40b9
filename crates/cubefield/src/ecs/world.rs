//! # World: The Central Container
//!
//! The [`World`] owns all entities, components, systems, and resources. It's
//! the single source of truth for the whole simulation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ World                                               │
//! │                                                     │
//! │  entities: EntityRegistry                           │
//! │    live ids in creation order + ComponentMask each  │
//! │                                                     │
//! │  store: ComponentStore                              │
//! │    (ComponentTypeId, Entity) → Box<dyn Any>         │
//! │                                                     │
//! │  schedule: Schedule                                 │
//! │    systems sorted by priority                       │
//! │                                                     │
//! │  resources: HashMap<TypeId, Box<dyn Any>>           │
//! │    singleton data not tied to an entity             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The one rule tying the pieces together: bit *i* of an entity's mask is set
//! exactly when the store holds a component with type id *i* for it. Every
//! add, remove and destroy updates both sides in the same call.
//!
//! ## Running Systems
//!
//! Systems need `&mut World`, but the World owns the systems. [`World::update`]
//! takes the schedule out, runs it against `self`, then puts it back. Systems
//! registered while the frame runs land in a fresh schedule and are merged in
//! once the frame is over. Enabling, disabling or removing a system from
//! inside a frame is deferred the same way.
//!
//! ## Resources
//!
//! Resources are "global" data: the raw device input, the physics bridge.
//! They're stored as type-erased boxes keyed by `TypeId`. A system that needs
//! a resource *and* the world at the same time uses the extract/reinsert
//! pattern: [`resource_remove`](World::resource_remove), work, then
//! [`insert_resource`](World::insert_resource).
//!
//! ## Comparison
//!
//! - **hecs**: World stores only entities/components. No built-in resources
//!   or systems.
//! - **bevy_ecs**: World has entities, components, resources, schedules,
//!   observers, hooks... much more.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::{
    ComponentMask, ComponentSet, component_type_id, registered_component_count,
};
use super::entity::{Entity, EntityRegistry};
use super::query;
use super::storage::ComponentStore;
#[cfg(feature = "diagnostics")]
use super::system::SystemTiming;
use super::system::{Schedule, System, SystemEntry, SystemHandle, SystemId};

/// Schedule changes requested while the schedule is out running.
enum DeferredOp {
    SetEnabled(SystemId, bool),
    Remove(SystemId),
    ClearSystems,
}

/// Counts reported by [`World::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Live entities.
    pub entity_count: usize,
    /// Component instances across all types.
    pub component_count: usize,
    /// Registered systems (enabled or not).
    pub system_count: usize,
    /// Enabled systems.
    pub enabled_system_count: usize,
    /// Component types registered in this process.
    pub component_type_count: usize,
    /// Completed `update` calls.
    pub frame: u64,
}

/// The central container for all simulation state.
pub struct World {
    entities: EntityRegistry,
    store: ComponentStore,
    schedule: Schedule,
    /// Global resources (singletons), keyed by TypeId.
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    next_system_id: u32,
    /// `true` while `update` has the schedule checked out.
    updating: bool,
    /// Ids of the checked-out schedule, for answering requests mid-frame.
    running: Vec<SystemId>,
    deferred: Vec<DeferredOp>,
    frame: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityRegistry::new(),
            store: ComponentStore::new(),
            schedule: Schedule::new(),
            resources: HashMap::new(),
            next_system_id: 0,
            updating: false,
            running: Vec::new(),
            deferred: Vec::new(),
            frame: 0,
        }
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Insert a resource (singleton value). Replaces any existing resource of
    /// the same type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a shared reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource<T: 'static + Send + Sync>(&self) -> &T {
        self.get_resource::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Get a mutable reference to a resource.
    ///
    /// # Panics
    ///
    /// Panics if the resource hasn't been inserted.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> &mut T {
        self.get_resource_mut::<T>().unwrap_or_else(|| {
            panic!(
                "Resource `{}` not found. Did you forget to insert it?",
                std::any::type_name::<T>()
            )
        })
    }

    /// Try to get a shared reference to a resource. Returns `None` if not found.
    pub fn get_resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|r| r.downcast_ref::<T>())
    }

    /// Try to get a mutable reference to a resource. Returns `None` if not found.
    pub fn get_resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|r| r.downcast_mut::<T>())
    }

    pub fn has_resource<T: 'static + Send + Sync>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Remove a resource, taking ownership. Returns `None` if not present.
    ///
    /// Use this for the extract/reinsert pattern when you need to borrow a
    /// resource while also borrowing the world.
    pub fn resource_remove<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|r| r.downcast::<T>().ok())
            .map(|b| *b)
    }

    // ── Entity Management ────────────────────────────────────────────

    /// Create a new, component-less entity. Ids start at 1 and are never
    /// handed out twice.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Destroy an entity and every component it carries.
    ///
    /// Returns `false` if the entity is null or already dead.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if self.entities.destroy(entity).is_none() {
            return false;
        }
        self.store.remove_entity(entity);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.alive_count()
    }

    /// All live entities, in creation order.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.iter().map(|(e, _)| e).collect()
    }

    /// The component presence mask of a live entity.
    pub fn mask(&self, entity: Entity) -> Option<ComponentMask> {
        self.entities.mask(entity)
    }

    // ── Per-Entity Component Access ──────────────────────────────────

    /// Attach `value` to `entity`, replacing any existing `T`. Returns a
    /// mutable borrow of the stored value, or `None` if the entity isn't alive.
    pub fn add_component<T: 'static + Send + Sync>(
        &mut self,
        entity: Entity,
        value: T,
    ) -> Option<&mut T> {
        let id = component_type_id::<T>();
        if !self.entities.set_bit(entity, id) {
            return None;
        }
        Some(self.store.insert(id, entity, value))
    }

    /// Get a shared reference to a component on an entity.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.store.get::<T>(component_type_id::<T>(), entity)
    }

    /// Get a mutable reference to a component on an entity.
    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.store.get_mut::<T>(component_type_id::<T>(), entity)
    }

    /// Remove a `T` from an entity. Returns `false` if it wasn't there.
    pub fn remove_component<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        self.take_component::<T>(entity).is_some()
    }

    /// Remove a `T` from an entity and hand it back.
    pub fn take_component<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let id = component_type_id::<T>();
        let value = self.store.take::<T>(id, entity)?;
        self.entities.clear_bit(entity, id);
        Some(value)
    }

    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        let id = component_type_id::<T>();
        self.entities.mask(entity).is_some_and(|m| m.contains(id))
    }

    // ── Query ────────────────────────────────────────────────────────

    /// Live entities whose mask contains every bit of `required`, in creation
    /// order. Recomputed on every call.
    pub fn entities_matching(&self, required: ComponentMask) -> Vec<Entity> {
        query::entities_matching(&self.entities, required)
    }

    /// Live entities carrying every component in the tuple `S`.
    ///
    /// ```ignore
    /// for entity in world.query::<(Transform, Velocity)>() {
    ///     let vel = world.get::<Velocity>(entity).unwrap().linear;
    ///     world.get_mut::<Transform>(entity).unwrap().position += vel * dt;
    /// }
    /// ```
    pub fn query<S: ComponentSet>(&self) -> Vec<Entity> {
        self.entities_matching(ComponentMask::of::<S>())
    }

    pub fn count_matching(&self, required: ComponentMask) -> usize {
        query::count_matching(&self.entities, required)
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Register a system. It takes its place by priority (stable among equal
    /// priorities) and runs from the next frame on.
    pub fn add_system<S: System>(&mut self, system: S) -> SystemHandle<S> {
        let id = SystemId(self.next_system_id);
        self.next_system_id += 1;
        log::debug!(
            "Registered system {} (priority {})",
            system.name(),
            system.priority()
        );
        self.schedule.insert(SystemEntry::new(id, Box::new(system)));
        SystemHandle::new(id)
    }

    /// Borrow a registered system by handle.
    ///
    /// While a frame is running only systems added during that frame are
    /// reachable.
    pub fn system<S: System>(&self, handle: SystemHandle<S>) -> Option<&S> {
        self.schedule.get(handle.id())?.downcast_ref::<S>()
    }

    pub fn system_mut<S: System>(&mut self, handle: SystemHandle<S>) -> Option<&mut S> {
        self.schedule.get_mut(handle.id())?.downcast_mut::<S>()
    }

    /// Enable or disable a system. Disabled systems receive no hook calls.
    ///
    /// Returns `false` if the handle doesn't name a registered system.
    pub fn set_system_enabled<S: System>(&mut self, handle: SystemHandle<S>, enabled: bool) -> bool {
        if let Some(entry) = self.schedule.get_mut(handle.id()) {
            entry.set_enabled(enabled);
            return true;
        }
        if self.is_running(handle.id()) {
            self.deferred.push(DeferredOp::SetEnabled(handle.id(), enabled));
            return true;
        }
        false
    }

    pub fn is_system_enabled<S: System>(&self, handle: SystemHandle<S>) -> bool {
        self.schedule
            .get(handle.id())
            .is_some_and(SystemEntry::is_enabled)
    }

    /// Unregister a system. Returns `false` if it wasn't registered.
    pub fn remove_system<S: System>(&mut self, handle: SystemHandle<S>) -> bool {
        if self.schedule.remove(handle.id()).is_some() {
            return true;
        }
        if self.is_running(handle.id()) {
            self.deferred.push(DeferredOp::Remove(handle.id()));
            return true;
        }
        false
    }

    /// `id` belongs to the schedule currently out running and no removal of
    /// it is queued yet.
    fn is_running(&self, id: SystemId) -> bool {
        self.updating
            && self.running.contains(&id)
            && !self.deferred.iter().any(|op| match op {
                DeferredOp::Remove(queued) => *queued == id,
                DeferredOp::ClearSystems => true,
                DeferredOp::SetEnabled(..) => false,
            })
    }

    pub fn system_count(&self) -> usize {
        self.schedule.len()
    }

    /// Registered systems in execution order.
    pub fn systems(&self) -> impl Iterator<Item = &SystemEntry> {
        self.schedule.entries()
    }

    /// Run one frame: each enabled system's `pre_update`, `update` and
    /// `post_update`, in ascending priority order.
    pub fn update(&mut self, dt: f32) {
        let mut schedule = std::mem::take(&mut self.schedule);
        self.running = schedule.entries().map(SystemEntry::id).collect();
        self.updating = true;
        schedule.run(self, dt);
        self.updating = false;
        self.running.clear();

        let added = std::mem::replace(&mut self.schedule, schedule);
        self.schedule.merge(added);

        for op in std::mem::take(&mut self.deferred) {
            match op {
                DeferredOp::SetEnabled(id, enabled) => {
                    if let Some(entry) = self.schedule.get_mut(id) {
                        entry.set_enabled(enabled);
                    }
                }
                DeferredOp::Remove(id) => {
                    self.schedule.remove(id);
                }
                DeferredOp::ClearSystems => self.schedule.clear(),
            }
        }

        self.frame += 1;
    }

    /// Per-system timings of the last frame, in execution order.
    #[cfg(feature = "diagnostics")]
    pub fn system_timings(&self) -> &[SystemTiming] {
        &self.schedule.timings
    }

    /// Number of completed `update` calls.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // ── Whole-World ──────────────────────────────────────────────────

    /// Drop every entity, component and system. Resources survive, and the
    /// entity id counter keeps counting so old handles stay dead.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.store.clear();
        if self.updating {
            self.deferred.push(DeferredOp::ClearSystems);
        }
        self.schedule.clear();
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            entity_count: self.entities.alive_count(),
            component_count: self.store.component_count(),
            system_count: self.schedule.len(),
            enabled_system_count: self.schedule.entries().filter(|e| e.is_enabled()).count(),
            component_type_count: registered_component_count(),
            frame: self.frame,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
