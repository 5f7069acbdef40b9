//! # Component Types: Small Integer Ids and Presence Masks
//!
//! Components are plain data: a `Transform`, a `Velocity`, a `RigidBody`.
//! Any `'static + Send + Sync` type can be a component. What the framework
//! needs from a component *type* is a compact number it can use as a bit
//! position, so that "which components does this entity carry?" becomes a
//! single `u64` and "does this entity match that system?" becomes one AND.
//!
//! ## Type Registry
//!
//! [`component_type_id`] hands out [`ComponentTypeId`]s lazily: the first
//! call for a type assigns the next free number, every later call returns the
//! same one. Ids are never reused for the lifetime of the process.
//!
//! ```text
//! first use of Transform  → 0
//! first use of Velocity   → 1
//! Transform again         → 0
//! first use of RigidBody  → 2
//! ```
//!
//! There is room for [`MAX_COMPONENTS`] distinct types. Running out is a
//! configuration error, not something the program can recover from, so the
//! registry panics.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: key storage by `TypeId` (or a `ComponentId` issued
//!   per world) and match queries against archetype signatures.
//! - **EnTT (C++)**: a per-type static counter, same idea as ours.
//!
//! We keep one registry per process behind a lock. Every world in the
//! process agrees on the numbering, which keeps masks comparable.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex, PoisonError};

/// Maximum number of distinct component types a process can register.
/// Matches the width of [`ComponentMask`].
pub const MAX_COMPONENTS: usize = 64;

/// Stable small integer identifying a component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    /// The bit position of this type inside a [`ComponentMask`].
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

/// Assigns [`ComponentTypeId`]s, first-use-wins.
pub struct TypeRegistry {
    ids: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
    capacity: usize,
}

impl TypeRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: HashMap::new(),
            names: Vec::new(),
            capacity,
        }
    }

    /// Return the id for `type_id`, assigning the next one on first sight.
    ///
    /// # Panics
    ///
    /// Panics if the registry is full. The process cannot represent more
    /// component kinds than the mask width.
    pub fn id_for(&mut self, type_id: TypeId, name: &'static str) -> ComponentTypeId {
        if let Some(&id) = self.ids.get(&type_id) {
            return id;
        }
        let next = self.names.len();
        if next >= self.capacity {
            panic!(
                "Component type capacity exceeded: cannot register `{}`, \
                 all {} component type ids are in use",
                name, self.capacity
            );
        }
        let id = ComponentTypeId(next as u32);
        self.ids.insert(type_id, id);
        self.names.push(name);
        id
    }

    /// Look up an id without assigning one.
    pub fn get(&self, type_id: TypeId) -> Option<ComponentTypeId> {
        self.ids.get(&type_id).copied()
    }

    /// Type name registered under `id`, if any.
    pub fn name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.0 as usize).copied()
    }

    /// Number of ids handed out so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

static COMPONENT_TYPES: LazyLock<Mutex<TypeRegistry>> =
    LazyLock::new(|| Mutex::new(TypeRegistry::new(MAX_COMPONENTS)));

fn with_registry<R>(f: impl FnOnce(&mut TypeRegistry) -> R) -> R {
    // A panic while holding the lock (capacity overflow) leaves the registry
    // itself consistent, so a poisoned lock is still usable.
    let mut registry = COMPONENT_TYPES
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut registry)
}

/// Returns the process-wide [`ComponentTypeId`] for `T`, assigning a fresh
/// one on the first call for that type.
///
/// # Panics
///
/// Panics when more than [`MAX_COMPONENTS`] distinct types are registered.
pub fn component_type_id<T: 'static>() -> ComponentTypeId {
    with_registry(|r| r.id_for(TypeId::of::<T>(), std::any::type_name::<T>()))
}

/// Short type name registered for `id`. Used for diagnostics.
pub fn component_type_name(id: ComponentTypeId) -> Option<&'static str> {
    with_registry(|r| r.name(id))
}

/// Number of component types registered in this process so far.
pub fn registered_component_count() -> usize {
    with_registry(|r| r.len())
}

/// Fixed-width bitset of component types.
///
/// Used both as an entity's "what I carry" mask and as a system's "what I
/// need" mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComponentMask(u64);

impl ComponentMask {
    pub const EMPTY: Self = Self(0);

    /// Mask with the bit of every component in the tuple `S` set.
    ///
    /// ```ignore
    /// let mask = ComponentMask::of::<(Transform, Velocity)>();
    /// ```
    pub fn of<S: ComponentSet>() -> Self {
        S::mask()
    }

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn set(&mut self, id: ComponentTypeId) {
        self.0 |= 1u64 << id.0;
    }

    pub fn clear(&mut self, id: ComponentTypeId) {
        self.0 &= !(1u64 << id.0);
    }

    pub fn contains(self, id: ComponentTypeId) -> bool {
        self.0 & (1u64 << id.0) != 0
    }

    /// `true` if every bit of `required` is also set in `self`.
    pub fn is_superset_of(self, required: ComponentMask) -> bool {
        self.0 & required.0 == required.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the mask.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn union(self, other: ComponentMask) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterate over the component type ids in the mask, lowest first.
    pub fn iter(self) -> impl Iterator<Item = ComponentTypeId> {
        (0..MAX_COMPONENTS as u32)
            .filter(move |bit| self.0 & (1u64 << bit) != 0)
            .map(ComponentTypeId)
    }
}

impl fmt::Debug for ComponentMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentMask({:#066b})", self.0)
    }
}

/// A tuple of component types, used to declare what a system requires.
pub trait ComponentSet {
    fn mask() -> ComponentMask;
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: 'static),+> ComponentSet for ($($T,)+) {
            fn mask() -> ComponentMask {
                let mut mask = ComponentMask::EMPTY;
                $(mask.set(component_type_id::<$T>());)+
                mask
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
