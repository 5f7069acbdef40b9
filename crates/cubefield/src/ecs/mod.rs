//! # Bitmask ECS
//!
//! A small Entity Component System: entities are ids, components are plain
//! structs stored type-erased, and systems find the entities they care about
//! by comparing 64-bit presence masks.
//!
//! ## Module Overview
//!
//! - [`entity`]: Monotonic entity ids plus per-entity presence masks
//! - [`component`]: Component type ids, `ComponentMask`, `ComponentSet`
//! - [`storage`]: Type-erased sparse pools (`Box<dyn Any>`)
//! - [`query`]: Mask superset matching over the live set
//! - [`system`]: `System` trait, priorities, typed handles, schedule
//! - [`world`]: Central container (entities + components + systems + resources)

pub mod component;
pub mod entity;
pub(crate) mod query;
pub(crate) mod storage;
pub mod system;
pub mod world;

pub use component::{ComponentMask, ComponentSet, ComponentTypeId, MAX_COMPONENTS, component_type_id};
pub use entity::Entity;
pub use system::{System, SystemEntry, SystemHandle, SystemId};
pub use world::{World, WorldStats};
