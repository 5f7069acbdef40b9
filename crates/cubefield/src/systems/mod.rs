//! # Systems: The Per-Frame Pipeline
//!
//! Each stage of a frame is one [`System`](crate::ecs::System). Priorities
//! put them in a fixed order:
//!
//! ```text
//! priority  system                   reads                writes
//! ───────── ──────────────────────── ──────────────────── ─────────────────────
//!   -100    InputSystem              RawInput (resource)  Input
//!    -50    PlayerControllerSystem   Input, Tag           Velocity / bridge
//!      0    MovementSystem           Velocity             Transform
//!     10    BoundsSystem             Transform            Transform, Velocity
//!     50    PhysicsSystem            RigidBody, Collider  Transform, RigidBody
//!     90    HealthSystem             Health               (destroys entities)
//!    100    RenderSystem             Transform, Renderable instance cache
//! ```
//!
//! `PhysicsSystem` lives in [`crate::physics`] next to the bridge it drives.

mod bounds;
mod health;
mod input;
mod movement;
mod player;
mod render;

pub use bounds::BoundsSystem;
pub use health::HealthSystem;
pub use input::InputSystem;
pub use movement::MovementSystem;
pub use player::{PlayerControllerSystem, PlayerTuning};
pub use render::RenderSystem;

use crate::components::RigidBody;
use crate::ecs::{Entity, World};

/// True if the entity's motion is owned by the physics engine.
pub(crate) fn has_active_body(world: &World, entity: Entity) -> bool {
    world
        .get::<RigidBody>(entity)
        .is_some_and(RigidBody::has_native_body)
}
