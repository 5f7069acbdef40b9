//! Convenience re-exports: `use cubefield::prelude::*` for the common items.

// Core
pub use crate::ecs::{ComponentMask, Entity, System, SystemHandle, World, WorldStats};
pub use crate::input::{KeyCode, MouseButton, RawInput};
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::time::Time;

// Components
pub use crate::components::{
    BodyType, Collider, ColliderShape, Health, Input, KeyState, MeshKind, Renderable, RigidBody,
    Tag, Velocity,
};

// Systems
pub use crate::physics::{PhysicsBridge, PhysicsSystem};
pub use crate::systems::{
    BoundsSystem, HealthSystem, InputSystem, MovementSystem, PlayerControllerSystem,
    PlayerTuning, RenderSystem,
};

// Demo
pub use crate::app::App;
pub use crate::config::{ConfigError, DemoConfig};
pub use crate::render::{CameraView, InstanceData, Renderer};
