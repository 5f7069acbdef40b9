use crate::components::Velocity;
use crate::ecs::{ComponentMask, System, World};
use crate::math::{Transform, integrate_rotation};

use super::has_active_body;

/// Integrates [`Velocity`] into [`Transform`] for entities the physics engine
/// doesn't own.
///
/// Position is explicit Euler. Rotation turns by `|ω|·dt` around `ω`, applied
/// in world space and renormalized every step.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl System for MovementSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Transform, Velocity)>()
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        for entity in world.entities_matching(self.required_components()) {
            if has_active_body(world, entity) {
                continue;
            }
            let Some(&velocity) = world.get::<Velocity>(entity) else {
                continue;
            };
            if let Some(transform) = world.get_mut::<Transform>(entity) {
                transform.position += velocity.linear * dt;
                transform.rotation = integrate_rotation(transform.rotation, velocity.angular, dt);
            }
        }
    }
}
