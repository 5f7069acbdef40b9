//! # Player Controller: Input to Motion Intent
//!
//! Turns the player's [`Input`] into a desired velocity. WASD moves on the
//! horizontal plane relative to where the player faces, Space jumps, Shift
//! descends, Q/E or the arrow keys turn, and dragging with the right mouse
//! button yaws.
//!
//! ## Where the Intent Goes
//!
//! ```text
//!                        ┌── active native body? ──┐
//!                        │ yes                     │ no
//!                        ▼                         ▼
//!   PhysicsBridge::set_*_velocity          Velocity component
//!   (engine handles gravity, contacts)     (simple ground-clamped gravity,
//!                                           integrated by MovementSystem)
//! ```
//!
//! Both paths compute the same intent from the same starting velocity, so
//! the controls feel the same whether or not the player is simulated.

use crate::components::{Input, RigidBody, Tag, Velocity};
use crate::ecs::{ComponentMask, Entity, System, World};
use crate::input::KeyCode;
use crate::math::{Quat, Transform, Vec3};
use crate::physics::PhysicsBridge;

use super::has_active_body;

/// Controller constants. Defaults match the demo's feel.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal speed in units per second.
    pub move_speed: f32,
    /// Turn rate in radians per second.
    pub rotate_speed: f32,
    /// Upward speed set by a jump.
    pub jump_speed: f32,
    /// Downward acceleration when airborne and not physics-driven.
    pub gravity: f32,
    /// Per-frame velocity multiplier when no movement key is held.
    pub friction: f32,
    /// Radians of yaw per pixel of horizontal mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 10.0,
            rotate_speed: 2.0,
            jump_speed: 15.0,
            gravity: 20.0,
            friction: 0.9,
            mouse_sensitivity: 0.005,
        }
    }
}

/// Height below which the player counts as standing on the ground.
const GROUND_EPSILON: f32 = 0.1;

/// Drives entities tagged `"Player"`.
#[derive(Debug, Default)]
pub struct PlayerControllerSystem {
    pub tuning: PlayerTuning,
}

impl PlayerControllerSystem {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self { tuning }
    }

    /// Apply one frame of input to `linear`/`angular` in place.
    fn steer(&self, input: &Input, transform: &Transform, linear: &mut Vec3, angular: &mut Vec3) {
        let t = &self.tuning;

        let mut movement = Vec3::ZERO;
        if input.is_key_held(KeyCode::KeyW) {
            movement += transform.forward();
        }
        if input.is_key_held(KeyCode::KeyS) {
            movement -= transform.forward();
        }
        if input.is_key_held(KeyCode::KeyA) {
            movement -= transform.right();
        }
        if input.is_key_held(KeyCode::KeyD) {
            movement += transform.right();
        }

        match movement.try_normalize() {
            Some(dir) => {
                let movement = dir * t.move_speed;
                linear.x = movement.x;
                linear.z = movement.z;
            }
            None => {
                linear.x *= t.friction;
                linear.z *= t.friction;
            }
        }

        if input.is_key_pressed(KeyCode::Space) {
            linear.y = t.jump_speed;
        }
        if input.is_key_held(KeyCode::ShiftLeft) {
            linear.y = -t.move_speed;
        }

        if input.is_key_held(KeyCode::ArrowLeft) || input.is_key_held(KeyCode::KeyQ) {
            angular.y = t.rotate_speed;
        } else if input.is_key_held(KeyCode::ArrowRight) || input.is_key_held(KeyCode::KeyE) {
            angular.y = -t.rotate_speed;
        } else {
            angular.y *= t.friction;
        }
    }

    /// Yaw from a right-button mouse drag, if any.
    fn mouse_yaw(&self, input: &Input) -> Option<Quat> {
        (input.is_right_mouse_down() && input.mouse_delta.x != 0.0).then(|| {
            Quat::from_axis_angle(Vec3::Y, -input.mouse_delta.x * self.tuning.mouse_sensitivity)
        })
    }

    fn drive_kinematic(&self, world: &mut World, entity: Entity, input: &Input, dt: f32) {
        let Some(&transform) = world.get::<Transform>(entity) else {
            return;
        };
        if world.get::<Velocity>(entity).is_none() {
            world.add_component(entity, Velocity::default());
        }
        let Some(velocity) = world.get_mut::<Velocity>(entity) else {
            return;
        };
        let (mut linear, mut angular) = (velocity.linear, velocity.angular);
        self.steer(input, &transform, &mut linear, &mut angular);

        let mut position = transform.position;
        if position.y > GROUND_EPSILON {
            linear.y -= self.tuning.gravity * dt;
        } else if linear.y < 0.0 {
            linear.y = 0.0;
            position.y = 0.0;
        }
        velocity.linear = linear;
        velocity.angular = angular;

        if let Some(transform) = world.get_mut::<Transform>(entity) {
            transform.position = position;
            if let Some(yaw) = self.mouse_yaw(input) {
                transform.rotation = (yaw * transform.rotation).normalize();
            }
        }
    }

    fn drive_simulated(&self, world: &mut World, entity: Entity, input: &Input) {
        let (Some(&transform), Some(rb)) =
            (world.get::<Transform>(entity), world.get::<RigidBody>(entity))
        else {
            return;
        };
        let (mut linear, mut angular) = (rb.linear_velocity, rb.angular_velocity);
        self.steer(input, &transform, &mut linear, &mut angular);

        let yaw = self.mouse_yaw(input);
        if let Some(yaw) = yaw {
            if let Some(transform) = world.get_mut::<Transform>(entity) {
                transform.rotation = (yaw * transform.rotation).normalize();
            }
        }

        let Some(mut bridge) = world.resource_remove::<PhysicsBridge>() else {
            return;
        };
        if yaw.is_some() {
            bridge.sync_transform_to_native(world, entity);
        }
        bridge.set_linear_velocity(entity, linear);
        bridge.set_angular_velocity(entity, angular);
        world.insert_resource(bridge);
    }
}

impl System for PlayerControllerSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Transform, Input, Tag)>()
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        for entity in world.entities_matching(self.required_components()) {
            if !world.get::<Tag>(entity).is_some_and(|tag| tag.is(Tag::PLAYER)) {
                continue;
            }
            let Some(input) = world.get::<Input>(entity).cloned() else {
                continue;
            };
            let simulated =
                has_active_body(world, entity) && world.has_resource::<PhysicsBridge>();
            if simulated {
                self.drive_simulated(world, entity, &input);
            } else {
                self.drive_kinematic(world, entity, &input, dt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Collider;

    const DT: f32 = 1.0 / 60.0;

    fn spawn_player(world: &mut World, position: Vec3) -> Entity {
        let e = world.create_entity();
        world.add_component(e, Transform::from_position(position));
        world.add_component(e, Input::new());
        world.add_component(e, Tag::new(Tag::PLAYER));
        e
    }

    fn press(world: &mut World, e: Entity, key: KeyCode) {
        world.get_mut::<Input>(e).unwrap().update_key(key, true);
    }

    fn world_with_controller() -> World {
        let mut world = World::new();
        world.add_system(PlayerControllerSystem::default());
        world
    }

    #[test]
    fn adds_velocity_and_moves_forward() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        press(&mut world, e, KeyCode::KeyW);
        world.update(DT);
        let v = world.get::<Velocity>(e).unwrap();
        assert!((v.linear - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn diagonal_is_normalized() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        press(&mut world, e, KeyCode::KeyW);
        press(&mut world, e, KeyCode::KeyD);
        world.update(DT);
        let v = world.get::<Velocity>(e).unwrap().linear;
        assert!((Vec3::new(v.x, 0.0, v.z).length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn friction_without_keys() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        world.add_component(e, Velocity::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)));
        world.update(DT);
        let v = world.get::<Velocity>(e).unwrap();
        assert!((v.linear.x - 9.0).abs() < 1e-5);
        assert!((v.angular.y - 1.8).abs() < 1e-5);
    }

    #[test]
    fn jump_then_gravity() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        press(&mut world, e, KeyCode::Space);
        world.update(DT);
        // On the ground: jump speed, no gravity yet.
        assert_eq!(world.get::<Velocity>(e).unwrap().linear.y, 15.0);

        world.get_mut::<Transform>(e).unwrap().position.y = 1.0;
        world.get_mut::<Input>(e).unwrap().end_frame();
        world.update(DT);
        let vy = world.get::<Velocity>(e).unwrap().linear.y;
        assert!((vy - (15.0 - 20.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn landing_clamps_to_ground() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::new(0.0, 0.05, 0.0));
        world.add_component(e, Velocity::linear(Vec3::new(0.0, -5.0, 0.0)));
        world.update(DT);
        assert_eq!(world.get::<Velocity>(e).unwrap().linear.y, 0.0);
        assert_eq!(world.get::<Transform>(e).unwrap().position.y, 0.0);
    }

    #[test]
    fn turning_keys() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        press(&mut world, e, KeyCode::KeyE);
        world.update(DT);
        assert_eq!(world.get::<Velocity>(e).unwrap().angular.y, -2.0);
    }

    #[test]
    fn right_drag_yaws() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        {
            let input = world.get_mut::<Input>(e).unwrap();
            input.mouse_buttons[1] = true;
            input.mouse_delta.x = 100.0;
        }
        world.update(DT);
        let forward = world.get::<Transform>(e).unwrap().forward();
        // Dragging right turns the player clockwise seen from above.
        let expected = Quat::from_rotation_y(-0.5) * Vec3::NEG_Z;
        assert!((forward - expected).length() < 1e-5);
    }

    #[test]
    fn non_player_ignored() {
        let mut world = world_with_controller();
        let e = spawn_player(&mut world, Vec3::ZERO);
        world.add_component(e, Tag::new(Tag::CUBE));
        press(&mut world, e, KeyCode::KeyW);
        world.update(DT);
        assert!(world.get::<Velocity>(e).is_none());
    }

    #[test]
    fn simulated_player_steers_through_bridge() {
        let mut world = World::new();
        world.insert_resource(PhysicsBridge::new().with_gravity(Vec3::ZERO));
        let e = spawn_player(&mut world, Vec3::ZERO);
        world.add_component(e, RigidBody::dynamic(1.0));
        world.add_component(e, Collider::sphere(0.5));
        let mut bridge = world.resource_remove::<PhysicsBridge>().unwrap();
        bridge.step(&mut world, 0.0);
        world.insert_resource(bridge);

        world.add_system(PlayerControllerSystem::default());
        press(&mut world, e, KeyCode::KeyD);
        world.update(DT);

        assert!(world.get::<Velocity>(e).is_none());
        let v = world
            .resource::<PhysicsBridge>()
            .body_linear_velocity(e)
            .unwrap();
        assert!((v - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
    }
}
