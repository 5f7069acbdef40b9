//! # Physics Bridge: Keeping ECS State and Rapier in Step
//!
//! The ECS describes bodies with plain components ([`RigidBody`],
//! [`Collider`], [`Transform`]). Rapier simulates its own objects in its own
//! sets. The [`PhysicsBridge`] owns those sets and translates between the two
//! worlds once per frame.
//!
//! ## Body Lifecycle
//!
//! ```text
//!                 first step with                 destroy_rigid_body /
//!                 Transform+RigidBody+Collider    entity destroyed /
//!   Uncreated ───────────────────────────► Active ─────────────────────► Removed
//!   native: None                           native: Some(handles)         native: None
//! ```
//!
//! ## Per-Frame Protocol
//!
//! ```text
//! step(world, dt)
//!  1. release   bodies whose entity died or lost RigidBody/Collider
//!  2. create    native bodies for eligible entities that have none
//!  3. push      Transform → native for kinematic bodies
//!  4. simulate  fixed 1/60 s steps from an accumulator, ≤ 10 per frame
//!  5. pull      native pose + velocities → Transform/RigidBody (dynamic only)
//! ```
//!
//! Static and kinematic bodies are never pulled: for them the ECS is the
//! source of truth. Dynamic bodies are the opposite, the engine owns their
//! pose and the ECS gets a copy every frame.
//!
//! ## Extract / Reinsert
//!
//! The bridge is a [`World`] resource. [`PhysicsSystem`] takes it out of the
//! world, runs [`PhysicsBridge::step`] with both borrowed, then puts it back.
//! Other systems reach the bridge the same way.
//!
//! ## Comparison
//!
//! - **bevy_rapier**: a full plugin with its own component set, change
//!   detection and writeback systems.
//! - **Ours**: one struct, one step function. Shapes and body parameters are
//!   read once at creation; changing them later means destroying and
//!   recreating the body.

use std::collections::HashMap;

use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline, Pose,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};

use crate::components::{BodyType, Collider, ColliderShape, NativeBodyRef, RigidBody, Transform};
use crate::ecs::{ComponentMask, Entity, System, World};
use crate::math::{Quat, Vec3, quat_to_scaled_axis};

/// Simulation step length in seconds.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

/// Most fixed steps run in a single frame. Whole steps beyond this are
/// dropped so a slow frame can't snowball.
pub const MAX_SUBSTEPS: u32 = 10;

/// Gravity used when none is configured.
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Planes are approximated by a wide, thin slab whose top face passes through
/// the body origin.
const PLANE_HALF_EXTENT: f32 = 1000.0;
const PLANE_HALF_THICKNESS: f32 = 0.5;

/// Smallest accepted shape dimension.
const MIN_EXTENT: f32 = 1e-3;

// ── Conversion helpers ──────────────────────────────────────────────────

fn rapier_body_type(rb: &RigidBody) -> RigidBodyType {
    match rb.body_type {
        BodyType::Static => RigidBodyType::Fixed,
        BodyType::Kinematic => RigidBodyType::KinematicPositionBased,
        // A massless dynamic body can't be integrated; the engine treats it
        // as immovable, same as a static one.
        BodyType::Dynamic if rb.mass > 0.0 => RigidBodyType::Dynamic,
        BodyType::Dynamic => RigidBodyType::Fixed,
    }
}

fn clamp_extent(value: f32, what: &str) -> f32 {
    if value >= MIN_EXTENT {
        value
    } else {
        log::warn!("Degenerate collider {what} {value}, clamping to {MIN_EXTENT}");
        MIN_EXTENT
    }
}

fn collider_builder(collider: &Collider) -> ColliderBuilder {
    match collider.shape {
        ColliderShape::Box { size } => {
            let half = size * 0.5;
            ColliderBuilder::cuboid(
                clamp_extent(half.x, "half-extent"),
                clamp_extent(half.y, "half-extent"),
                clamp_extent(half.z, "half-extent"),
            )
            .translation(collider.offset)
        }
        ColliderShape::Sphere { radius } => {
            ColliderBuilder::ball(clamp_extent(radius, "radius")).translation(collider.offset)
        }
        ColliderShape::Capsule { radius, height } => ColliderBuilder::capsule_y(
            (height * 0.5).max(0.0),
            clamp_extent(radius, "radius"),
        )
        .translation(collider.offset),
        ColliderShape::Plane { normal } => {
            let normal = normal.try_normalize().unwrap_or(Vec3::Y);
            let tilt = Quat::from_rotation_arc(Vec3::Y, normal);
            ColliderBuilder::cuboid(PLANE_HALF_EXTENT, PLANE_HALF_THICKNESS, PLANE_HALF_EXTENT)
                .rotation(quat_to_scaled_axis(tilt))
                .translation(collider.offset - normal * PLANE_HALF_THICKNESS)
        }
    }
}

// ── Resource ────────────────────────────────────────────────────────────

/// Owns the Rapier world and the entity ↔ body mapping.
pub struct PhysicsBridge {
    gravity: Vec3,
    gravity_enabled: bool,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    entity_to_body: HashMap<Entity, NativeBodyRef>,
    accumulator: f32,
    created_count: u64,
    frame_count: u64,
}

impl std::fmt::Debug for PhysicsBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsBridge")
            .field("gravity", &self.gravity)
            .field("gravity_enabled", &self.gravity_enabled)
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .finish()
    }
}

impl PhysicsBridge {
    /// Create an empty physics world with gravity (0, -9.81, 0).
    pub fn new() -> Self {
        let params = IntegrationParameters {
            dt: FIXED_TIMESTEP,
            ..IntegrationParameters::default()
        };
        Self {
            gravity: DEFAULT_GRAVITY,
            gravity_enabled: true,
            pipeline: PhysicsPipeline::new(),
            params,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            entity_to_body: HashMap::new(),
            accumulator: 0.0,
            created_count: 0,
            frame_count: 0,
        }
    }

    /// Set gravity (builder pattern).
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    // ── Gravity ──────────────────────────────────────────────────────

    /// The configured gravity vector, whether or not it is enabled.
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    /// Gravity actually applied during simulation.
    pub fn effective_gravity(&self) -> Vec3 {
        if self.gravity_enabled {
            self.gravity
        } else {
            Vec3::ZERO
        }
    }

    /// Replace the gravity vector and wake every body.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
        self.wake_all();
    }

    /// Switch gravity on or off and wake every body.
    pub fn enable_gravity(&mut self, enabled: bool) {
        self.gravity_enabled = enabled;
        log::info!(
            "Physics: gravity {} ({:?})",
            if enabled { "enabled" } else { "disabled" },
            self.effective_gravity()
        );
        self.wake_all();
    }

    fn wake_all(&mut self) {
        for native in self.entity_to_body.values() {
            if let Some(body) = self.bodies.get_mut(native.body) {
                body.wake_up(true);
            }
        }
    }

    // ── Introspection ────────────────────────────────────────────────

    /// Number of live native bodies.
    pub fn body_count(&self) -> usize {
        self.entity_to_body.len()
    }

    pub fn has_body(&self, entity: Entity) -> bool {
        self.entity_to_body.contains_key(&entity)
    }

    /// Mass the engine uses for the entity's body. Zero for immovable bodies.
    pub fn body_mass(&self, entity: Entity) -> Option<f32> {
        let body = self.bodies.get(self.entity_to_body.get(&entity)?.body)?;
        Some(if body.is_dynamic() { body.mass() } else { 0.0 })
    }

    /// Current native position, independent of what the ECS last saw.
    pub fn body_translation(&self, entity: Entity) -> Option<Vec3> {
        let body = self.bodies.get(self.entity_to_body.get(&entity)?.body)?;
        Some(body.translation())
    }

    /// Current native linear velocity.
    pub fn body_linear_velocity(&self, entity: Entity) -> Option<Vec3> {
        let body = self.bodies.get(self.entity_to_body.get(&entity)?.body)?;
        Some(body.linvel())
    }

    fn body_handle(&self, entity: Entity) -> Option<RigidBodyHandle> {
        self.entity_to_body.get(&entity).map(|native| native.body)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Build the native body for `entity` from its Transform, RigidBody and
    /// Collider. Returns `false` if a component is missing or the body
    /// already exists.
    pub fn create_rigid_body(&mut self, world: &mut World, entity: Entity) -> bool {
        if self.has_body(entity) {
            return false;
        }
        let (Some(transform), Some(rb), Some(collider)) = (
            world.get::<Transform>(entity).copied(),
            world.get::<RigidBody>(entity).copied(),
            world.get::<Collider>(entity).copied(),
        ) else {
            log::warn!("Cannot create physics body for {entity}: missing components");
            return false;
        };

        let body_type = rapier_body_type(&rb);
        let mut builder = RigidBodyBuilder::new(body_type)
            .translation(transform.position)
            .rotation(quat_to_scaled_axis(transform.rotation))
            .linvel(rb.linear_velocity)
            .angvel(rb.angular_velocity)
            .linear_damping(rb.linear_damping)
            .angular_damping(rb.angular_damping);
        if body_type != RigidBodyType::Fixed {
            builder = builder.can_sleep(false);
        }
        let body = self.bodies.insert(builder.build());

        let mut shape = collider_builder(&collider)
            .friction(rb.friction)
            .restitution(rb.restitution);
        shape = if body_type == RigidBodyType::Dynamic {
            shape.mass(rb.mass)
        } else {
            shape.density(0.0)
        };
        let collider_handle =
            self.colliders
                .insert_with_parent(shape.build(), body, &mut self.bodies);

        let native = NativeBodyRef {
            body,
            collider: collider_handle,
        };
        self.entity_to_body.insert(entity, native);
        if let Some(comp) = world.get_mut::<RigidBody>(entity) {
            comp.native = Some(native);
        }

        self.created_count += 1;
        if self.created_count % 10 == 0 {
            log::debug!("Created {} physics bodies", self.created_count);
        }
        true
    }

    /// Remove the native body and collider. The entity and its components
    /// stay; the RigidBody's back-reference is cleared.
    pub fn destroy_rigid_body(&mut self, world: &mut World, entity: Entity) -> bool {
        let released = self.release(entity);
        if let Some(rb) = world.get_mut::<RigidBody>(entity) {
            rb.native = None;
        }
        released
    }

    /// Drop the native objects for `entity` without touching the ECS. Every
    /// removal path ends here.
    fn release(&mut self, entity: Entity) -> bool {
        let Some(native) = self.entity_to_body.remove(&entity) else {
            return false;
        };
        // Removing the body also removes its attached collider.
        self.bodies.remove(
            native.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        true
    }

    /// Remove every native body. Components keep stale back-references,
    /// which the next step notices and rebuilds from.
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self.entity_to_body.keys().copied().collect();
        for entity in entities {
            self.release(entity);
        }
        self.accumulator = 0.0;
    }

    // ── Forces and Velocities ────────────────────────────────────────

    /// Apply a continuous force for the next simulated step. `rel_pos` is
    /// the application point relative to the body's center, in world axes.
    ///
    /// No-op (returns `false`) unless the entity has an active dynamic body.
    pub fn apply_force(&mut self, entity: Entity, force: Vec3, rel_pos: Vec3) -> bool {
        let Some(body) = self.dynamic_body_mut(entity) else {
            return false;
        };
        body.add_force(force, true);
        if rel_pos != Vec3::ZERO {
            body.add_torque(rel_pos.cross(force), true);
        }
        true
    }

    pub fn apply_torque(&mut self, entity: Entity, torque: Vec3) -> bool {
        let Some(body) = self.dynamic_body_mut(entity) else {
            return false;
        };
        body.add_torque(torque, true);
        true
    }

    /// Apply an instantaneous impulse at `rel_pos` from the body's center.
    pub fn apply_impulse(&mut self, entity: Entity, impulse: Vec3, rel_pos: Vec3) -> bool {
        let Some(body) = self.dynamic_body_mut(entity) else {
            return false;
        };
        body.apply_impulse(impulse, true);
        if rel_pos != Vec3::ZERO {
            body.apply_torque_impulse(rel_pos.cross(impulse), true);
        }
        true
    }

    /// Overwrite the linear velocity of any active body.
    pub fn set_linear_velocity(&mut self, entity: Entity, velocity: Vec3) -> bool {
        let Some(body) = self
            .body_handle(entity)
            .and_then(|h| self.bodies.get_mut(h))
        else {
            return false;
        };
        body.set_linvel(velocity, true);
        true
    }

    pub fn set_angular_velocity(&mut self, entity: Entity, velocity: Vec3) -> bool {
        let Some(body) = self
            .body_handle(entity)
            .and_then(|h| self.bodies.get_mut(h))
        else {
            return false;
        };
        body.set_angvel(velocity, true);
        true
    }

    fn dynamic_body_mut(&mut self, entity: Entity) -> Option<&mut rapier3d::prelude::RigidBody> {
        let handle = self.body_handle(entity)?;
        self.bodies.get_mut(handle).filter(|body| body.is_dynamic())
    }

    // ── Transform Sync ───────────────────────────────────────────────

    /// Push the entity's Transform into its native body and wake it.
    /// Kinematic bodies move there over the next step so they push what
    /// they hit; other bodies teleport.
    pub fn sync_transform_to_native(&mut self, world: &World, entity: Entity) -> bool {
        let Some(transform) = world.get::<Transform>(entity) else {
            return false;
        };
        let Some(body) = self
            .body_handle(entity)
            .and_then(|h| self.bodies.get_mut(h))
        else {
            return false;
        };
        if body.is_kinematic() {
            body.set_next_kinematic_position(Pose::from_parts(
                transform.position,
                transform.rotation,
            ));
        } else {
            body.set_translation(transform.position, true);
            body.set_rotation(transform.rotation, true);
        }
        body.wake_up(true);
        true
    }

    /// Copy native pose and velocities into the entity's Transform and
    /// RigidBody.
    pub fn sync_transform_from_native(&self, world: &mut World, entity: Entity) -> bool {
        let Some(body) = self.body_handle(entity).and_then(|h| self.bodies.get(h)) else {
            return false;
        };
        let position = body.translation();
        let rotation = *body.rotation();
        let linear = body.linvel();
        let angular = body.angvel();

        if let Some(transform) = world.get_mut::<Transform>(entity) {
            transform.position = position;
            transform.rotation = rotation;
        }
        if let Some(rb) = world.get_mut::<RigidBody>(entity) {
            rb.linear_velocity = linear;
            rb.angular_velocity = angular;
        }
        true
    }

    /// Kinematic-only sync: push the Transform if the body is kinematic.
    pub fn update_rigid_body(&mut self, world: &World, entity: Entity) -> bool {
        let is_kinematic = world
            .get::<RigidBody>(entity)
            .is_some_and(RigidBody::is_kinematic);
        is_kinematic && self.sync_transform_to_native(world, entity)
    }

    // ── Frame Step ───────────────────────────────────────────────────

    /// Run one frame of the bridge protocol. See the module docs.
    pub fn step(&mut self, world: &mut World, dt: f32) {
        let eligible = ComponentMask::of::<(Transform, RigidBody, Collider)>();

        // 1. Release bodies whose entity is gone, lost a required component,
        //    or had its RigidBody replaced by a fresh one.
        let stale: Vec<Entity> = self
            .entity_to_body
            .iter()
            .filter(|&(&entity, native)| {
                let still_eligible = world
                    .mask(entity)
                    .is_some_and(|mask| mask.is_superset_of(eligible));
                let same_body = world
                    .get::<RigidBody>(entity)
                    .is_some_and(|rb| rb.native == Some(*native));
                !(still_eligible && same_body)
            })
            .map(|(&entity, _)| entity)
            .collect();
        for entity in stale {
            self.release(entity);
            if let Some(rb) = world.get_mut::<RigidBody>(entity) {
                rb.native = None;
            }
        }

        // 2. Create bodies for eligible entities that don't have one.
        let candidates = world.entities_matching(eligible);
        for &entity in &candidates {
            if !self.has_body(entity) {
                self.create_rigid_body(world, entity);
            }
        }

        // 3. Kinematic bodies follow their Transform.
        for &entity in &candidates {
            self.update_rigid_body(world, entity);
        }

        // 4. Fixed-step simulation.
        self.accumulator += dt.max(0.0);
        let mut steps = 0;
        let gravity = self.effective_gravity();
        while self.accumulator >= FIXED_TIMESTEP && steps < MAX_SUBSTEPS {
            self.pipeline.step(
                gravity,
                &self.params,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &(),
                &(),
            );
            self.accumulator -= FIXED_TIMESTEP;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS && self.accumulator >= FIXED_TIMESTEP {
            log::trace!(
                "Physics: dropping {:.3}s of simulation time",
                self.accumulator - self.accumulator % FIXED_TIMESTEP
            );
            self.accumulator %= FIXED_TIMESTEP;
        }
        // Forces last one frame.
        for native in self.entity_to_body.values() {
            if let Some(body) = self.bodies.get_mut(native.body) {
                body.reset_forces(false);
                body.reset_torques(false);
            }
        }

        // 5. Pull dynamic bodies back into the ECS.
        let mut synced = 0usize;
        for &entity in &candidates {
            let is_dynamic = world
                .get::<RigidBody>(entity)
                .is_some_and(RigidBody::is_dynamic);
            if is_dynamic && self.sync_transform_from_native(world, entity) {
                synced += 1;
            }
        }

        self.frame_count += 1;
        if self.frame_count % 60 == 0 {
            log::trace!("Physics: synced {synced} dynamic bodies");
        }
    }
}

impl Default for PhysicsBridge {
    fn default() -> Self {
        Self::new()
    }
}

// ── System ──────────────────────────────────────────────────────────────

/// Runs [`PhysicsBridge::step`] each frame using the extract/reinsert
/// pattern. Does nothing if no bridge resource is present.
#[derive(Default)]
pub struct PhysicsSystem {
    announced: bool,
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for PhysicsSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Transform, RigidBody, Collider)>()
    }

    fn priority(&self) -> i32 {
        50
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let Some(mut bridge) = world.resource_remove::<PhysicsBridge>() else {
            return;
        };
        if !self.announced {
            self.announced = true;
            log::info!(
                "PhysicsSystem: found {} entities with physics components",
                world.count_matching(self.required_components())
            );
        }
        bridge.step(world, dt);
        world.insert_resource(bridge);
    }
}
