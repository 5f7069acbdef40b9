//! # App: The Cube Field Demo
//!
//! Owns a [`World`], registers the full system pipeline, populates the demo
//! scene and runs one frame at a time. The host (a window loop or the
//! headless example) only has to forward input, call [`App::frame`], and
//! provide a [`Renderer`].
//!
//! ## Scene
//!
//! ```text
//!   Player     green cube at (0, 5, 0), keyboard/mouse controlled
//!   Cube ×N    random position, scale, color and velocity, bouncing in the box
//!   Ground     11×11 flat tiles at y = -2, spaced 4 apart (decoration)
//!   Physics    a static slab plus dynamic cubes dropped onto it
//! ```
//!
//! ## Frame
//!
//! ```text
//! frame(dt, renderer)
//!  1. Time::advance(dt)                 clamp long stalls
//!  2. world.update(dt)                  input → player → movement → bounds
//!                                        → physics → health → render cache
//!  3. demo actions                      from the player's Pressed keys
//!  4. spin                              give idle cubes an angular velocity
//!  5. renderer.draw_cubes(camera, ..)   follow camera behind the player
//! ```
//!
//! Actions run after the update so they see this frame's key edges; whatever
//! they spawn or remove shows up in the next frame's render cache.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use winit::event::WindowEvent;

use crate::components::{Collider, Health, Input, Renderable, RigidBody, Tag, Velocity};
use crate::config::DemoConfig;
use crate::ecs::{Entity, SystemHandle, World, WorldStats};
use crate::input::{KeyCode, RawInput};
use crate::math::{Quat, Transform, Vec3};
use crate::physics::{PhysicsBridge, PhysicsSystem};
use crate::render::{CameraView, Renderer};
use crate::systems::{
    BoundsSystem, HealthSystem, InputSystem, MovementSystem, PlayerControllerSystem,
    RenderSystem,
};
use crate::time::Time;

const PLAYER_COLOR: Vec3 = Vec3::new(0.2, 0.8, 0.2);
const SPAWNED_COLOR: Vec3 = Vec3::new(1.0, 0.0, 1.0);
const GROUND_COLOR: Vec3 = Vec3::new(0.3, 0.3, 0.3);
const FLOOR_COLOR: Vec3 = Vec3::new(0.25, 0.25, 0.35);
const SPIN: Vec3 = Vec3::new(0.5, 1.0, 0.2);

/// Physics drop grid: distance between cube centers, random offset per
/// cube, and slab overhang past the outermost cubes. Unit cubes spin about
/// Y, so neighbours need more than 1.5 units between centers.
const PILE_SPACING: f32 = 2.5;
const PILE_JITTER: f32 = 0.3;
const PILE_MARGIN: f32 = 10.0;

/// Camera distance behind and above the player.
const CAMERA_BACK: f32 = 10.0;
const CAMERA_UP: f32 = 5.0;

/// Zoom range, in degrees of vertical field of view.
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

pub struct App {
    world: World,
    config: DemoConfig,
    rng: StdRng,
    player: Entity,
    render: SystemHandle<RenderSystem>,
    spin: bool,
    zoom: f32,
    quit_requested: bool,
}

impl App {
    pub fn new(config: DemoConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(RawInput::new());
        world.insert_resource(Time::new());
        world.insert_resource(PhysicsBridge::new().with_gravity(config.physics.gravity));

        world.add_system(InputSystem::new());
        world.add_system(PlayerControllerSystem::new(config.player));
        world.add_system(MovementSystem::new());
        world.add_system(BoundsSystem::new(
            config.bounds.min,
            config.bounds.max,
            config.bounds.wrap,
        ));
        world.add_system(PhysicsSystem::new());
        world.add_system(HealthSystem::new());
        let render = world.add_system(RenderSystem::new());

        let mut app = Self {
            world,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            player: Entity::NULL,
            render,
            spin: true,
            zoom: MAX_ZOOM,
            quit_requested: false,
        };
        app.populate();
        log::info!(
            "Scene ready: {} entities, {} systems",
            app.world.entity_count(),
            app.world.system_count()
        );
        app
    }

    fn populate(&mut self) {
        self.player = self.spawn_player();
        for _ in 0..self.config.floating_cubes {
            self.spawn_floating_cube();
        }
        self.spawn_ground();
        self.spawn_physics_pile();
    }

    fn spawn_player(&mut self) -> Entity {
        let world = &mut self.world;
        let e = world.create_entity();
        world.add_component(e, Transform::from_xyz(0.0, 5.0, 0.0));
        world.add_component(e, Velocity::default());
        world.add_component(e, Renderable::cube(PLAYER_COLOR));
        world.add_component(e, Input::new());
        world.add_component(e, Tag::new(Tag::PLAYER));
        world.add_component(e, Health::default());
        e
    }

    fn spawn_floating_cube(&mut self) -> Entity {
        let rng = &mut self.rng;
        let position = Vec3::new(
            rng.gen_range(-40.0..40.0),
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-40.0..40.0),
        );
        let scale = rng.gen_range(0.5..2.0);
        let linear = Vec3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        );
        let angular = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let color = Vec3::new(
            rng.gen_range(0.3..1.0),
            rng.gen_range(0.3..1.0),
            rng.gen_range(0.3..1.0),
        );

        let world = &mut self.world;
        let e = world.create_entity();
        world.add_component(e, Transform::from_position(position).with_scale(Vec3::splat(scale)));
        world.add_component(e, Velocity::new(linear, angular));
        world.add_component(e, Renderable::cube(color));
        world.add_component(e, Tag::new(Tag::CUBE));
        e
    }

    fn spawn_ground(&mut self) {
        let n = self.config.ground_grid as i32;
        let half = n / 2;
        let spacing = self.config.ground_spacing;
        for x in -half..n - half {
            for z in -half..n - half {
                let e = self.world.create_entity();
                self.world.add_component(
                    e,
                    Transform::from_xyz(x as f32 * spacing, -2.0, z as f32 * spacing)
                        .with_scale(Vec3::new(2.0, 0.1, 2.0)),
                );
                self.world.add_component(e, Renderable::cube(GROUND_COLOR));
                self.world.add_component(e, Tag::new(Tag::GROUND));
            }
        }
    }

    fn spawn_physics_pile(&mut self) {
        let physics = self.config.physics;
        if physics.cubes == 0 {
            return;
        }
        // Drops sit on a grid with a gap between neighbours, so no cube lands
        // on another and gets shoved sideways off the slab.
        let columns = (physics.cubes as f32).sqrt().ceil() as usize;
        let half_span = (columns - 1) as f32 * PILE_SPACING * 0.5;
        let side = 2.0 * (half_span + PILE_MARGIN);
        let slab = Vec3::new(side, 1.0, side);

        let floor = self.world.create_entity();
        self.world.add_component(
            floor,
            Transform::from_xyz(0.0, physics.floor_height - slab.y * 0.5, 0.0).with_scale(slab),
        );
        self.world.add_component(floor, RigidBody::fixed().with_friction(0.8));
        self.world.add_component(floor, Collider::cuboid(slab));
        self.world.add_component(floor, Renderable::cube(FLOOR_COLOR));
        self.world.add_component(floor, Tag::new(Tag::PHYSICS));

        for i in 0..physics.cubes {
            let (row, col) = (i / columns, i % columns);
            let jitter = PILE_JITTER;
            let position = Vec3::new(
                col as f32 * PILE_SPACING - half_span + self.rng.gen_range(-jitter..jitter),
                physics.floor_height + 2.0 + self.rng.gen_range(0.0..1.0),
                row as f32 * PILE_SPACING - half_span + self.rng.gen_range(-jitter..jitter),
            );
            let tilt = Quat::from_rotation_y(self.rng.gen_range(0.0..std::f32::consts::TAU));
            let color = Vec3::new(1.0, self.rng.gen_range(0.4..0.9), 0.2);

            let e = self.world.create_entity();
            self.world
                .add_component(e, Transform::from_position(position).with_rotation(tilt));
            self.world
                .add_component(e, RigidBody::dynamic(1.0).with_restitution(0.2));
            self.world.add_component(e, Collider::cuboid(Vec3::ONE));
            self.world.add_component(e, Renderable::cube(color));
            self.world.add_component(e, Tag::new(Tag::PHYSICS));
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn stats(&self) -> WorldStats {
        self.world.stats()
    }

    pub fn spin_enabled(&self) -> bool {
        self.spin
    }

    /// Escape was pressed or the window asked to close.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn raw_input_mut(&mut self) -> &mut RawInput {
        self.world.resource_mut::<RawInput>()
    }

    /// Forward a winit event. Input goes to [`RawInput`]; resizes update the
    /// aspect ratio.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.quit_requested = true,
            WindowEvent::Resized(size) => self.config.viewport = [size.width, size.height],
            _ => self.raw_input_mut().handle_window_event(event),
        }
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Advance the demo by one frame and draw it.
    pub fn frame(&mut self, dt: f32, renderer: &mut impl Renderer) {
        let dt = {
            let time = self.world.resource_mut::<Time>();
            time.advance(Duration::from_secs_f32(dt.max(0.0)));
            time.delta_secs()
        };

        self.world.update(dt);
        self.handle_actions();
        if self.spin {
            self.apply_spin();
        }

        let camera = self.camera();
        let instances = self
            .world
            .system(self.render)
            .map(RenderSystem::instances)
            .unwrap_or(&[]);
        renderer.draw_cubes(&camera, instances);
    }

    fn handle_actions(&mut self) {
        let Some(input) = self.world.get::<Input>(self.player) else {
            return;
        };
        let pressed = |key| input.is_key_pressed(key);
        let (spawn, remove, spin, gravity, quit) = (
            pressed(KeyCode::Digit1),
            pressed(KeyCode::Digit2),
            pressed(KeyCode::Digit3),
            pressed(KeyCode::KeyG),
            pressed(KeyCode::Escape),
        );
        let zoom = input.scroll_delta.y;

        if spawn {
            self.spawn_cube_ahead();
        }
        if remove {
            self.remove_random_cube();
        }
        if spin {
            self.toggle_spin();
        }
        if gravity {
            self.toggle_gravity();
        }
        if quit {
            self.quit_requested = true;
        }
        if zoom != 0.0 {
            self.zoom = (self.zoom - zoom).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Launch a magenta cube three units in front of the player.
    pub fn spawn_cube_ahead(&mut self) -> Option<Entity> {
        let player = *self.world.get::<Transform>(self.player)?;
        let forward = player.forward();

        let e = self.world.create_entity();
        self.world
            .add_component(e, Transform::from_position(player.position + forward * 3.0));
        self.world
            .add_component(e, Velocity::new(forward * 10.0, Vec3::new(1.0, 2.0, 0.5)));
        self.world.add_component(e, Renderable::cube(SPAWNED_COLOR));
        self.world.add_component(e, Tag::new(Tag::SPAWNED));
        log::info!("Spawned {e}");
        Some(e)
    }

    /// Destroy one randomly chosen floating or spawned cube.
    pub fn remove_random_cube(&mut self) -> Option<Entity> {
        let candidates: Vec<Entity> = self
            .world
            .query::<(Tag,)>()
            .into_iter()
            .filter(|&e| {
                self.world
                    .get::<Tag>(e)
                    .is_some_and(|tag| tag.is(Tag::CUBE) || tag.is(Tag::SPAWNED))
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let victim = candidates[self.rng.gen_range(0..candidates.len())];
        self.world.destroy_entity(victim);
        log::info!("Removed {victim} ({} remaining)", candidates.len() - 1);
        Some(victim)
    }

    /// Flip cube spin. Returns the new state.
    pub fn toggle_spin(&mut self) -> bool {
        self.spin = !self.spin;
        log::info!("Cube spin: {}", if self.spin { "on" } else { "off" });
        self.spin
    }

    /// Flip physics gravity. Returns the new state.
    pub fn toggle_gravity(&mut self) -> bool {
        let bridge = self.world.resource_mut::<PhysicsBridge>();
        let enabled = !bridge.gravity_enabled();
        bridge.enable_gravity(enabled);
        enabled
    }

    /// Give every floating cube without a velocity a gentle spin.
    fn apply_spin(&mut self) {
        for e in self.world.query::<(Tag,)>() {
            let idle = self.world.get::<Tag>(e).is_some_and(|tag| tag.is(Tag::CUBE))
                && !self.world.has::<Velocity>(e);
            if idle {
                self.world.add_component(e, Velocity::angular(SPIN));
            }
        }
    }

    /// Follow camera: behind and above the player, looking at it.
    pub fn camera(&self) -> CameraView {
        let aspect = self.config.aspect_ratio();
        let fov = self.zoom.to_radians();
        match self.world.get::<Transform>(self.player) {
            Some(t) => {
                let eye = t.position - t.forward() * CAMERA_BACK + Vec3::Y * CAMERA_UP;
                CameraView::perspective(eye, t.position, fov, aspect)
            }
            None => CameraView::perspective(Vec3::new(0.0, 10.0, 50.0), Vec3::ZERO, fov, aspect),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DemoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::InstanceData;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(CameraView, Vec<InstanceData>)>,
    }

    impl Renderer for Recorder {
        fn draw_cubes(&mut self, camera: &CameraView, instances: &[InstanceData]) {
            self.frames.push((*camera, instances.to_vec()));
        }
    }

    fn small_config() -> DemoConfig {
        DemoConfig {
            floating_cubes: 10,
            ground_grid: 3,
            ..DemoConfig::default()
        }
    }

    fn count_tagged(app: &App, name: &str) -> usize {
        app.world()
            .query::<(Tag,)>()
            .into_iter()
            .filter(|&e| app.world().get::<Tag>(e).is_some_and(|t| t.is(name)))
            .count()
    }

    fn tap(app: &mut App, renderer: &mut Recorder, key: KeyCode) {
        app.raw_input_mut().set_key(key, true);
        app.frame(DT, renderer);
        app.raw_input_mut().set_key(key, false);
        app.frame(DT, renderer);
    }

    #[test]
    fn scene_population() {
        let config = small_config();
        let app = App::new(config.clone());
        assert_eq!(count_tagged(&app, Tag::PLAYER), 1);
        assert_eq!(count_tagged(&app, Tag::CUBE), 10);
        assert_eq!(count_tagged(&app, Tag::GROUND), 9);
        assert_eq!(count_tagged(&app, Tag::PHYSICS), config.physics.cubes + 1);
        assert_eq!(app.world().system_count(), 7);
    }

    #[test]
    fn frame_draws_every_visible_entity() {
        let mut app = App::new(small_config());
        let mut renderer = Recorder::default();
        app.frame(DT, &mut renderer);
        let (_, instances) = &renderer.frames[0];
        assert_eq!(instances.len(), app.world().entity_count());
    }

    #[test]
    fn same_seed_same_scene() {
        let a = App::new(small_config());
        let b = App::new(small_config());
        let positions = |app: &App| -> Vec<Vec3> {
            app.world()
                .query::<(Transform,)>()
                .into_iter()
                .map(|e| app.world().get::<Transform>(e).unwrap().position)
                .collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn key_one_spawns_ahead() {
        let mut app = App::new(small_config());
        let mut renderer = Recorder::default();
        tap(&mut app, &mut renderer, KeyCode::Digit1);
        assert_eq!(count_tagged(&app, Tag::SPAWNED), 1);

        // Holding the key doesn't spawn again.
        app.raw_input_mut().set_key(KeyCode::Digit1, true);
        for _ in 0..3 {
            app.frame(DT, &mut renderer);
        }
        assert_eq!(count_tagged(&app, Tag::SPAWNED), 2);
    }

    #[test]
    fn spawned_cube_velocity_follows_player_facing() {
        let mut app = App::new(small_config());
        let e = app.spawn_cube_ahead().unwrap();
        let player = *app.world().get::<Transform>(app.player()).unwrap();
        let t = app.world().get::<Transform>(e).unwrap();
        assert!((t.position - (player.position + Vec3::NEG_Z * 3.0)).length() < 1e-5);
        let v = app.world().get::<Velocity>(e).unwrap();
        assert_eq!(v.linear, Vec3::NEG_Z * 10.0);
        assert_eq!(v.angular, Vec3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn key_two_removes_a_cube() {
        let mut app = App::new(small_config());
        let mut renderer = Recorder::default();
        tap(&mut app, &mut renderer, KeyCode::Digit2);
        assert_eq!(count_tagged(&app, Tag::CUBE), 9);
        assert_eq!(count_tagged(&app, Tag::PLAYER), 1);
    }

    #[test]
    fn remove_with_no_cubes_is_none() {
        let mut app = App::new(DemoConfig {
            floating_cubes: 0,
            ..small_config()
        });
        assert_eq!(app.remove_random_cube(), None);
    }

    #[test]
    fn spin_gives_idle_cubes_velocity() {
        let mut app = App::new(small_config());
        let mut renderer = Recorder::default();
        let cube = app
            .world()
            .query::<(Tag,)>()
            .into_iter()
            .find(|&e| app.world().get::<Tag>(e).is_some_and(|t| t.is(Tag::CUBE)))
            .unwrap();
        app.world_mut().remove_component::<Velocity>(cube);

        tap(&mut app, &mut renderer, KeyCode::Digit3);
        assert!(!app.spin_enabled());
        app.world_mut().remove_component::<Velocity>(cube);
        app.frame(DT, &mut renderer);
        assert!(!app.world().has::<Velocity>(cube));

        assert!(app.toggle_spin());
        app.frame(DT, &mut renderer);
        assert_eq!(app.world().get::<Velocity>(cube).unwrap().angular, SPIN);
    }

    #[test]
    fn key_g_toggles_gravity() {
        let mut app = App::new(small_config());
        let mut renderer = Recorder::default();
        tap(&mut app, &mut renderer, KeyCode::KeyG);
        assert!(!app.world().resource::<PhysicsBridge>().gravity_enabled());
        tap(&mut app, &mut renderer, KeyCode::KeyG);
        assert!(app.world().resource::<PhysicsBridge>().gravity_enabled());
    }

    #[test]
    fn physics_cubes_settle_on_floor() {
        let mut app = App::new(DemoConfig {
            floating_cubes: 0,
            ..small_config()
        });
        let mut renderer = Recorder::default();
        for _ in 0..600 {
            app.frame(DT, &mut renderer);
        }
        let floor = app.config().physics.floor_height;
        let bridge = app.world().resource::<PhysicsBridge>();
        assert_eq!(bridge.body_count(), app.config().physics.cubes + 1);

        let mut resting = 0;
        for e in app.world().query::<(RigidBody, Transform)>() {
            let y = app.world().get::<Transform>(e).unwrap().position.y;
            assert!(y > floor - 1.0, "{e} fell through the floor: y = {y}");
            if app.world().get::<RigidBody>(e).unwrap().is_dynamic() {
                // Unit cube lying flat on the slab's top face.
                assert!((y - (floor + 0.5)).abs() < 0.1, "{e} is not resting on the floor: y = {y}");
                resting += 1;
            }
        }
        assert_eq!(resting, app.config().physics.cubes);
    }

    #[test]
    fn physics_drops_start_apart() {
        let app = App::new(small_config());
        let drops: Vec<Vec3> = app
            .world()
            .query::<(RigidBody, Transform)>()
            .into_iter()
            .filter(|&e| app.world().get::<RigidBody>(e).unwrap().is_dynamic())
            .map(|e| app.world().get::<Transform>(e).unwrap().position)
            .collect();
        assert_eq!(drops.len(), app.config().physics.cubes);
        for (i, a) in drops.iter().enumerate() {
            for b in &drops[i + 1..] {
                let gap = Vec3::new(a.x - b.x, 0.0, a.z - b.z).length();
                assert!(gap > 1.5, "drops {a} and {b} overlap");
            }
        }
    }

    #[test]
    fn camera_follows_player() {
        let app = App::new(small_config());
        let camera = app.camera();
        let expected = Vec3::new(0.0, 5.0, 0.0) + Vec3::Z * CAMERA_BACK + Vec3::Y * CAMERA_UP;
        assert!((camera.eye - expected).length() < 1e-5);
        assert_eq!(camera.target, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn escape_requests_quit() {
        let mut app = App::new(small_config());
        let mut renderer = Recorder::default();
        assert!(!app.quit_requested());
        tap(&mut app, &mut renderer, KeyCode::Escape);
        assert!(app.quit_requested());
    }
}
