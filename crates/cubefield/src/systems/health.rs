use crate::components::Health;
use crate::ecs::{ComponentMask, Entity, System, World};

/// Destroys entities whose [`Health`] has run out.
///
/// Deaths are collected during `update` and carried out in `post_update`,
/// so anything reading health in between still sees the dying entity.
#[derive(Debug, Default)]
pub struct HealthSystem {
    dying: Vec<Entity>,
    destroyed_total: u64,
}

impl HealthSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities destroyed since this system was registered.
    pub fn destroyed_total(&self) -> u64 {
        self.destroyed_total
    }
}

impl System for HealthSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Health,)>()
    }

    fn priority(&self) -> i32 {
        90
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        self.dying.clear();
        for entity in world.entities_matching(self.required_components()) {
            if world.get::<Health>(entity).is_some_and(Health::is_dead) {
                self.dying.push(entity);
            }
        }
    }

    fn post_update(&mut self, world: &mut World, _dt: f32) {
        for entity in self.dying.drain(..) {
            if world.destroy_entity(entity) {
                self.destroyed_total += 1;
                log::debug!("{entity} died");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_entities_are_destroyed() {
        let mut world = World::new();
        let handle = world.add_system(HealthSystem::new());
        let alive = world.create_entity();
        world.add_component(alive, Health::new(10.0));
        let dead = world.create_entity();
        let mut hp = Health::new(10.0);
        hp.take_damage(10.0);
        world.add_component(dead, hp);

        world.update(0.016);
        assert!(world.is_alive(alive));
        assert!(!world.is_alive(dead));
        assert_eq!(world.system(handle).unwrap().destroyed_total(), 1);
    }

    #[test]
    fn damage_over_frames() {
        let mut world = World::new();
        world.add_system(HealthSystem::new());
        let e = world.create_entity();
        world.add_component(e, Health::new(30.0));
        for _ in 0..2 {
            world.get_mut::<Health>(e).unwrap().take_damage(10.0);
            world.update(0.016);
            assert!(world.is_alive(e));
        }
        world.get_mut::<Health>(e).unwrap().take_damage(10.0);
        world.update(0.016);
        assert!(!world.is_alive(e));
    }
}
