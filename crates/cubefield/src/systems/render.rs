use crate::components::Renderable;
use crate::ecs::{ComponentMask, Entity, System, World};
use crate::math::Transform;
use crate::render::InstanceData;

/// Flattens every visible [`Renderable`] into [`InstanceData`].
///
/// The cache is rebuilt each frame and keeps its allocation, so a renderer
/// can borrow [`instances`](Self::instances) between frames without copying.
#[derive(Debug, Default)]
pub struct RenderSystem {
    instances: Vec<InstanceData>,
    entities: Vec<Entity>,
}

impl RenderSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// This frame's instances, in entity creation order.
    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    /// The entity behind each instance, index for index.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn visible_count(&self) -> usize {
        self.instances.len()
    }
}

impl System for RenderSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Transform, Renderable)>()
    }

    fn priority(&self) -> i32 {
        100
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        self.instances.clear();
        self.entities.clear();
        for entity in world.entities_matching(self.required_components()) {
            let (Some(transform), Some(renderable)) =
                (world.get::<Transform>(entity), world.get::<Renderable>(entity))
            else {
                continue;
            };
            if !renderable.visible {
                continue;
            }
            self.instances
                .push(InstanceData::new(transform.matrix(), renderable.rgba()));
            self.entities.push(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn collects_visible_only() {
        let mut world = World::new();
        let handle = world.add_system(RenderSystem::new());
        let shown = world.create_entity();
        world.add_component(shown, Transform::from_xyz(1.0, 2.0, 3.0));
        world.add_component(shown, Renderable::cube(Vec3::new(1.0, 0.0, 0.0)));
        let hidden = world.create_entity();
        world.add_component(hidden, Transform::default());
        world.add_component(hidden, Renderable::default().hidden());
        let bare = world.create_entity();
        world.add_component(bare, Transform::default());

        world.update(0.016);
        let render = world.system(handle).unwrap();
        assert_eq!(render.visible_count(), 1);
        assert_eq!(render.entities(), &[shown]);
        assert_eq!(render.instances()[0].translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(render.instances()[0].color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn cache_tracks_destruction() {
        let mut world = World::new();
        let handle = world.add_system(RenderSystem::new());
        let e = world.create_entity();
        world.add_component(e, Transform::default());
        world.add_component(e, Renderable::default());
        world.update(0.016);
        assert_eq!(world.system(handle).unwrap().visible_count(), 1);

        world.destroy_entity(e);
        world.update(0.016);
        assert_eq!(world.system(handle).unwrap().visible_count(), 0);
    }
}
