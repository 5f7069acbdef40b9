//! # Query: Finding Entities by Component Mask
//!
//! A query answers one question: which live entities carry *at least* these
//! components? Each entity's presence mask is compared against the required
//! mask with a single AND:
//!
//! ```text
//! required:  0b0011          (Transform, Velocity)
//! entity #1: 0b0111   ✓      (Transform, Velocity, Renderable)
//! entity #2: 0b0101   ✗      (Transform, Renderable)
//! entity #3: 0b0011   ✓
//! ```
//!
//! The result is a snapshot `Vec<Entity>` in creation order. Nothing is
//! cached: every call walks the live set, so a component added or removed a
//! moment ago is already reflected.
//!
//! Returning ids instead of borrowed components lets a system query, then
//! freely call `world.get_mut()` or even `destroy_entity()` while walking the
//! list. Ids that died in the meantime just stop resolving.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: queries iterate archetype tables and yield borrowed
//!   component tuples directly.
//! - **Ours**: a linear mask scan over a few hundred entities. Cheap enough,
//!   and the snapshot sidesteps every aliasing question.

use super::component::ComponentMask;
use super::entity::{Entity, EntityRegistry};

/// Live entities whose mask is a superset of `required`, in creation order.
///
/// An empty `required` mask matches every live entity.
pub(crate) fn entities_matching(registry: &EntityRegistry, required: ComponentMask) -> Vec<Entity> {
    registry
        .iter()
        .filter(|(_, mask)| mask.is_superset_of(required))
        .map(|(entity, _)| entity)
        .collect()
}

/// Number of live entities matching `required`, without allocating.
pub(crate) fn count_matching(registry: &EntityRegistry, required: ComponentMask) -> usize {
    registry
        .iter()
        .filter(|(_, mask)| mask.is_superset_of(required))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::component_type_id;

    struct Pos;
    struct Vel;

    #[test]
    fn superset_match_in_creation_order() {
        let mut registry = EntityRegistry::new();
        let pos = component_type_id::<Pos>();
        let vel = component_type_id::<Vel>();

        let a = registry.create();
        let b = registry.create();
        let c = registry.create();
        registry.set_bit(a, pos);
        registry.set_bit(a, vel);
        registry.set_bit(b, pos);
        registry.set_bit(c, vel);
        registry.set_bit(c, pos);

        let both = ComponentMask::of::<(Pos, Vel)>();
        assert_eq!(entities_matching(&registry, both), vec![a, c]);
        assert_eq!(count_matching(&registry, both), 2);

        let only_pos = ComponentMask::of::<(Pos,)>();
        assert_eq!(entities_matching(&registry, only_pos), vec![a, b, c]);
    }

    #[test]
    fn empty_mask_matches_all_live() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        let b = registry.create();
        registry.destroy(a);
        assert_eq!(entities_matching(&registry, ComponentMask::EMPTY), vec![b]);
    }
}
