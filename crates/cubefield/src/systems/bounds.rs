use crate::components::Velocity;
use crate::ecs::{ComponentMask, System, World};
use crate::math::{Transform, Vec3};

use super::has_active_body;

/// Fraction of speed kept when bouncing off a wall.
const BOUNCE_DAMPING: f32 = 0.8;

/// Keeps entities inside an axis-aligned box.
///
/// Per axis, an entity past a face is either wrapped to the opposite face or
/// clamped onto it with its velocity on that axis reversed and damped.
///
/// ```text
///   min                      max
///    │      ●──►              │        clamp: x = max, v = -0.8·v
///    │                        │ ●──►
///    │                        │        wrap:  x = min
/// ```
///
/// Physics-owned entities are left alone; walls for those are colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsSystem {
    pub min: Vec3,
    pub max: Vec3,
    pub wrap: bool,
}

impl BoundsSystem {
    pub fn new(min: Vec3, max: Vec3, wrap: bool) -> Self {
        Self { min, max, wrap }
    }

    /// Apply the policy to one position, bouncing `velocity` if given.
    /// Returns `true` if anything changed.
    pub fn constrain(&self, position: &mut Vec3, mut velocity: Option<&mut Vec3>) -> bool {
        let mut changed = false;
        for axis in 0..3 {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            let value = position[axis];
            let target = if value < lo {
                if self.wrap { hi } else { lo }
            } else if value > hi {
                if self.wrap { lo } else { hi }
            } else {
                continue;
            };
            position[axis] = target;
            if !self.wrap {
                if let Some(v) = velocity.as_deref_mut() {
                    v[axis] = -v[axis] * BOUNCE_DAMPING;
                }
            }
            changed = true;
        }
        changed
    }
}

impl Default for BoundsSystem {
    fn default() -> Self {
        Self::new(Vec3::new(-50.0, -20.0, -50.0), Vec3::new(50.0, 20.0, 50.0), false)
    }
}

impl System for BoundsSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Transform,)>()
    }

    fn priority(&self) -> i32 {
        10
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        for entity in world.entities_matching(self.required_components()) {
            if has_active_body(world, entity) {
                continue;
            }
            let Some(mut position) = world.get::<Transform>(entity).map(|t| t.position) else {
                continue;
            };
            let mut velocity = world.get::<Velocity>(entity).map(|v| v.linear);
            if !self.constrain(&mut position, velocity.as_mut()) {
                continue;
            }
            if let Some(transform) = world.get_mut::<Transform>(entity) {
                transform.position = position;
            }
            if let (Some(linear), Some(v)) = (velocity, world.get_mut::<Velocity>(entity)) {
                v.linear = linear;
            }
        }
    }
}
