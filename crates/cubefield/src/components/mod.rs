//! # Components: Plain Data Attached to Entities
//!
//! Every type here is a data-only struct. Behavior lives in the systems.
//!
//! | Component | Facet | Read by |
//! |---|---|---|
//! | [`Transform`] | spatial | almost everything |
//! | [`Velocity`] | kinematic motion | movement, bounds, player |
//! | [`Renderable`] | visual | render |
//! | [`Collider`] | physical shape | physics |
//! | [`RigidBody`] | physical body | physics, movement, bounds |
//! | [`Input`] | per-entity input view | player |
//! | [`Tag`] | label | player, demo actions |
//! | [`Health`] | hit points | health |

mod body;
mod health;
mod input;
mod renderable;
mod tag;
mod velocity;

pub use crate::math::Transform;
pub use body::{BodyType, Collider, ColliderShape, NativeBodyRef, RigidBody};
pub use health::Health;
pub use input::{Input, KeyState};
pub use renderable::{MeshKind, Renderable};
pub use tag::Tag;
pub use velocity::Velocity;
