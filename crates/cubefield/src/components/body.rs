//! Physics-facing components.
//!
//! [`RigidBody`] and [`Collider`] describe what the physics engine should
//! build. The engine-side objects themselves live in the `PhysicsBridge`; the
//! component only remembers *which* native body belongs to it through a
//! [`NativeBodyRef`].

use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

use crate::math::Vec3;

/// How the engine treats a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Never moves. Infinite mass.
    Static,
    /// Moved by forces, gravity and contacts.
    #[default]
    Dynamic,
    /// Moved by the game through its `Transform`, pushes dynamic bodies.
    Kinematic,
}

/// Non-owning reference to the native body and collider created for an
/// entity. Plain handles: the bridge owns the objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeBodyRef {
    pub(crate) body: RigidBodyHandle,
    pub(crate) collider: ColliderHandle,
}

impl NativeBodyRef {
    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn collider_handle(&self) -> ColliderHandle {
        self.collider
    }
}

/// Rigid-body parameters plus the last velocities read back from the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidBody {
    pub mass: f32,
    pub body_type: BodyType,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
    /// `None` until the physics bridge instantiates the body.
    pub(crate) native: Option<NativeBodyRef>,
}

impl RigidBody {
    pub fn new(mass: f32, body_type: BodyType) -> Self {
        Self {
            mass,
            body_type,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            friction: 0.5,
            restitution: 0.0,
            native: None,
        }
    }

    pub fn dynamic(mass: f32) -> Self {
        Self::new(mass, BodyType::Dynamic)
    }

    pub fn fixed() -> Self {
        Self::new(0.0, BodyType::Static)
    }

    pub fn kinematic() -> Self {
        Self::new(1.0, BodyType::Kinematic)
    }

    pub fn with_velocity(mut self, linear: Vec3, angular: Vec3) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    /// The native body, if the bridge has created one.
    pub fn native(&self) -> Option<NativeBodyRef> {
        self.native
    }

    pub fn has_native_body(&self) -> bool {
        self.native.is_some()
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::dynamic(1.0)
    }
}

/// Collision geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Axis-aligned box, full edge lengths.
    Box { size: Vec3 },
    Sphere { radius: f32 },
    /// Y-aligned capsule. `height` is the length of the cylindrical middle.
    Capsule { radius: f32, height: f32 },
    /// Infinite plane through the body origin.
    Plane { normal: Vec3 },
}

/// A shape plus its local offset from the body origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    pub offset: Vec3,
}

impl Collider {
    pub fn cuboid(size: Vec3) -> Self {
        Self::from(ColliderShape::Box { size })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::from(ColliderShape::Sphere { radius })
    }

    pub fn capsule(radius: f32, height: f32) -> Self {
        Self::from(ColliderShape::Capsule { radius, height })
    }

    /// Ground plane with the given normal. Defaults to `+Y` when `normal` is
    /// zero.
    pub fn plane(normal: Vec3) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        Self::from(ColliderShape::Plane { normal })
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }
}

impl From<ColliderShape> for Collider {
    fn from(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
        }
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::cuboid(Vec3::ONE)
    }
}
