//! Physics collaborator interface
//!
//! The scene never integrates bodies itself. It talks to a physics world
//! through [`PhysicsBackend`]: creating and destroying bodies, reading their
//! authoritative position and rotation each frame, and pushing explicit
//! transform changes back. [`RapierWorld`] is the bundled backend, built on
//! rapier2d.

pub mod rapier_world;
pub mod rigid_body;
#[cfg(test)]
pub(crate) mod simple_world;

pub use rapier_world::RapierWorld;
pub use rigid_body::RigidBody2D;
#[cfg(test)]
pub(crate) use simple_world::SimpleWorld;

use crate::foundation::math::Vec2;
use thiserror::Error;

slotmap::new_key_type! {
    /// Stable handle to a body owned by a physics backend
    pub struct BodyHandle;
}

/// How a body participates in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    /// Never moves; infinite mass
    Static,
    /// Moved by its velocity only; unaffected by gravity
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Collision shape attached to a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle around the body origin
    Ball {
        /// Circle radius
        radius: f32,
    },
    /// Axis-aligned box in body space
    Cuboid {
        /// Half width and half height
        half_extents: Vec2,
    },
}

/// Parameters for creating a body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    /// Initial world position
    pub position: Vec2,
    /// Initial world rotation in radians
    pub rotation: f32,
    /// Simulation mode
    pub body_type: BodyType,
    /// Initial linear velocity
    pub linear_velocity: Vec2,
    /// Initial angular velocity in radians per second
    pub angular_velocity: f32,
    /// Multiplier applied to world gravity
    pub gravity_scale: f32,
    /// Optional collision shape; bodies without one never collide
    pub collider: Option<ColliderShape>,
}

impl BodyDesc {
    /// Create a description for a body of the given type at the origin
    #[must_use]
    pub fn new(body_type: BodyType) -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            body_type,
            linear_velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            gravity_scale: 1.0,
            collider: None,
        }
    }

    /// Set the initial linear velocity
    #[must_use]
    pub const fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the initial angular velocity (radians per second)
    #[must_use]
    pub const fn with_angular_velocity(mut self, velocity: f32) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Set the gravity multiplier
    #[must_use]
    pub const fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Give the body a collision shape
    #[must_use]
    pub const fn with_collider(mut self, shape: ColliderShape) -> Self {
        self.collider = Some(shape);
        self
    }
}

/// Errors reported by a physics backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    /// The world is in the middle of a step and cannot be mutated
    #[error("physics world is locked (mid-step)")]
    WorldLocked,

    /// The handle does not refer to a live body
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
}

/// Capability contract of the physics collaborator
pub trait PhysicsBackend {
    /// Create a body and return its handle
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Destroy a body. Fails with [`PhysicsError::WorldLocked`] while the
    /// world is stepping; the body is left untouched in that case.
    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Authoritative world position of a body
    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Authoritative world rotation of a body in radians
    fn body_rotation(&self, handle: BodyHandle) -> Option<f32>;

    /// Teleport a body to a world position and rotation (radians)
    fn set_body_transform(
        &mut self,
        handle: BodyHandle,
        position: Vec2,
        rotation: f32,
    ) -> Result<(), PhysicsError>;

    /// Linear velocity of a body
    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Set the linear velocity of a body
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;

    /// Advance the simulation
    fn step(&mut self, delta_time: f32);

    /// Whether the world is currently locked by a step
    fn is_locked(&self) -> bool;

    /// Number of live bodies
    fn body_count(&self) -> usize;

    /// Change world gravity
    fn set_gravity(&mut self, gravity: Vec2);
}
