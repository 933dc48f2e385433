//! Deterministic physics double for tests
//!
//! Integrates bodies with semi-implicit Euler and ignores colliders, so scene
//! tests can assert exact positions after a step.

use super::{BodyDesc, BodyHandle, BodyType, PhysicsBackend, PhysicsError};
use crate::foundation::math::Vec2;
use slotmap::SlotMap;

#[derive(Debug, Clone)]
struct Body {
    position: Vec2,
    rotation: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    gravity_scale: f32,
    body_type: BodyType,
}

impl From<BodyDesc> for Body {
    fn from(desc: BodyDesc) -> Self {
        Self {
            position: desc.position,
            rotation: desc.rotation,
            linear_velocity: desc.linear_velocity,
            angular_velocity: desc.angular_velocity,
            gravity_scale: desc.gravity_scale,
            body_type: desc.body_type,
        }
    }
}

/// Euler-only physics world
#[derive(Debug)]
pub(crate) struct SimpleWorld {
    bodies: SlotMap<BodyHandle, Body>,
    gravity: Vec2,
    locked: bool,
    steps: u64,
}

impl SimpleWorld {
    /// Create an empty world with the given gravity
    #[must_use]
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            gravity,
            locked: false,
            steps: 0,
        }
    }

    /// Number of completed steps
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.steps
    }

    /// Simulation mode of a body
    #[must_use]
    pub fn body_type(&self, handle: BodyHandle) -> Option<BodyType> {
        self.bodies.get(handle).map(|body| body.body_type)
    }
}

impl Default for SimpleWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.8))
    }
}

impl PhysicsBackend for SimpleWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.bodies.insert(Body::from(desc))
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        if self.locked {
            return Err(PhysicsError::WorldLocked);
        }
        self.bodies
            .remove(handle)
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|body| body.position)
    }

    fn body_rotation(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(handle).map(|body| body.rotation)
    }

    fn set_body_transform(
        &mut self,
        handle: BodyHandle,
        position: Vec2,
        rotation: f32,
    ) -> Result<(), PhysicsError> {
        if self.locked {
            return Err(PhysicsError::WorldLocked);
        }
        let body = self.bodies.get_mut(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        body.position = position;
        body.rotation = rotation;
        Ok(())
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|body| body.linear_velocity)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self.bodies.get_mut(handle).ok_or(PhysicsError::UnknownBody(handle))?;
        body.linear_velocity = velocity;
        Ok(())
    }

    fn step(&mut self, delta_time: f32) {
        self.locked = true;
        let gravity = self.gravity;
        for body in self.bodies.values_mut() {
            match body.body_type {
                BodyType::Static => {}
                BodyType::Kinematic => {
                    body.position += body.linear_velocity * delta_time;
                    body.rotation += body.angular_velocity * delta_time;
                }
                BodyType::Dynamic => {
                    body.linear_velocity += gravity * body.gravity_scale * delta_time;
                    body.position += body.linear_velocity * delta_time;
                    body.rotation += body.angular_velocity * delta_time;
                }
            }
        }
        self.steps += 1;
        self.locked = false;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dynamic_body_falls() {
        let mut world = SimpleWorld::new(Vec2::new(0.0, -10.0));
        let mut desc = BodyDesc::new(BodyType::Dynamic);
        desc.position = Vec2::new(0.0, 10.0);
        let body = world.create_body(desc);

        world.step(0.5);
        // v = -5, y = 10 - 2.5
        assert_relative_eq!(world.body_position(body).unwrap().y, 7.5);
        assert_relative_eq!(world.linear_velocity(body).unwrap().y, -5.0);
        assert_eq!(world.step_count(), 1);
    }

    #[test]
    fn test_static_and_kinematic_bodies() {
        let mut world = SimpleWorld::new(Vec2::new(0.0, -10.0));
        let ground = world.create_body(BodyDesc::new(BodyType::Static));
        let platform = world.create_body(
            BodyDesc::new(BodyType::Kinematic)
                .with_linear_velocity(Vec2::new(2.0, 0.0))
                .with_angular_velocity(1.0),
        );

        world.step(1.0);
        assert_eq!(world.body_position(ground), Some(Vec2::zeros()));
        assert_eq!(world.body_position(platform), Some(Vec2::new(2.0, 0.0)));
        assert_relative_eq!(world.body_rotation(platform).unwrap(), 1.0);
    }

    #[test]
    fn test_destroy_and_unknown_body() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(BodyDesc::new(BodyType::Dynamic));
        assert_eq!(world.body_count(), 1);

        assert_eq!(world.destroy_body(body), Ok(()));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.destroy_body(body), Err(PhysicsError::UnknownBody(body)));
        assert!(world.set_body_transform(body, Vec2::zeros(), 0.0).is_err());
        assert!(world.body_position(body).is_none());
    }

    #[test]
    fn test_world_unlocked_after_step() {
        let mut world = SimpleWorld::default();
        world.step(0.1);
        assert!(!world.is_locked());
    }

    #[test]
    fn test_set_transform_teleports() {
        let mut world = SimpleWorld::default();
        let body = world.create_body(BodyDesc::new(BodyType::Dynamic));
        world.set_body_transform(body, Vec2::new(3.0, 4.0), 0.5).unwrap();
        assert_eq!(world.body_position(body), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(world.body_rotation(body), Some(0.5));
        assert_eq!(world.body_type(body), Some(BodyType::Dynamic));
    }
}
