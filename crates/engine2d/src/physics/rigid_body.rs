//! Rigid body component

use super::{BodyDesc, BodyHandle, BodyType, PhysicsBackend, PhysicsError};
use crate::foundation::math::{self, Vec2};
use crate::scene::{Component, ComponentId, NodeId, Scene};

/// Component binding a node to a body in the physics world
///
/// The body is authoritative: the physics phase copies its position and
/// rotation into the node every frame. Moving the node through the scene
/// setters teleports the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RigidBody2D {
    handle: BodyHandle,
    body_type: BodyType,
}

impl RigidBody2D {
    /// Wrap an existing body
    #[must_use]
    pub const fn from_handle(handle: BodyHandle, body_type: BodyType) -> Self {
        Self { handle, body_type }
    }

    /// Create a body at `node`'s world position and rotation and attach it
    ///
    /// The position and rotation in `desc` are replaced by the node's.
    /// Returns `None` (creating no body) if the node does not exist.
    pub fn attach_to(scene: &mut Scene, node: NodeId, mut desc: BodyDesc) -> Option<ComponentId> {
        let (Some(position), Some(rotation)) = (scene.world_position(node), scene.world_rotation(node)) else {
            log::error!("Cannot create a rigid body for missing node {:?}", node);
            return None;
        };
        desc.position = position;
        desc.rotation = math::deg_to_rad(rotation);

        let body_type = desc.body_type;
        let handle = scene.physics_mut().create_body(desc);
        scene.attach(node, Self::from_handle(handle, body_type))
    }

    /// Handle of the body in the physics world
    #[must_use]
    pub const fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Simulation mode the body was created with
    #[must_use]
    pub const fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Current linear velocity
    #[must_use]
    pub fn velocity(&self, physics: &dyn PhysicsBackend) -> Option<Vec2> {
        physics.linear_velocity(self.handle)
    }

    /// Replace the linear velocity
    ///
    /// # Errors
    /// Forwards the backend's error for a locked world or a dead body.
    pub fn set_velocity(&self, physics: &mut dyn PhysicsBackend, velocity: Vec2) -> Result<(), PhysicsError> {
        physics.set_linear_velocity(self.handle, velocity)
    }
}

impl Component for RigidBody2D {
    fn rigid_body(&self) -> Option<BodyHandle> {
        Some(self.handle)
    }

    fn on_detach(&mut self, physics: &mut dyn PhysicsBackend) {
        if let Err(err) = physics.destroy_body(self.handle) {
            log::error!("Failed to destroy body {:?}: {}", self.handle, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_body_created_at_world_pose() {
        let mut scene = Scene::default();
        let parent = scene.create_node("parent");
        let child = scene.create_child(parent, "child");
        scene.set_local_position(parent, Vec2::new(2.0, 0.0));
        scene.set_local_rotation(parent, 90.0);
        scene.set_local_position(child, Vec2::new(1.0, 0.0));

        let id = RigidBody2D::attach_to(&mut scene, child, BodyDesc::new(BodyType::Dynamic)).unwrap();
        let handle = scene.component::<RigidBody2D>(id).unwrap().handle();

        let position = scene.physics().body_position(handle).unwrap();
        assert_relative_eq!(position, Vec2::new(2.0, 1.0), epsilon = 1e-4);
        assert_relative_eq!(
            scene.physics().body_rotation(handle).unwrap(),
            std::f32::consts::FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_velocity_helpers() {
        let mut scene = Scene::default();
        let node = scene.create_node("n");
        let desc = BodyDesc::new(BodyType::Kinematic).with_linear_velocity(Vec2::new(1.0, 0.0));
        let id = RigidBody2D::attach_to(&mut scene, node, desc).unwrap();
        let body = scene.component::<RigidBody2D>(id).unwrap().clone();

        assert_eq!(body.body_type(), BodyType::Kinematic);
        assert_eq!(body.velocity(scene.physics()), Some(Vec2::new(1.0, 0.0)));
        body.set_velocity(scene.physics_mut(), Vec2::new(0.0, 3.0)).unwrap();
        assert_eq!(body.velocity(scene.physics()), Some(Vec2::new(0.0, 3.0)));
    }

    #[test]
    fn test_missing_node_creates_no_body() {
        let mut scene = Scene::default();
        let node = scene.create_node("n");
        scene.destroy_node(node);

        assert!(RigidBody2D::attach_to(&mut scene, node, BodyDesc::new(BodyType::Static)).is_none());
        assert_eq!(scene.physics().body_count(), 0);
    }
}
