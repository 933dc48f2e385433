//! World-space queries and transform/body synchronisation
//!
//! World matrices are composed on the fly from the cached local matrices up
//! the parent chain. World rotation is the plain sum of local rotations,
//! not a decomposition of the world matrix.
//!
//! Synchronisation with physics is one-way per call site: the setters here
//! push into the attached body when they change something, and the physics
//! phase pulls body state back through [`Scene::sync_from_body`] without
//! pushing.

use super::{NodeId, Scene};
use crate::foundation::math::{self, Mat3, Vec2};

impl Scene {
    // ========================================================================
    // Queries
    // ========================================================================

    /// Local space to world space
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat3> {
        let node = self.nodes.get(id)?;
        let mut matrix = node.local_matrix();
        let mut current = node.parent;
        while let Some(parent) = current.and_then(|p| self.nodes.get(p)) {
            matrix = parent.local_matrix() * matrix;
            current = parent.parent;
        }
        Some(matrix)
    }

    /// World space to local space
    #[must_use]
    pub fn inverse_world_matrix(&self, id: NodeId) -> Option<Mat3> {
        let node = self.nodes.get(id)?;
        let mut matrix = node.inverse_local_matrix();
        let mut current = node.parent;
        while let Some(parent) = current.and_then(|p| self.nodes.get(p)) {
            matrix *= parent.inverse_local_matrix();
            current = parent.parent;
        }
        Some(matrix)
    }

    /// World position of the node's origin
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Option<Vec2> {
        self.local_point_to_world_point(id, Vec2::zeros())
    }

    /// Sum of local rotations (degrees) from the node up to its root
    #[must_use]
    pub fn world_rotation(&self, id: NodeId) -> Option<f32> {
        let mut node = self.nodes.get(id)?;
        let mut rotation = node.local_rotation();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            rotation += parent.local_rotation();
            node = parent;
        }
        Some(rotation)
    }

    /// Component-wise product of local scales from the node up to its root
    #[must_use]
    pub fn world_scale(&self, id: NodeId) -> Option<Vec2> {
        let mut node = self.nodes.get(id)?;
        let mut scale = node.local_scale();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            scale.component_mul_assign(&parent.local_scale());
            node = parent;
        }
        Some(scale)
    }

    /// Convert a point in the node's space into world space
    #[must_use]
    pub fn local_point_to_world_point(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
        Some(math::transform_point(&self.world_matrix(id)?, point))
    }

    /// Convert a world point into the node's space
    #[must_use]
    pub fn world_point_to_local_point(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
        Some(math::transform_point(&self.inverse_world_matrix(id)?, point))
    }

    /// Rotate a direction from the node's space into world space (scale ignored)
    #[must_use]
    pub fn local_vector_to_world_vector(&self, id: NodeId, vector: Vec2) -> Option<Vec2> {
        let mut node = self.nodes.get(id)?;
        let mut matrix = node.local_matrix_no_scale();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            matrix = parent.local_matrix_no_scale() * matrix;
            node = parent;
        }
        Some(math::transform_vector(&matrix, vector))
    }

    /// Rotate a world direction into the node's space (scale ignored)
    #[must_use]
    pub fn world_vector_to_local_vector(&self, id: NodeId, vector: Vec2) -> Option<Vec2> {
        let mut node = self.nodes.get(id)?;
        let mut matrix = node.inverse_local_matrix_no_scale();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            matrix *= parent.inverse_local_matrix_no_scale();
            node = parent;
        }
        Some(math::transform_vector(&matrix, vector))
    }

    /// A world point expressed in the space `id`'s local position lives in
    fn world_point_to_parent_space(&self, id: NodeId, point: Vec2) -> Option<Vec2> {
        match self.nodes.get(id)?.parent {
            Some(parent) => self.world_point_to_local_point(parent, point),
            None => Some(point),
        }
    }

    fn parent_world_rotation(&self, id: NodeId) -> Option<f32> {
        match self.nodes.get(id)?.parent {
            Some(parent) => self.world_rotation(parent),
            None => Some(0.0),
        }
    }

    // ========================================================================
    // Mutators that push into the attached body
    // ========================================================================

    /// Move the node so its origin lands on a world point
    ///
    /// The local position is only written when it differs from the current
    /// one. On change, an attached body is teleported to the new world
    /// position exactly once. Returns whether anything changed.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec2) -> bool {
        if !self.require_node(id, "set_world_position") {
            return false;
        }
        let Some(local) = self.world_point_to_parent_space(id, position) else {
            return false;
        };
        if !self.nodes[id].set_local_position(local) {
            return false;
        }
        if let Some(rotation) = self.world_rotation(id) {
            self.push_to_body(id, position, rotation);
        }
        true
    }

    /// Rotate the node so its summed world rotation equals `degrees`
    pub fn set_world_rotation(&mut self, id: NodeId, degrees: f32) -> bool {
        if !self.require_node(id, "set_world_rotation") {
            return false;
        }
        let Some(parent_rotation) = self.parent_world_rotation(id) else {
            return false;
        };
        if !self.nodes[id].set_local_rotation(degrees - parent_rotation) {
            return false;
        }
        if let Some(position) = self.world_position(id) {
            self.push_to_body(id, position, degrees);
        }
        true
    }

    /// Set the local position, pushing into an attached body on change
    pub fn set_local_position(&mut self, id: NodeId, position: Vec2) -> bool {
        if !self.require_node(id, "set_local_position") {
            return false;
        }
        let changed = self
            .nodes
            .get_mut(id)
            .is_some_and(|node| node.set_local_position(position));
        if changed {
            self.push_current_transform(id);
        }
        changed
    }

    /// Set the local rotation in degrees, pushing into an attached body on change
    pub fn set_local_rotation(&mut self, id: NodeId, degrees: f32) -> bool {
        if !self.require_node(id, "set_local_rotation") {
            return false;
        }
        let changed = self
            .nodes
            .get_mut(id)
            .is_some_and(|node| node.set_local_rotation(degrees));
        if changed {
            self.push_current_transform(id);
        }
        changed
    }

    /// Set the local scale. Bodies carry no scale, so nothing is pushed.
    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec2) -> bool {
        if !self.require_node(id, "set_local_scale") {
            return false;
        }
        self.nodes
            .get_mut(id)
            .is_some_and(|node| node.set_local_scale(scale))
    }

    /// Rotate the node so its local +X axis points at a world point
    ///
    /// Returns `false` if the target coincides with the node's position.
    pub fn look_at(&mut self, id: NodeId, target: Vec2) -> bool {
        if !self.require_node(id, "look_at") {
            return false;
        }
        let Some(position) = self.world_position(id) else {
            return false;
        };
        let direction = target - position;
        if direction.norm_squared() == 0.0 {
            return false;
        }
        self.set_world_rotation(id, math::direction_angle_degrees(direction))
    }

    fn require_node(&self, id: NodeId, operation: &str) -> bool {
        let live = self.nodes.contains_key(id);
        if !live {
            log::error!("{} called on missing node {:?}", operation, id);
        }
        live
    }

    fn push_current_transform(&mut self, id: NodeId) {
        if let (Some(position), Some(rotation)) = (self.world_position(id), self.world_rotation(id)) {
            self.push_to_body(id, position, rotation);
        }
    }

    fn push_to_body(&mut self, id: NodeId, position: Vec2, degrees: f32) {
        let Some(handle) = self.nodes.get(id).and_then(|node| node.attached_body_handle()) else {
            return;
        };
        if let Err(err) = self
            .physics
            .set_body_transform(handle, position, math::deg_to_rad(degrees))
        {
            log::error!("Failed to push transform of node {:?} into its body: {}", id, err);
        }
    }

    // ========================================================================
    // Pull
    // ========================================================================

    /// Copy the attached body's world position and rotation into the node
    ///
    /// Uses the plain node setters, so nothing is pushed back. Returns
    /// whether the node has a body the physics world knows about.
    pub(crate) fn sync_from_body(&mut self, id: NodeId) -> bool {
        let Some(handle) = self.nodes.get(id).and_then(|node| node.attached_body_handle()) else {
            return false;
        };
        let (Some(position), Some(rotation)) =
            (self.physics.body_position(handle), self.physics.body_rotation(handle))
        else {
            log::error!("Body of node {:?} is unknown to the physics world", id);
            return false;
        };

        let (Some(local_position), Some(parent_rotation)) = (
            self.world_point_to_parent_space(id, position),
            self.parent_world_rotation(id),
        ) else {
            return false;
        };
        let node = &mut self.nodes[id];
        node.set_local_position(local_position);
        node.set_local_rotation(math::rad_to_deg(rotation) - parent_rotation);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_child_follows_rotated_parent() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        scene.set_local_position(b, Vec2::new(1.0, 0.0));

        assert_relative_eq!(scene.world_position(b).unwrap(), Vec2::new(1.0, 0.0), epsilon = 1e-4);

        scene.set_local_rotation(a, 90.0);
        assert_relative_eq!(scene.world_position(b).unwrap(), Vec2::new(0.0, 1.0), epsilon = 1e-4);
        assert_relative_eq!(scene.world_rotation(b).unwrap(), 90.0);
    }

    #[test]
    fn test_world_rotation_is_summed() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        let c = scene.create_child(b, "c");
        scene.set_local_rotation(a, 30.0);
        scene.set_local_rotation(b, 45.0);
        scene.set_local_rotation(c, -10.0);

        assert_relative_eq!(scene.world_rotation(c).unwrap(), 65.0);
    }

    #[test]
    fn test_world_scale_multiplies() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        scene.set_local_scale(a, Vec2::new(2.0, 3.0));
        scene.set_local_scale(b, Vec2::new(0.5, 2.0));

        assert_relative_eq!(scene.world_scale(b).unwrap(), Vec2::new(1.0, 6.0));
    }

    #[test]
    fn test_vectors_ignore_translation_and_scale() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        scene.set_local_position(a, Vec2::new(5.0, 5.0));
        scene.set_local_rotation(a, 90.0);
        scene.set_local_scale(a, Vec2::new(4.0, 4.0));

        let world = scene.local_vector_to_world_vector(a, Vec2::new(1.0, 0.0)).unwrap();
        assert_relative_eq!(world, Vec2::new(0.0, 1.0), epsilon = 1e-4);
        let back = scene.world_vector_to_local_vector(a, world).unwrap();
        assert_relative_eq!(back, Vec2::new(1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn test_zero_scale_stays_finite() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        scene.set_local_scale(a, Vec2::new(0.0, 1.0));

        let local = scene.world_point_to_local_point(b, Vec2::new(3.0, 4.0)).unwrap();
        assert!(local.x.is_finite() && local.y.is_finite());
    }

    #[test]
    fn test_set_world_position_under_parent() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        scene.set_local_position(a, Vec2::new(10.0, 0.0));
        scene.set_local_rotation(a, 90.0);

        assert!(scene.set_world_position(b, Vec2::new(10.0, 2.0)));
        assert_relative_eq!(scene.node(b).unwrap().local_position(), Vec2::new(2.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(scene.world_position(b).unwrap(), Vec2::new(10.0, 2.0), epsilon = 1e-4);
    }

    #[test]
    fn test_set_world_rotation_and_look_at() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        scene.set_local_rotation(a, 30.0);

        assert!(scene.set_world_rotation(b, 90.0));
        assert_relative_eq!(scene.node(b).unwrap().local_rotation(), 60.0);
        assert!(!scene.set_world_rotation(b, 90.0));

        assert!(scene.look_at(b, Vec2::new(-1.0, 0.0)));
        assert_relative_eq!(scene.world_rotation(b).unwrap(), 180.0, epsilon = 1e-4);
        assert!(!scene.look_at(b, Vec2::zeros()));
    }

    #[test]
    fn test_missing_node_queries() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        scene.destroy_node(a);

        assert!(scene.world_matrix(a).is_none());
        assert!(scene.world_position(a).is_none());
        assert!(!scene.set_world_position(a, Vec2::zeros()));
        assert!(!scene.set_world_rotation(a, 45.0));
        assert!(!scene.set_local_position(a, Vec2::new(1.0, 1.0)));
        assert!(!scene.set_local_rotation(a, 1.0));
        assert!(!scene.set_local_scale(a, Vec2::new(2.0, 2.0)));
        assert!(!scene.look_at(a, Vec2::new(3.0, 0.0)));
        assert!(scene.local_point_to_world_point(a, Vec2::zeros()).is_none());
        assert_eq!(scene.node_count(), 0);
    }
}
