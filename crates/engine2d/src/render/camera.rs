//! Orthographic 2D camera

use crate::foundation::math::{self, Mat3, Vec2};
use crate::scene::{NodeId, Scene};

/// Orthographic camera, optionally following a scene node
///
/// Without a node the camera sits at the world origin. With a node, the
/// view is the node's inverse world matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    node: Option<NodeId>,
    height: f32,
}

impl Camera2D {
    /// Camera at the origin showing `height` world units vertically
    #[must_use]
    pub const fn new(height: f32) -> Self {
        Self { node: None, height }
    }

    /// Camera following `node`
    #[must_use]
    pub const fn attached(node: NodeId, height: f32) -> Self {
        Self {
            node: Some(node),
            height,
        }
    }

    /// Node the camera follows
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Visible world height
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Change the visible world height
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    /// Projection mapping the visible rectangle onto `[-1, 1]²`
    ///
    /// Visible width is `height * aspect_ratio`.
    #[must_use]
    pub fn projection(&self, aspect_ratio: f32) -> Mat3 {
        let width = self.height * aspect_ratio;
        if width == 0.0 || self.height == 0.0 {
            log::warn!("Degenerate camera size {}x{}", width, self.height);
            return Mat3::identity();
        }
        math::scaling(Vec2::new(2.0 / width, 2.0 / self.height))
    }

    /// View matrix; `None` if the followed node no longer exists
    #[must_use]
    pub fn view(&self, scene: &Scene) -> Option<Mat3> {
        match self.node {
            Some(node) => scene.inverse_world_matrix(node),
            None => Some(Mat3::identity()),
        }
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new(10.0)
    }
}
