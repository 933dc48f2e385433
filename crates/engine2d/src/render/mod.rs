//! Render collaborator
//!
//! The scene core never talks to a graphics API. Components describe what
//! they draw as [`DrawCall`]s and hand them to a [`RenderBackend`] through
//! the [`RenderContext`] the lifecycle driver builds for each render call.

mod camera;
mod draw_queue;
mod sprite_renderer;

pub use camera::Camera2D;
pub use draw_queue::DrawQueue;
pub use sprite_renderer::SpriteRenderer;

use crate::foundation::math::{self, Mat3, Mat4};
use crate::scene::{ComponentId, NodeId, Scene, MAX_RENDER_DEPTH};

/// Map a raw render depth onto `[0, 1]`
#[must_use]
pub fn normalize_depth(raw: f32) -> f32 {
    (raw / MAX_RENDER_DEPTH).clamp(0.0, 1.0)
}

/// RGBA color with components in `[0, 1]`
pub type Color = [f32; 4];

/// One draw submission
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Model matrix (local to world)
    pub model: Mat4,
    /// View matrix (inverse camera transform)
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
    /// Normalised depth in `[0, 1]`
    pub depth: f32,
    /// Sprite or texture key
    pub sprite: String,
    /// Tint
    pub color: Color,
}

/// Capability contract of the graphics collaborator
pub trait RenderBackend {
    /// Current viewport width divided by height
    fn aspect_ratio(&self) -> f32;

    /// Called once per frame before the first submission
    fn begin_frame(&mut self) {}

    /// Accept one draw
    fn submit(&mut self, draw: DrawCall);
}

/// Context handed to [`Component::render`](crate::scene::Component::render)
pub struct RenderContext<'a> {
    /// Read-only scene access for world matrices and lookups
    pub scene: &'a Scene,
    backend: &'a mut dyn RenderBackend,
    component: ComponentId,
    owner: Option<NodeId>,
    view: Mat3,
    projection: Mat3,
    submitted: usize,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        scene: &'a Scene,
        backend: &'a mut dyn RenderBackend,
        component: ComponentId,
        owner: Option<NodeId>,
        view: Mat3,
        projection: Mat3,
    ) -> Self {
        Self {
            scene,
            backend,
            component,
            owner,
            view,
            projection,
            submitted: 0,
        }
    }

    /// Slot of the rendering component
    #[must_use]
    pub const fn component(&self) -> ComponentId {
        self.component
    }

    /// Node the component is attached to
    #[must_use]
    pub const fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Camera view matrix
    #[must_use]
    pub const fn view(&self) -> &Mat3 {
        &self.view
    }

    /// Camera projection matrix
    #[must_use]
    pub const fn projection(&self) -> &Mat3 {
        &self.projection
    }

    /// Submit a sprite draw with the frame's camera matrices
    ///
    /// `depth` is the raw render depth; it is normalised here.
    pub fn draw(&mut self, sprite: impl Into<String>, model: &Mat3, depth: f32, color: Color) {
        let draw = DrawCall {
            model: math::to_mat4(model),
            view: math::to_mat4(&self.view),
            projection: math::to_mat4(&self.projection),
            depth: normalize_depth(depth),
            sprite: sprite.into(),
            color,
        };
        self.submit(draw);
    }

    /// Submit a prepared draw
    pub fn submit(&mut self, draw: DrawCall) {
        self.submitted += 1;
        self.backend.submit(draw);
    }

    /// Number of draws submitted through this context
    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }
}
