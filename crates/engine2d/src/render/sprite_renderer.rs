//! Sprite renderer component

use super::{Color, RenderContext};
use crate::foundation::math::{self, Vec2};
use crate::scene::Component;

/// Draws one textured quad at the owner's world transform
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRenderer {
    /// Sprite or texture key
    pub sprite: String,
    /// Quad size in the owner's local units
    pub size: Vec2,
    /// Tint
    pub color: Color,
    /// Skip drawing while `false`
    pub visible: bool,
}

impl SpriteRenderer {
    /// White, unit-sized sprite
    #[must_use]
    pub fn new(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            size: Vec2::new(1.0, 1.0),
            color: [1.0; 4],
            visible: true,
        }
    }

    /// Set quad size
    #[must_use]
    pub const fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Set tint
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Component for SpriteRenderer {
    fn render(&mut self, cx: &mut RenderContext<'_>, depth: f32) {
        if !self.visible {
            return;
        }
        let Some(world) = cx.owner().and_then(|owner| cx.scene.world_matrix(owner)) else {
            return;
        };
        let model = world * math::scaling(self.size);
        cx.draw(self.sprite.as_str(), &model, depth, self.color);
    }
}
