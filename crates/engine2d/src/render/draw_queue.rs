//! In-memory render backend

use super::{DrawCall, RenderBackend};

/// Render backend that records every submission
///
/// Used headless and in tests. Submissions accumulate until [`clear`] or,
/// with [`clear_each_frame`], until the next frame begins.
///
/// [`clear`]: DrawQueue::clear
/// [`clear_each_frame`]: DrawQueue::clear_each_frame
#[derive(Debug, Clone)]
pub struct DrawQueue {
    draws: Vec<DrawCall>,
    aspect_ratio: f32,
    clear_each_frame: bool,
    frames: u64,
}

impl DrawQueue {
    /// Create a queue reporting the given viewport aspect ratio
    #[must_use]
    pub const fn new(aspect_ratio: f32) -> Self {
        Self {
            draws: Vec::new(),
            aspect_ratio,
            clear_each_frame: false,
            frames: 0,
        }
    }

    /// Drop the previous frame's draws when a new frame begins
    #[must_use]
    pub const fn clear_each_frame(mut self) -> Self {
        self.clear_each_frame = true;
        self
    }

    /// Recorded draws in submission order
    #[must_use]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Number of recorded draws
    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Forget all recorded draws
    pub fn clear(&mut self) {
        self.draws.clear();
    }

    /// Number of frames that reached the render phase
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Change the reported aspect ratio (viewport resize)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

impl Default for DrawQueue {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RenderBackend for DrawQueue {
    fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    fn begin_frame(&mut self) {
        self.frames += 1;
        if self.clear_each_frame {
            self.draws.clear();
        }
    }

    fn submit(&mut self, draw: DrawCall) {
        log::trace!("Draw '{}' at depth {}", draw.sprite, draw.depth);
        self.draws.push(draw);
    }
}
