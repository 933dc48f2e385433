//! Engine configuration structures

use super::{Config, ConfigError};
use crate::scene::MAX_RENDER_DEPTH;
use serde::{Deserialize, Serialize};

/// # Physics Configuration
///
/// Parameters handed to the physics collaborator each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Whether the lifecycle driver steps the physics world
    pub enabled: bool,
    /// World gravity in units per second squared
    pub gravity: [f32; 2],
    /// Fixed step in seconds; `None` steps by the frame delta
    pub fixed_timestep: Option<f32>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gravity: [0.0, -9.8],
            fixed_timestep: None,
        }
    }
}

/// # Render Configuration
///
/// Controls render-depth resolution during the depth-first render traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Depth used by a root node whose render depth is the inherit sentinel
    pub root_depth: f32,
    /// Amount subtracted for every successive draw within one root's traversal
    pub depth_step: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            root_depth: MAX_RENDER_DEPTH,
            depth_step: 0.01,
        }
    }
}

/// # Camera Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Visible world height of the default orthographic camera
    pub height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { height: 10.0 }
    }
}

/// # Engine Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
    /// Target FPS for frame pacing; `None` runs unthrottled
    pub target_fps: Option<u32>,
    /// Stop the main loop after this many frames
    pub max_frames: Option<u64>,
    /// Physics stepping parameters
    pub physics: PhysicsConfig,
    /// Render traversal parameters
    pub render: RenderConfig,
    /// Default camera parameters
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            target_fps: None,
            max_frames: None,
            physics: PhysicsConfig::default(),
            render: RenderConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set target FPS
    #[must_use]
    pub const fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Limit the number of frames the main loop runs
    #[must_use]
    pub const fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Set gravity
    #[must_use]
    pub const fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.physics.gravity = [x, y];
        self
    }

    /// Set the fixed physics timestep
    #[must_use]
    pub const fn with_fixed_timestep(mut self, step: f32) -> Self {
        self.physics.fixed_timestep = Some(step);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == Some(0) {
            return Err(ConfigError::Invalid("target_fps must be at least 1".to_string()));
        }
        if let Some(step) = self.physics.fixed_timestep {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "physics.fixed_timestep must be positive, got {step}"
                )));
            }
        }
        if self.physics.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::Invalid("physics.gravity must be finite".to_string()));
        }
        if !(0.0..=MAX_RENDER_DEPTH).contains(&self.render.root_depth) {
            return Err(ConfigError::Invalid(format!(
                "render.root_depth must lie in [0, {MAX_RENDER_DEPTH}], got {}",
                self.render.root_depth
            )));
        }
        if !(self.render.depth_step.is_finite() && self.render.depth_step > 0.0) {
            return Err(ConfigError::Invalid("render.depth_step must be positive".to_string()));
        }
        if !(self.camera.height.is_finite() && self.camera.height > 0.0) {
            return Err(ConfigError::Invalid("camera.height must be positive".to_string()));
        }
        Ok(())
    }
}

impl Config for EngineConfig {}
