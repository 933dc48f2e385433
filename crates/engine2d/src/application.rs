//! Application trait and lifecycle hooks

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Trait that applications must implement to run on the engine
///
/// [`Engine::run`] calls [`initialize`](Application::initialize) once, then
/// [`update`](Application::update) before every lifecycle frame, and
/// [`cleanup`](Application::cleanup) once the loop has ended.
pub trait Application {
    /// Build the initial scene
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Per-frame application logic, run before the scene's own dispatch
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Called when the main loop is shutting down
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
