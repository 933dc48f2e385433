//! # engine2d
//!
//! Scene-graph and component-lifecycle core of a 2D game engine.
//!
//! ## Features
//!
//! - **Spatial nodes**: local position/rotation/scale with lazily cached
//!   matrices and parent/child composition
//! - **Components**: type-erased behaviours with optional start, update and
//!   render hooks, looked up by exact concrete type
//! - **Lifecycle driver**: start-once, update-every-frame, physics pull and
//!   depth-ordered render traversal
//! - **Physics sync**: explicit transform pushes into rigid bodies and a
//!   per-frame pull of authoritative body state from a rapier2d world
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine2d::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let node = engine.scene.create_node("player");
//!         engine.scene.attach(node, SpriteRenderer::new("player"));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::headless(EngineConfig::default().with_max_frames(60))?;
//!     engine.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use config::EngineConfig;
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EngineConfig},
        foundation::{
            math::{Mat3, Mat4, Vec2},
            time::{Stopwatch, Timer},
        },
        physics::{BodyDesc, BodyHandle, BodyType, ColliderShape, PhysicsBackend, RapierWorld, RigidBody2D},
        render::{Camera2D, DrawCall, DrawQueue, RenderBackend, RenderContext, SpriteRenderer},
        scene::{Component, ComponentId, FrameContext, LifecycleDriver, NodeId, Scene},
        AppError, Application, Engine, EngineError,
    };
}
