//! Core engine implementation

use crate::{
    application::Application,
    config::{ConfigError, EngineConfig},
    foundation::{
        math::Vec2,
        time::{Stopwatch, Timer},
    },
    physics::{PhysicsBackend, RapierWorld},
    render::{Camera2D, DrawQueue, RenderBackend},
    scene::{FrameStats, LifecycleDriver, Scene},
};
use thiserror::Error;

/// Main engine struct
///
/// Owns the scene, the lifecycle driver and the render collaborator, and runs
/// the blocking frame loop. Everything happens on the calling thread.
pub struct Engine {
    /// Scene with every node, component and script
    pub scene: Scene,

    driver: LifecycleDriver,
    renderer: Box<dyn RenderBackend>,
    timer: Timer,
    config: EngineConfig,
    running: bool,
}

impl Engine {
    /// Create an engine around the given collaborators
    ///
    /// The physics world receives the configured gravity, and the scene gets
    /// an origin camera of the configured height as its active camera.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the configuration does not validate.
    pub fn new(
        config: EngineConfig,
        mut physics: Box<dyn PhysicsBackend>,
        renderer: Box<dyn RenderBackend>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine...");
        config.validate()?;

        let [gx, gy] = config.physics.gravity;
        physics.set_gravity(Vec2::new(gx, gy));

        let mut scene = Scene::new(physics);
        scene.set_active_camera(Some(Camera2D::new(config.camera.height)));

        Ok(Self {
            scene,
            driver: LifecycleDriver::from_config(&config),
            renderer,
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Engine with a rapier2d physics world and an in-memory draw queue
    ///
    /// # Errors
    /// See [`Engine::new`].
    pub fn headless(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(
            config,
            Box::new(RapierWorld::default()),
            Box::new(DrawQueue::new(1.0).clear_each_frame()),
        )
    }

    /// Replace the frame timer, e.g. with [`Timer::fixed`] for reproducible runs
    pub fn set_timer(&mut self, timer: Timer) {
        self.timer = timer;
    }

    /// Run one lifecycle frame
    pub fn frame(&mut self, delta_time: f32) -> FrameStats {
        *self.driver.frame(&mut self.scene, self.renderer.as_mut(), delta_time)
    }

    /// Run the main loop until [`quit`](Self::quit) or the frame limit
    ///
    /// # Errors
    /// Stops at the first error returned by the application and reports it
    /// as [`EngineError::Application`]. `cleanup` still runs.
    pub fn run<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        let clock = Stopwatch::start_new();
        let result = self.main_loop(app);
        app.cleanup(self);

        log::info!(
            "Engine shutdown complete after {} frames ({:.1} ms, {:.1} avg fps)",
            self.driver.frame_count(),
            clock.elapsed().as_secs_f64() * 1000.0,
            self.timer.average_fps()
        );
        result
    }

    fn main_loop<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        self.running = true;
        while self.running {
            let delta_time = self.timer.tick();

            app.update(self, delta_time)
                .map_err(|e| EngineError::Application(format!("App update: {e}")))?;

            let stats = self.frame(delta_time);
            log::debug!(
                "Frame {}: started {}, updated {}, synced {}, drawn {}",
                stats.frame,
                stats.started,
                stats.updated,
                stats.synced,
                stats.drawn
            );

            if self.config.max_frames.is_some_and(|max| stats.frame >= max) {
                self.running = false;
            }
            if let Some(fps) = self.config.target_fps {
                self.timer.pace(fps);
            }
        }
        Ok(())
    }

    /// Request engine shutdown at the end of the current frame
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop keeps going
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Statistics of the most recent frame
    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        self.driver.stats()
    }

    /// Get the scene
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Get mutable access to the scene
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Get the render collaborator
    #[must_use]
    pub fn renderer(&self) -> &dyn RenderBackend {
        self.renderer.as_ref()
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the current frame delta time
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.timer.delta_time()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The application failed
    #[error("Application error: {0}")]
    Application(String),
}
