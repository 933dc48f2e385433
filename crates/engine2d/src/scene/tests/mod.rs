//! Scene-level tests and shared test doubles


use crate::foundation::math::Vec2;
use crate::physics::{BodyDesc, BodyHandle, PhysicsBackend, PhysicsError, SimpleWorld};
use crate::render::RenderContext;
use crate::scene::{Component, FrameContext, Scene};
use std::cell::RefCell;
use std::rc::Rc;

/// Observable state of a [`RecordingPhysics`]
#[derive(Debug, Default)]
pub(super) struct PhysicsLog {
    pub pushes: Vec<(BodyHandle, Vec2, f32)>,
    pub destroyed: Vec<BodyHandle>,
    pub failed_destroys: usize,
    pub steps: usize,
    pub locked: bool,
}

/// Physics backend that delegates to [`SimpleWorld`] and records calls
pub(super) struct RecordingPhysics {
    world: SimpleWorld,
    log: Rc<RefCell<PhysicsLog>>,
}

impl RecordingPhysics {
    /// Scene backed by a recording world, plus the shared log
    pub fn scene() -> (Scene, Rc<RefCell<PhysicsLog>>) {
        let log = Rc::new(RefCell::new(PhysicsLog::default()));
        let physics = Self {
            world: SimpleWorld::new(Vec2::new(0.0, -10.0)),
            log: Rc::clone(&log),
        };
        (Scene::new(Box::new(physics)), log)
    }
}

impl PhysicsBackend for RecordingPhysics {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.world.create_body(desc)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        let mut log = self.log.borrow_mut();
        if log.locked {
            log.failed_destroys += 1;
            return Err(PhysicsError::WorldLocked);
        }
        log.destroyed.push(handle);
        self.world.destroy_body(handle)
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.world.body_position(handle)
    }

    fn body_rotation(&self, handle: BodyHandle) -> Option<f32> {
        self.world.body_rotation(handle)
    }

    fn set_body_transform(&mut self, handle: BodyHandle, position: Vec2, rotation: f32) -> Result<(), PhysicsError> {
        if self.log.borrow().locked {
            return Err(PhysicsError::WorldLocked);
        }
        self.log.borrow_mut().pushes.push((handle, position, rotation));
        self.world.set_body_transform(handle, position, rotation)
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.world.linear_velocity(handle)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.world.set_linear_velocity(handle, velocity)
    }

    fn step(&mut self, delta_time: f32) {
        self.log.borrow_mut().steps += 1;
        self.world.step(delta_time);
    }

    fn is_locked(&self) -> bool {
        self.log.borrow().locked || self.world.is_locked()
    }

    fn body_count(&self) -> usize {
        self.world.body_count()
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.world.set_gravity(gravity);
    }
}

/// Shared call journal for [`Recorder`] components
pub(super) type Journal = Rc<RefCell<Vec<String>>>;

pub(super) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Component that records every callback as `"<event>:<label>"`
pub(super) struct Recorder {
    label: String,
    journal: Journal,
}

impl Recorder {
    pub fn new(label: &str, journal: &Journal) -> Self {
        Self {
            label: label.to_string(),
            journal: Rc::clone(journal),
        }
    }

    fn record(&self, event: &str) {
        self.journal.borrow_mut().push(format!("{event}:{}", self.label));
    }
}

impl Component for Recorder {
    fn start(&mut self, _cx: &mut FrameContext<'_>) {
        self.record("start");
    }

    fn update(&mut self, _cx: &mut FrameContext<'_>) {
        self.record("update");
    }

    fn render(&mut self, _cx: &mut RenderContext<'_>, depth: f32) {
        self.journal
            .borrow_mut()
            .push(format!("render:{}@{depth}", self.label));
    }

    fn on_detach(&mut self, _physics: &mut dyn PhysicsBackend) {
        self.record("detach");
    }
}

/// Count of journal entries equal to `entry`
pub(super) fn count(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|e| e.as_str() == entry).count()
}
