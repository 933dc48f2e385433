//! Component capability trait and dispatch context

use super::{ComponentId, NodeId, Scene};
use crate::physics::{BodyHandle, PhysicsBackend};
use crate::render::RenderContext;
use std::any::Any;

/// Upcast helper so typed lookups can downcast to the concrete component
pub trait AsAny: Any {
    /// View as [`Any`]
    fn as_any(&self) -> &dyn Any;
    /// View as mutable [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour attached to a node, or registered as a free-standing script
///
/// Every capability is optional. The lifecycle driver calls [`start`] exactly
/// once before the first [`update`] or [`render`] of a slot; [`update`] runs
/// every frame afterwards, [`render`] every frame with an active camera.
///
/// While a callback runs, the component is moved out of its slot: the scene
/// can be mutated freely through the context (new nodes, new components,
/// even destroying the owner), but typed lookups for the running component
/// itself return `None`.
///
/// [`start`]: Component::start
/// [`update`]: Component::update
/// [`render`]: Component::render
pub trait Component: AsAny {
    /// Called once, on the first frame the slot is seen
    fn start(&mut self, _cx: &mut FrameContext<'_>) {}

    /// Called every frame after start
    fn update(&mut self, _cx: &mut FrameContext<'_>) {}

    /// Called during the depth-first render traversal with the resolved depth
    fn render(&mut self, _cx: &mut RenderContext<'_>, _depth: f32) {}

    /// Physics body driven by this component. Returning `Some` marks the
    /// component as rigid-body-shaped for the owning node.
    fn rigid_body(&self) -> Option<BodyHandle> {
        None
    }

    /// Release external resources when the component leaves the scene
    fn on_detach(&mut self, _physics: &mut dyn PhysicsBackend) {}

    /// Name used in diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Context handed to [`Component::start`] and [`Component::update`]
pub struct FrameContext<'a> {
    /// The scene, mutable for re-entrant changes
    pub scene: &'a mut Scene,
    component: ComponentId,
    owner: Option<NodeId>,
    delta_time: f32,
    frame: u64,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        component: ComponentId,
        owner: Option<NodeId>,
        delta_time: f32,
        frame: u64,
    ) -> Self {
        Self {
            scene,
            component,
            owner,
            delta_time,
            frame,
        }
    }

    /// Slot of the running component
    #[must_use]
    pub const fn component(&self) -> ComponentId {
        self.component
    }

    /// Node the component is attached to; `None` for scripts
    #[must_use]
    pub const fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Seconds since the previous frame
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Index of the current frame, starting at 1
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}
