//! Scene core
//!
//! - [`SpatialNode`]: local transform, cached matrices and hierarchy links
//! - [`Component`]: behaviour attached to a node (or free-standing, as a script)
//! - [`Scene`]: registry owning every node, component slot and script, plus
//!   the physics collaborator and the active camera
//! - [`LifecycleDriver`]: per-frame start / update / physics sync / render
//!
//! Nodes and components are addressed by stable slotmap keys. Parent and
//! child links are index relations maintained by [`Scene::reparent`] only, so
//! the two sides can never disagree.

mod component;
mod error;
mod hierarchy;
mod lifecycle;
mod node;
mod registry;
mod spatial;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, FrameContext};
pub use error::SceneError;
pub use lifecycle::{FrameStats, LifecycleDriver};
pub use node::{SpatialNode, MAX_RENDER_DEPTH, RENDER_DEPTH_INHERIT};
pub use registry::Scene;

slotmap::new_key_type! {
    /// Stable handle to a node in a [`Scene`]
    pub struct NodeId;

    /// Stable handle to a component slot in a [`Scene`]
    pub struct ComponentId;
}
