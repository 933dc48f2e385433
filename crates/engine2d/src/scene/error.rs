//! Scene error types

use super::{ComponentId, NodeId};
use thiserror::Error;

/// Errors returned by hierarchy and component mutations
///
/// Every variant is also logged at the point of failure; the scene is left
/// in its previous valid state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The node does not exist (destroyed or never created)
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),

    /// A node cannot be its own parent
    #[error("node {0:?} cannot be its own parent")]
    SelfParent(NodeId),

    /// The requested parent is a descendant of the child
    #[error("making {parent:?} the parent of {child:?} would create a cycle")]
    CyclicParent {
        /// Node being reparented
        child: NodeId,
        /// Requested new parent
        parent: NodeId,
    },

    /// The component is not attached to the node
    #[error("component {component:?} is not attached to node {node:?}")]
    ComponentNotFound {
        /// Node that was searched
        node: NodeId,
        /// Requested component
        component: ComponentId,
    },

    /// The component is running a callback and cannot be handed out
    #[error("component {0:?} is running a callback")]
    ComponentBusy(ComponentId),
}
