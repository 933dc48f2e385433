//! Spatial node (transform) with cached matrix derivation
//!
//! A node stores its local position, rotation (degrees) and scale. The four
//! derived matrices are rebuilt together, lazily, the first time one of them
//! is read after a change. Setters compare against the current value so a
//! no-op write never invalidates the cache.

use super::{ComponentId, NodeId};
use crate::foundation::math::{self, Mat3, Vec2};
use crate::physics::BodyHandle;
use std::cell::Cell;

/// Render depth value meaning "inherit from the parent at render time"
pub const RENDER_DEPTH_INHERIT: f32 = -1.0;

/// Largest explicit render depth; draw depths are normalised by this value
pub const MAX_RENDER_DEPTH: f32 = 10000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct LocalMatrices {
    local: Mat3,
    local_no_scale: Mat3,
    inverse: Mat3,
    inverse_no_scale: Mat3,
}

impl LocalMatrices {
    /// `local = T * R * S`; the inverse is composed directly as
    /// `S⁻¹ * R⁻¹ * T⁻¹`, leaving out `S⁻¹` when an axis has zero scale.
    fn compute(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        let local_no_scale = math::translation(position) * math::rotation_degrees(rotation);
        let local = local_no_scale * math::scaling(scale);

        let inverse_no_scale = math::rotation_degrees(-rotation) * math::translation(-position);
        let inverse = match math::inverse_scaling(scale) {
            Some(inverse_scale) => inverse_scale * inverse_no_scale,
            None => inverse_no_scale,
        };

        Self {
            local,
            local_no_scale,
            inverse,
            inverse_no_scale,
        }
    }
}

/// The rigid-body-shaped component cached on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AttachedBody {
    pub(crate) component: ComponentId,
    pub(crate) handle: BodyHandle,
}

/// A node of the scene graph
///
/// Hierarchy links and the component list are read-only here; they are
/// changed through [`Scene`](super::Scene) so both sides of every relation
/// stay in sync.
#[derive(Debug)]
pub struct SpatialNode {
    name: String,
    tag: String,
    local_position: Vec2,
    local_rotation: f32,
    local_scale: Vec2,
    render_depth: f32,

    dirty: Cell<bool>,
    matrices: Cell<LocalMatrices>,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) components: Vec<ComponentId>,
    pub(crate) attached_body: Option<AttachedBody>,
}

impl SpatialNode {
    /// Create a detached node with identity transform and inherited depth
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            local_position: Vec2::zeros(),
            local_rotation: 0.0,
            local_scale: Vec2::new(1.0, 1.0),
            render_depth: RENDER_DEPTH_INHERIT,
            dirty: Cell::new(true),
            matrices: Cell::new(LocalMatrices {
                local: Mat3::identity(),
                local_no_scale: Mat3::identity(),
                inverse: Mat3::identity(),
                inverse_no_scale: Mat3::identity(),
            }),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            attached_body: None,
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Node name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Free-form tag used for group lookups
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Set the tag
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    // ========================================================================
    // Local transform
    // ========================================================================

    /// Position relative to the parent
    #[must_use]
    pub const fn local_position(&self) -> Vec2 {
        self.local_position
    }

    /// Rotation relative to the parent, in degrees
    #[must_use]
    pub const fn local_rotation(&self) -> f32 {
        self.local_rotation
    }

    /// Scale relative to the parent
    #[must_use]
    pub const fn local_scale(&self) -> Vec2 {
        self.local_scale
    }

    /// Set the local position. Returns whether the value changed.
    ///
    /// This does not touch an attached rigid body; use
    /// [`Scene::set_local_position`](super::Scene::set_local_position) for that.
    pub fn set_local_position(&mut self, position: Vec2) -> bool {
        if self.local_position == position {
            return false;
        }
        self.local_position = position;
        self.dirty.set(true);
        true
    }

    /// Set the local rotation in degrees. Returns whether the value changed.
    pub fn set_local_rotation(&mut self, degrees: f32) -> bool {
        if self.local_rotation == degrees {
            return false;
        }
        self.local_rotation = degrees;
        self.dirty.set(true);
        true
    }

    /// Set the local scale. Returns whether the value changed.
    pub fn set_local_scale(&mut self, scale: Vec2) -> bool {
        if self.local_scale == scale {
            return false;
        }
        self.local_scale = scale;
        self.dirty.set(true);
        true
    }

    /// Whether the cached matrices are stale
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    // ========================================================================
    // Render depth
    // ========================================================================

    /// Explicit render depth, or [`RENDER_DEPTH_INHERIT`]
    #[must_use]
    pub const fn render_depth(&self) -> f32 {
        self.render_depth
    }

    /// Set the render depth
    ///
    /// Accepts [`RENDER_DEPTH_INHERIT`] or a value in `[0, MAX_RENDER_DEPTH]`.
    /// Anything else is clamped into range with a warning.
    pub fn set_render_depth(&mut self, depth: f32) {
        if depth == RENDER_DEPTH_INHERIT || (0.0..=MAX_RENDER_DEPTH).contains(&depth) {
            self.render_depth = depth;
            return;
        }
        let clamped = if depth.is_nan() { RENDER_DEPTH_INHERIT } else { depth.clamp(0.0, MAX_RENDER_DEPTH) };
        log::warn!(
            "Render depth {} of node '{}' is outside [0, {}]; using {}",
            depth,
            self.name,
            MAX_RENDER_DEPTH,
            clamped
        );
        self.render_depth = clamped;
    }

    /// Depth this node draws at, given its parent's resolved depth
    #[must_use]
    pub fn resolve_depth(&self, inherited: f32) -> f32 {
        if self.render_depth == RENDER_DEPTH_INHERIT {
            inherited
        } else {
            self.render_depth
        }
    }

    // ========================================================================
    // Cached matrices
    // ========================================================================

    fn matrices(&self) -> LocalMatrices {
        if self.dirty.get() {
            self.matrices.set(LocalMatrices::compute(
                self.local_position,
                self.local_rotation,
                self.local_scale,
            ));
            self.dirty.set(false);
        }
        self.matrices.get()
    }

    /// `translate * rotate * scale`: local space to parent space
    #[must_use]
    pub fn local_matrix(&self) -> Mat3 {
        self.matrices().local
    }

    /// `translate * rotate`: like [`local_matrix`](Self::local_matrix) without scale
    #[must_use]
    pub fn local_matrix_no_scale(&self) -> Mat3 {
        self.matrices().local_no_scale
    }

    /// Parent space to local space. Zero-scale axes are not inverted.
    #[must_use]
    pub fn inverse_local_matrix(&self) -> Mat3 {
        self.matrices().inverse
    }

    /// Inverse of [`local_matrix_no_scale`](Self::local_matrix_no_scale)
    #[must_use]
    pub fn inverse_local_matrix_no_scale(&self) -> Mat3 {
        self.matrices().inverse_no_scale
    }

    /// Transform a point from this node's space into its parent's space
    #[must_use]
    pub fn local_point_to_parent_point(&self, point: Vec2) -> Vec2 {
        math::transform_point(&self.local_matrix(), point)
    }

    /// Transform a point from the parent's space into this node's space
    #[must_use]
    pub fn parent_point_to_local_point(&self, point: Vec2) -> Vec2 {
        math::transform_point(&self.inverse_local_matrix(), point)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Parent node, `None` for a root
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attached components in insertion order
    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// The first rigid-body-shaped component attached to this node
    #[must_use]
    pub fn attached_rigid_body(&self) -> Option<ComponentId> {
        self.attached_body.map(|body| body.component)
    }

    /// Physics handle of the attached rigid body
    #[must_use]
    pub fn attached_body_handle(&self) -> Option<BodyHandle> {
        self.attached_body.map(|body| body.handle)
    }
}
