//! Per-frame dispatch
//!
//! A frame runs four phases in a fixed order: start, update, physics sync and
//! render. Every phase that calls into components iterates over a copied
//! snapshot of handles, never over the live collections, because callbacks
//! may add or remove nodes, components and scripts. Handles that died in the
//! meantime are skipped.

use super::{Component, ComponentId, FrameContext, NodeId, Scene};
use crate::config::{EngineConfig, PhysicsConfig, RenderConfig};
use crate::foundation::math::Mat3;
use crate::render::{RenderBackend, RenderContext};

/// Counters collected over one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame index, starting at 1
    pub frame: u64,
    /// `start` calls
    pub started: usize,
    /// `update` calls
    pub updated: usize,
    /// Nodes whose transform was pulled from their body
    pub synced: usize,
    /// `render` calls
    pub rendered: usize,
    /// Draw submissions
    pub drawn: usize,
}

/// State threaded through one frame's render traversal
struct RenderPass<'a> {
    backend: &'a mut dyn RenderBackend,
    view: Mat3,
    projection: Mat3,
    step: f32,
    offset: f32,
}

/// Drives the lifecycle of every component in a [`Scene`]
#[derive(Debug, Clone)]
pub struct LifecycleDriver {
    physics: PhysicsConfig,
    render: RenderConfig,
    frame: u64,
    stats: FrameStats,
}

impl LifecycleDriver {
    /// Create a driver with explicit physics and render parameters
    #[must_use]
    pub fn new(physics: PhysicsConfig, render: RenderConfig) -> Self {
        Self {
            physics,
            render,
            frame: 0,
            stats: FrameStats::default(),
        }
    }

    /// Create a driver from the engine configuration
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.physics.clone(), config.render.clone())
    }

    /// Statistics of the most recent frame
    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Number of frames run so far
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Physics parameters
    #[must_use]
    pub const fn physics_config(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// Render parameters
    #[must_use]
    pub const fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Run one full frame
    pub fn frame(&mut self, scene: &mut Scene, renderer: &mut dyn RenderBackend, delta_time: f32) -> &FrameStats {
        self.frame += 1;
        self.stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };

        self.start_phase(scene, delta_time);
        self.update_phase(scene, delta_time);
        self.physics_phase(scene, delta_time);
        self.render_phase(scene, renderer);

        log::trace!("Frame {:?}", self.stats);
        &self.stats
    }

    // ========================================================================
    // Phases
    // ========================================================================

    /// Call `start` on every slot that has not started yet: scripts first,
    /// then node components in node creation order
    ///
    /// Nodes created by a `start` callback are not part of this phase.
    pub fn start_phase(&mut self, scene: &mut Scene, delta_time: f32) {
        let scripts = scene.script_ids().to_vec();
        let nodes = scene.node_ids().to_vec();
        for id in scripts {
            self.start_slot(scene, id, delta_time);
        }
        for node in nodes {
            for id in Self::component_snapshot(scene, node) {
                self.start_slot(scene, id, delta_time);
            }
        }
    }

    /// Call `update` on every started slot: scripts first, then node components
    pub fn update_phase(&mut self, scene: &mut Scene, delta_time: f32) {
        let scripts = scene.script_ids().to_vec();
        let nodes = scene.node_ids().to_vec();
        for id in scripts {
            self.update_slot(scene, id, delta_time);
        }
        for node in nodes {
            for id in Self::component_snapshot(scene, node) {
                self.update_slot(scene, id, delta_time);
            }
        }
    }

    /// Step the physics world, then pull every attached body into its node
    ///
    /// Nodes are pulled depth-first from the roots, so a parent holds its new
    /// pose before its children are converted into its space. Pulling never
    /// pushes back into the body.
    pub fn physics_phase(&mut self, scene: &mut Scene, delta_time: f32) {
        if self.physics.enabled {
            let step = self.physics.fixed_timestep.unwrap_or(delta_time);
            scene.physics_mut().step(step);
        }
        for node in scene.depth_first() {
            if scene.sync_from_body(node) {
                self.stats.synced += 1;
            }
        }
    }

    /// Depth-first render from every root; skipped without an active camera
    pub fn render_phase(&mut self, scene: &mut Scene, renderer: &mut dyn RenderBackend) {
        let Some(camera) = scene.active_camera().copied() else {
            return;
        };
        let Some(view) = camera.view(scene) else {
            log::warn!("Active camera follows a destroyed node; skipping render");
            return;
        };
        let projection = camera.projection(renderer.aspect_ratio());
        renderer.begin_frame();

        let mut pass = RenderPass {
            backend: renderer,
            view,
            projection,
            step: self.render.depth_step,
            offset: 0.0,
        };
        for root in scene.roots() {
            self.render_node(scene, &mut pass, root, self.render.root_depth);
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn component_snapshot(scene: &Scene, node: NodeId) -> Vec<ComponentId> {
        scene
            .node(node)
            .map(|n| n.components().to_vec())
            .unwrap_or_default()
    }

    fn start_slot(&mut self, scene: &mut Scene, id: ComponentId, delta_time: f32) {
        if scene.slot_started(id) != Some(false) {
            return;
        }
        let Some((mut behavior, owner)) = scene.take_behavior(id) else {
            return;
        };
        scene.mark_started(id);
        {
            let mut cx = FrameContext::new(scene, id, owner, delta_time, self.frame);
            behavior.start(&mut cx);
        }
        scene.restore_behavior(id, behavior);
        self.stats.started += 1;
    }

    fn update_slot(&mut self, scene: &mut Scene, id: ComponentId, delta_time: f32) {
        if scene.slot_started(id) != Some(true) {
            return;
        }
        let Some((mut behavior, owner)) = scene.take_behavior(id) else {
            return;
        };
        {
            let mut cx = FrameContext::new(scene, id, owner, delta_time, self.frame);
            behavior.update(&mut cx);
        }
        scene.restore_behavior(id, behavior);
        self.stats.updated += 1;
    }

    /// Components draw at `depth - offset`; the offset grows before every
    /// component and before every child, and is carried from one root to the next
    fn render_node(&mut self, scene: &mut Scene, pass: &mut RenderPass<'_>, id: NodeId, inherited: f32) {
        let Some(node) = scene.node(id) else {
            return;
        };
        let depth = node.resolve_depth(inherited);
        let components = node.components().to_vec();
        let children = node.children().to_vec();

        for component in components {
            pass.offset += pass.step;
            self.render_slot(scene, pass, component, depth - pass.offset);
        }
        for child in children {
            pass.offset += pass.step;
            self.render_node(scene, pass, child, depth);
        }
    }

    fn render_slot(&mut self, scene: &mut Scene, pass: &mut RenderPass<'_>, id: ComponentId, depth: f32) {
        if scene.slot_started(id) != Some(true) {
            return;
        }
        let Some((mut behavior, owner)) = scene.take_behavior(id) else {
            return;
        };
        let submitted = Self::render_behavior(scene, pass, behavior.as_mut(), id, owner, depth);
        scene.restore_behavior(id, behavior);
        self.stats.rendered += 1;
        self.stats.drawn += submitted;
    }

    fn render_behavior(
        scene: &Scene,
        pass: &mut RenderPass<'_>,
        behavior: &mut dyn Component,
        id: ComponentId,
        owner: Option<NodeId>,
        depth: f32,
    ) -> usize {
        let mut cx = RenderContext::new(scene, &mut *pass.backend, id, owner, pass.view, pass.projection);
        behavior.render(&mut cx, depth);
        cx.submitted()
    }
}

impl Default for LifecycleDriver {
    fn default() -> Self {
        Self::new(PhysicsConfig::default(), RenderConfig::default())
    }
}
