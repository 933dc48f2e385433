//! Attachment registry: node, component and script ownership
//!
//! The scene owns every node and every component slot. Insertion order of
//! nodes and scripts is kept separately from the slotmaps because the
//! lifecycle driver iterates in that order.

use super::node::AttachedBody;
use super::{Component, ComponentId, NodeId, SceneError, SpatialNode};
use crate::physics::{PhysicsBackend, RapierWorld};
use crate::render::Camera2D;
use slotmap::SlotMap;

/// Storage for one component
struct ComponentSlot {
    /// Set once at attach time; `None` for scripts
    owner: Option<NodeId>,
    started: bool,
    /// `None` while the component is running a callback
    behavior: Option<Box<dyn Component>>,
    type_name: &'static str,
}

/// Scene context: the registry of all live nodes, components and scripts
pub struct Scene {
    pub(super) nodes: SlotMap<NodeId, SpatialNode>,
    node_order: Vec<NodeId>,
    slots: SlotMap<ComponentId, ComponentSlot>,
    scripts: Vec<ComponentId>,
    pub(super) physics: Box<dyn PhysicsBackend>,
    active_camera: Option<Camera2D>,
}

impl Scene {
    /// Create an empty scene backed by the given physics world
    #[must_use]
    pub fn new(physics: Box<dyn PhysicsBackend>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            node_order: Vec::new(),
            slots: SlotMap::with_key(),
            scripts: Vec::new(),
            physics,
            active_camera: None,
        }
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Physics collaborator
    #[must_use]
    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }

    /// Mutable physics collaborator
    pub fn physics_mut(&mut self) -> &mut dyn PhysicsBackend {
        self.physics.as_mut()
    }

    /// Camera used by the render phase; `None` disables rendering
    #[must_use]
    pub const fn active_camera(&self) -> Option<&Camera2D> {
        self.active_camera.as_ref()
    }

    /// Replace the active camera
    pub fn set_active_camera(&mut self, camera: Option<Camera2D>) {
        self.active_camera = camera;
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Create a root node and register it
    ///
    /// The node takes part in the lifecycle from the next start phase on.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        log::trace!("Creating node '{}'", name);
        let id = self.nodes.insert(SpatialNode::new(name));
        self.node_order.push(id);
        id
    }

    /// Create a node and make it the last child of `parent`
    ///
    /// A missing parent is logged and the node stays a root.
    pub fn create_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = self.create_node(name);
        // Failure is already logged by `reparent`
        let _ = self.add_child(parent, id);
        id
    }

    /// Destroy a node, its descendants and their components
    ///
    /// Children are destroyed first. Returns `false` if the node was not live.
    pub fn destroy_node(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        let children = node.children.clone();
        for child in children {
            self.destroy_node(child);
        }

        self.unlink(id);
        let Some(node) = self.nodes.remove(id) else {
            return false;
        };
        log::trace!("Destroying node '{}'", node.name());
        for component in node.components {
            self.release_slot(component);
        }
        self.node_order.retain(|live| *live != id);
        true
    }

    /// Whether the node is live
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node lookup
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SpatialNode> {
        self.nodes.get(id)
    }

    /// Mutable node lookup
    ///
    /// Setters reached through here never push into an attached rigid body;
    /// the scene-level setters do.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SpatialNode> {
        self.nodes.get_mut(id)
    }

    /// Live nodes in creation order
    #[must_use]
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Number of live nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    /// First node (in creation order) with the given name
    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_order
            .iter()
            .copied()
            .find(|id| self.nodes.get(*id).is_some_and(|node| node.name() == name))
    }

    /// All nodes with the given tag, in creation order
    #[must_use]
    pub fn find_nodes_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.node_order
            .iter()
            .copied()
            .filter(|id| self.nodes.get(*id).is_some_and(|node| node.tag() == tag))
            .collect()
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attach a component to a node
    ///
    /// The first rigid-body-shaped component becomes the node's attached
    /// body. A second one is still attached but is not remembered as the
    /// body; that is logged as an error.
    pub fn add_component(&mut self, node: NodeId, mut component: Box<dyn Component>) -> Option<ComponentId> {
        let type_name = component.type_name();
        if !self.nodes.contains_key(node) {
            log::error!("Cannot attach {} to missing node {:?}", type_name, node);
            component.on_detach(self.physics.as_mut());
            return None;
        }

        let body = component.rigid_body();
        let id = self.slots.insert(ComponentSlot {
            owner: Some(node),
            started: false,
            behavior: Some(component),
            type_name,
        });

        let entry = &mut self.nodes[node];
        entry.components.push(id);
        if let Some(handle) = body {
            match entry.attached_body {
                Some(existing) => log::error!(
                    "Node '{}' already has rigid body {:?}; {} ({:?}) is attached but ignored for physics sync",
                    entry.name(),
                    existing.component,
                    type_name,
                    id
                ),
                None => entry.attached_body = Some(AttachedBody { component: id, handle }),
            }
        }
        Some(id)
    }

    /// Attach a component by value
    pub fn attach<C: Component>(&mut self, node: NodeId, component: C) -> Option<ComponentId> {
        self.add_component(node, Box::new(component))
    }

    /// Detach and destroy a component. Returns whether it was found on `node`.
    pub fn remove_component(&mut self, node: NodeId, id: ComponentId) -> bool {
        match self.unlink_component(node, id) {
            Some(behavior) => {
                if let Some(mut behavior) = behavior {
                    behavior.on_detach(self.physics.as_mut());
                }
                true
            }
            None => false,
        }
    }

    /// Detach a component and hand it back without destroying it
    ///
    /// Unlinking is identical to [`remove_component`](Self::remove_component)
    /// but `on_detach` does not run.
    ///
    /// # Errors
    /// [`SceneError::ComponentNotFound`] if the component is not on `node`.
    /// [`SceneError::ComponentBusy`] if it is running a callback right now;
    /// it then stays attached.
    pub fn take_component(&mut self, node: NodeId, id: ComponentId) -> Result<Box<dyn Component>, SceneError> {
        let not_found = SceneError::ComponentNotFound { node, component: id };
        if !self.nodes.get(node).is_some_and(|entry| entry.components.contains(&id)) {
            return Err(not_found);
        }
        if self.slots.get(id).is_some_and(|slot| slot.behavior.is_none()) {
            log::error!("Cannot take {:?} from node {:?} while it is running", id, node);
            return Err(SceneError::ComponentBusy(id));
        }
        self.unlink_component(node, id).flatten().ok_or(not_found)
    }

    /// Unlink by identity; the outer `Option` reports whether it was found
    fn unlink_component(&mut self, node: NodeId, id: ComponentId) -> Option<Option<Box<dyn Component>>> {
        let entry = self.nodes.get_mut(node)?;
        let index = entry.components.iter().position(|c| *c == id)?;
        entry.components.remove(index);
        if entry.attached_body.is_some_and(|body| body.component == id) {
            entry.attached_body = None;
        }
        self.slots.remove(id).map(|slot| slot.behavior)
    }

    /// First component on `node` whose concrete type is exactly `T`
    #[must_use]
    pub fn get_component<T: Component>(&self, node: NodeId) -> Option<&T> {
        self.nodes
            .get(node)?
            .components
            .iter()
            .find_map(|id| self.component::<T>(*id))
    }

    /// Mutable variant of [`get_component`](Self::get_component)
    pub fn get_component_mut<T: Component>(&mut self, node: NodeId) -> Option<&mut T> {
        let id = self
            .nodes
            .get(node)?
            .components
            .iter()
            .copied()
            .find(|id| self.component::<T>(*id).is_some())?;
        self.component_mut::<T>(id)
    }

    /// All components on `node` whose concrete type is exactly `T`
    #[must_use]
    pub fn get_components<T: Component>(&self, node: NodeId) -> Vec<&T> {
        self.nodes.get(node).map_or_else(Vec::new, |entry| {
            entry
                .components
                .iter()
                .filter_map(|id| self.component::<T>(*id))
                .collect()
        })
    }

    /// Component lookup by slot, downcast to `T`
    #[must_use]
    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        let behavior: &dyn Component = self.slots.get(id)?.behavior.as_deref()?;
        behavior.as_any().downcast_ref::<T>()
    }

    /// Mutable component lookup by slot, downcast to `T`
    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        let behavior: &mut dyn Component = self.slots.get_mut(id)?.behavior.as_deref_mut()?;
        behavior.as_any_mut().downcast_mut::<T>()
    }

    /// Node a component is attached to; `None` for scripts and dead slots
    #[must_use]
    pub fn component_owner(&self, id: ComponentId) -> Option<NodeId> {
        self.slots.get(id)?.owner
    }

    /// Diagnostic type name of a component slot
    #[must_use]
    pub fn component_type_name(&self, id: ComponentId) -> Option<&'static str> {
        self.slots.get(id).map(|slot| slot.type_name)
    }

    /// Whether the slot is live
    #[must_use]
    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.slots.contains_key(id)
    }

    /// The node's attached rigid body slot
    #[must_use]
    pub fn attached_rigid_body(&self, node: NodeId) -> Option<ComponentId> {
        self.nodes.get(node)?.attached_rigid_body()
    }

    // ========================================================================
    // Scripts
    // ========================================================================

    /// Register a free-standing script
    pub fn add_script(&mut self, script: Box<dyn Component>) -> ComponentId {
        let type_name = script.type_name();
        let id = self.slots.insert(ComponentSlot {
            owner: None,
            started: false,
            behavior: Some(script),
            type_name,
        });
        self.scripts.push(id);
        id
    }

    /// Register a free-standing script by value
    pub fn attach_script<C: Component>(&mut self, script: C) -> ComponentId {
        self.add_script(Box::new(script))
    }

    /// Remove and destroy a script. Returns whether it was registered.
    pub fn remove_script(&mut self, id: ComponentId) -> bool {
        let Some(index) = self.scripts.iter().position(|s| *s == id) else {
            return false;
        };
        self.scripts.remove(index);
        self.release_slot(id);
        true
    }

    /// Scripts in registration order
    #[must_use]
    pub fn script_ids(&self) -> &[ComponentId] {
        &self.scripts
    }

    /// Number of registered scripts
    #[must_use]
    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    // ========================================================================
    // Dispatch support
    // ========================================================================

    /// `Some(started)` for a live slot
    pub(crate) fn slot_started(&self, id: ComponentId) -> Option<bool> {
        self.slots.get(id).map(|slot| slot.started)
    }

    pub(crate) fn mark_started(&mut self, id: ComponentId) {
        if let Some(slot) = self.slots.get_mut(id) {
            slot.started = true;
        }
    }

    /// Move a component out of its slot for a callback
    pub(crate) fn take_behavior(&mut self, id: ComponentId) -> Option<(Box<dyn Component>, Option<NodeId>)> {
        let slot = self.slots.get_mut(id)?;
        let behavior = slot.behavior.take()?;
        Some((behavior, slot.owner))
    }

    /// Put a component back after a callback
    ///
    /// If the slot was removed while the callback ran, the component is
    /// released instead.
    pub(crate) fn restore_behavior(&mut self, id: ComponentId, mut behavior: Box<dyn Component>) {
        match self.slots.get_mut(id) {
            Some(slot) if slot.behavior.is_none() => slot.behavior = Some(behavior),
            _ => behavior.on_detach(self.physics.as_mut()),
        }
    }

    fn release_slot(&mut self, id: ComponentId) {
        if let Some(mut behavior) = self.slots.remove(id).and_then(|slot| slot.behavior) {
            behavior.on_detach(self.physics.as_mut());
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Box::new(RapierWorld::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyDesc, BodyType, RigidBody2D};

    #[derive(Debug, Default)]
    struct Health(u32);
    impl Component for Health {}

    #[derive(Debug, Default)]
    struct Armor;
    impl Component for Armor {}

    #[test]
    fn test_create_and_find_nodes() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.node_mut(b).unwrap().set_tag("enemy");

        assert_eq!(scene.node_count(), 2);
        assert_eq!(scene.node_ids(), &[a, b]);
        assert_eq!(scene.find_node_by_name("b"), Some(b));
        assert_eq!(scene.find_node_by_name("missing"), None);
        assert_eq!(scene.find_nodes_by_tag("enemy"), vec![b]);
        assert!(scene.find_nodes_by_tag("friend").is_empty());
    }

    #[test]
    fn test_typed_lookup_is_exact() {
        let mut scene = Scene::default();
        let node = scene.create_node("n");
        let health = scene.attach(node, Health(10)).unwrap();

        assert_eq!(scene.get_component::<Health>(node).map(|h| h.0), Some(10));
        assert!(scene.get_component::<Armor>(node).is_none());
        assert_eq!(scene.component_owner(health), Some(node));

        scene.get_component_mut::<Health>(node).unwrap().0 = 3;
        assert_eq!(scene.component::<Health>(health).unwrap().0, 3);
    }

    #[test]
    fn test_get_components_in_order() {
        let mut scene = Scene::default();
        let node = scene.create_node("n");
        scene.attach(node, Health(1));
        scene.attach(node, Armor);
        scene.attach(node, Health(2));

        let values: Vec<u32> = scene.get_components::<Health>(node).iter().map(|h| h.0).collect();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(scene.node(node).unwrap().components().len(), 3);
    }

    #[test]
    fn test_remove_and_take_component() {
        let mut scene = Scene::default();
        let node = scene.create_node("n");
        let other = scene.create_node("other");
        let first = scene.attach(node, Health(1)).unwrap();
        let second = scene.attach(node, Health(2)).unwrap();

        assert!(!scene.remove_component(other, first));
        assert!(scene.remove_component(node, first));
        assert!(!scene.remove_component(node, first));
        assert!(!scene.contains_component(first));

        let taken = scene.take_component(node, second).unwrap();
        assert_eq!(taken.as_ref().as_any().downcast_ref::<Health>().map(|h| h.0), Some(2));
        assert!(scene.node(node).unwrap().components().is_empty());
        assert!(scene.get_component::<Health>(node).is_none());
        assert_eq!(
            scene.take_component(node, second).err(),
            Some(SceneError::ComponentNotFound { node, component: second })
        );
    }

    #[test]
    fn test_attach_to_missing_node() {
        let mut scene = Scene::default();
        let node = scene.create_node("n");
        scene.destroy_node(node);
        assert!(scene.attach(node, Health(1)).is_none());
    }

    #[test]
    fn test_first_rigid_body_wins() {
        let mut scene = Scene::default();
        let node = scene.create_node("body");
        let first = RigidBody2D::attach_to(&mut scene, node, BodyDesc::new(BodyType::Dynamic)).unwrap();
        let second = RigidBody2D::attach_to(&mut scene, node, BodyDesc::new(BodyType::Static)).unwrap();

        assert_ne!(first, second);
        assert_eq!(scene.attached_rigid_body(node), Some(first));
        assert_eq!(scene.node(node).unwrap().components(), &[first, second]);

        let first_handle = scene.component::<RigidBody2D>(first).unwrap().handle();
        assert_eq!(scene.node(node).unwrap().attached_body_handle(), Some(first_handle));
    }

    #[test]
    fn test_removing_attached_body_clears_cache() {
        let mut scene = Scene::default();
        let node = scene.create_node("body");
        let body = RigidBody2D::attach_to(&mut scene, node, BodyDesc::new(BodyType::Dynamic)).unwrap();
        assert_eq!(scene.physics().body_count(), 1);

        assert!(scene.remove_component(node, body));
        assert_eq!(scene.attached_rigid_body(node), None);
        assert_eq!(scene.physics().body_count(), 0);
    }

    #[test]
    fn test_scripts_registry() {
        let mut scene = Scene::default();
        let a = scene.attach_script(Health(1));
        let b = scene.attach_script(Armor);

        assert_eq!(scene.script_ids(), &[a, b]);
        assert_eq!(scene.component_owner(a), None);
        assert!(scene.remove_script(a));
        assert!(!scene.remove_script(a));
        assert_eq!(scene.script_count(), 1);
        assert!(scene.component_type_name(b).unwrap().ends_with("Armor"));
    }

    #[test]
    fn test_destroy_node_releases_bodies() {
        let mut scene = Scene::default();
        let parent = scene.create_node("parent");
        let child = scene.create_child(parent, "child");
        RigidBody2D::attach_to(&mut scene, parent, BodyDesc::new(BodyType::Dynamic));
        RigidBody2D::attach_to(&mut scene, child, BodyDesc::new(BodyType::Dynamic));
        assert_eq!(scene.physics().body_count(), 2);

        assert!(scene.destroy_node(parent));
        assert!(!scene.contains(parent));
        assert!(!scene.contains(child));
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.physics().body_count(), 0);
        assert!(!scene.destroy_node(parent));
    }
}
