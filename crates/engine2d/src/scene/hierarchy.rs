//! Parent/child relations
//!
//! Every link change goes through `link` and `unlink`, which keep the
//! child's parent link and the parent's child list in agreement.

use super::{NodeId, Scene, SceneError};

impl Scene {
    /// Move `child` under `parent`, or make it a root with `None`
    ///
    /// The child keeps its local transform and is appended to the end of the
    /// new parent's child list. Reparenting onto the current parent is a
    /// no-op, so a child is never listed twice.
    ///
    /// # Errors
    /// Fails (and logs) if either node is missing, if `child == parent`, or
    /// if `parent` is a descendant of `child`. The hierarchy is unchanged.
    pub fn reparent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let result = self.try_reparent(child, parent);
        if let Err(err) = &result {
            log::error!("Reparent failed: {}", err);
        }
        result
    }

    fn try_reparent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let old_parent = self.nodes.get(child).ok_or(SceneError::NodeNotFound(child))?.parent;
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(SceneError::NodeNotFound(parent));
            }
            if parent == child {
                return Err(SceneError::SelfParent(child));
            }
            if self.is_ancestor(child, parent) {
                return Err(SceneError::CyclicParent { child, parent });
            }
        }
        if old_parent == parent {
            return Ok(());
        }

        self.unlink(child);
        if let Some(parent) = parent {
            self.link(child, parent);
        }
        Ok(())
    }

    /// Append `child` to `parent`. The child must currently be a root.
    fn link(&mut self, child: NodeId, parent: NodeId) {
        if let Some(new) = self.nodes.get_mut(parent) {
            new.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Remove `child` from its parent's list and make it a root
    pub(super) fn unlink(&mut self, child: NodeId) {
        let Some(old_parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(old) = self.nodes.get_mut(old_parent) {
            old.children.retain(|c| *c != child);
        }
    }

    /// Whether `ancestor` appears on the parent chain of `node`
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Append `child` to `parent`'s children
    ///
    /// # Errors
    /// See [`reparent`](Self::reparent).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.reparent(child, Some(parent))
    }

    /// Detach `child` from `parent`; the child becomes a root
    ///
    /// Returns `false` if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.reparent(child, None).is_ok()
    }

    /// Same as [`reparent`](Self::reparent)
    ///
    /// # Errors
    /// See [`reparent`](Self::reparent).
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        self.reparent(child, parent)
    }

    /// Parent of a node; `None` for roots and missing nodes
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Children of a node in insertion order; empty for a missing node
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[][..], |n| n.children())
    }

    /// Nodes without a parent, in creation order
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.node_ids()
            .iter()
            .copied()
            .filter(|id| self.nodes.get(*id).is_some_and(|n| n.parent.is_none()))
            .collect()
    }

    /// Every live node, parents before their children
    ///
    /// Roots are visited in creation order and children in list order.
    #[must_use]
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut stack: Vec<NodeId> = self.roots().into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// First direct child of `parent` with the given name
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|id| self.nodes.get(*id).is_some_and(|n| n.name() == name))
    }

    /// Turn every child of `id` into a root. Returns the detached nodes.
    pub fn detach_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.children(id).to_vec();
        for child in &children {
            self.unlink(*child);
        }
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reparent_moves_between_parents() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");

        scene.add_child(a, c).unwrap();
        scene.reparent(c, Some(b)).unwrap();

        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[c]);
        assert_eq!(scene.parent(c), Some(b));
    }

    #[test]
    fn test_add_child_twice_keeps_one_entry() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_node("b");

        scene.add_child(a, b).unwrap();
        scene.add_child(a, b).unwrap();
        assert_eq!(scene.children(a), &[b]);
    }

    #[test]
    fn test_rejects_self_and_cycles() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        let c = scene.create_child(b, "c");

        assert_eq!(scene.reparent(a, Some(a)), Err(SceneError::SelfParent(a)));
        assert_eq!(
            scene.reparent(a, Some(c)),
            Err(SceneError::CyclicParent { child: a, parent: c })
        );
        assert_eq!(scene.parent(a), None);
        assert!(scene.is_ancestor(a, c));
        assert!(!scene.is_ancestor(c, a));
    }

    #[test]
    fn test_missing_nodes() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let gone = scene.create_node("gone");
        scene.destroy_node(gone);

        assert_eq!(scene.add_child(a, gone), Err(SceneError::NodeNotFound(gone)));
        assert_eq!(scene.add_child(gone, a), Err(SceneError::NodeNotFound(gone)));
        assert!(scene.children(gone).is_empty());
        assert_eq!(scene.find_child(a, "anything"), None);
    }

    #[test]
    fn test_depth_first_lists_parents_first() {
        let mut scene = Scene::default();
        let leaf = scene.create_node("leaf");
        let root = scene.create_node("root");
        let middle = scene.create_child(root, "middle");
        let other = scene.create_node("other");
        scene.add_child(middle, leaf).unwrap();
        let sibling = scene.create_child(root, "sibling");

        assert_eq!(scene.depth_first(), vec![root, middle, leaf, sibling, other]);
    }

    #[test]
    fn test_detach_children() {
        let mut scene = Scene::default();
        let a = scene.create_node("a");
        let b = scene.create_child(a, "b");
        let c = scene.create_child(a, "c");

        assert_eq!(scene.find_child(a, "c"), Some(c));
        assert_eq!(scene.detach_children(a), vec![b, c]);
        assert_eq!(scene.roots(), vec![a, b, c]);
        assert_eq!(scene.parent(b), None);
        assert!(scene.children(a).is_empty());
        assert!(scene.detach_children(a).is_empty());
    }
}
