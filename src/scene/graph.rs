use super::components::{NodeId, NodeKind, SceneNode};
use super::internal::transforms;
use super::light::LightNode;
use super::transform::Transform;
use glam::{Mat4, Vec3};
use hecs::{Component, World};

/// Node arena plus hierarchy. Every node is a hecs entity with a
/// [`SceneNode`] component; kind-specific data sit next to it.
pub struct SceneGraph {
    world: World,
    root: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut world = World::new();
        let mut root = SceneNode::new(NodeKind::Empty, Transform::IDENTITY);
        root.name = "root".to_string();
        let root = NodeId(world.spawn((root,)));
        Self { world, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.world
            .entity(id.0)
            .map(|e| e.has::<SceneNode>())
            .unwrap_or(false)
    }

    /// Live nodes, the root and lights' shadow cameras included.
    pub fn node_count(&self) -> usize {
        self.world.query::<&SceneNode>().iter().count()
    }

    /// Spawns a node under `parent`, or unattached when `parent` is `None`
    /// or gone.
    pub(crate) fn spawn(&mut self, node: SceneNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.world.spawn((node,)));
        if let Some(parent) = parent {
            if !self.add_child(parent, id) {
                log::warn!("Parent {:?} is not in the scene, node {:?} left detached", parent, id);
            }
        }
        id
    }

    pub(crate) fn insert<C: Component>(&mut self, id: NodeId, component: C) {
        if self.world.insert_one(id.0, component).is_err() {
            log::error!("Cannot attach a component to missing node {:?}", id);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<hecs::Ref<'_, SceneNode>> {
        self.world.get::<&SceneNode>(id.0).ok()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.world.query_one_mut::<&mut SceneNode>(id.0).ok()
    }

    pub fn component<C: Component>(&self, id: NodeId) -> Option<hecs::Ref<'_, C>> {
        self.world.get::<&C>(id.0).ok()
    }

    pub fn component_mut<C: Component>(&mut self, id: NodeId) -> Option<&mut C> {
        self.world.query_one_mut::<&mut C>(id.0).ok()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// Whether `ancestor` lies on the parent chain of `id` (or is `id`).
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Moves `child` under `parent`, detaching it from its previous parent
    /// first. Refused for self-attachment, missing nodes, the root and
    /// anything that would close a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || child == self.root {
            return false;
        }
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach {:?} below its own descendant {:?}", child, parent);
            return false;
        }

        self.detach(child);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        true
    }

    /// Detaches `child` from `parent`. The child survives, unattached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let found = match self.node_mut(parent) {
            Some(node) => match node.children.iter().position(|c| *c == child) {
                Some(at) => {
                    node.children.remove(at);
                    true
                }
                None => false,
            },
            None => false,
        };
        if found {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
        found
    }

    /// Detaches every child of `parent`.
    pub fn remove_all(&mut self, parent: NodeId) {
        let children = match self.node_mut(parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            if let Some(node) = self.node_mut(child) {
                node.parent = None;
            }
        }
    }

    pub(crate) fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent(child) {
            self.remove_child(parent, child);
        }
    }

    /// `id` and everything below it, parents before children.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(scene_node) = self.node(node) else {
                continue;
            };
            out.push(node);
            stack.extend(scene_node.children.iter().rev().copied());
        }
        out
    }

    /// Destroys `id`, its subtree and the shadow cameras of any lights in it.
    /// Returns every destroyed node. The root only loses its children.
    pub(crate) fn destroy(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            log::error!("Node {:?} was already removed", id);
            debug_assert!(false, "node {:?} destroyed twice", id);
            return Vec::new();
        }
        if id == self.root {
            return self
                .children(id)
                .into_iter()
                .flat_map(|child| self.destroy(child))
                .collect();
        }

        self.detach(id);
        let mut doomed = self.subtree(id);
        let shadow_cameras: Vec<NodeId> = doomed
            .iter()
            .filter_map(|n| self.component::<LightNode>(*n).map(|l| l.shadow_camera))
            .collect();
        doomed.extend(shadow_cameras);

        for node in &doomed {
            if self.world.despawn(node.0).is_err() {
                log::trace!("Node {:?} was already gone", node);
            }
        }
        log::debug!("Destroyed {} nodes under {:?}", doomed.len(), id);
        doomed
    }

    /// Destroys every node except the root, including detached ones.
    pub(crate) fn destroy_all(&mut self) -> Vec<NodeId> {
        let root = self.root.0;
        let doomed: Vec<NodeId> = self
            .world
            .query::<&SceneNode>()
            .iter()
            .map(|(entity, _)| NodeId(entity))
            .filter(|id| id.0 != root)
            .collect();
        for node in &doomed {
            let _ = self.world.despawn(node.0);
        }
        if let Some(node) = self.node_mut(self.root) {
            node.children.clear();
        }
        doomed
    }

    /// Despawns a single unattached node, used for shadow cameras being
    /// replaced.
    pub(crate) fn despawn_detached(&mut self, id: NodeId) {
        debug_assert!(self.parent(id).is_none());
        if self.world.despawn(id.0).is_err() {
            log::error!("Node {:?} was already removed", id);
        }
    }

    /// Refreshes the absolute transform of `id` alone, from its parent's
    /// current absolute transform.
    pub fn update_absolute_position(&mut self, id: NodeId) {
        transforms::update_absolute(&mut self.world, id.0);
    }

    /// Animate sweep from `id` downwards.
    pub fn animate(&mut self, id: NodeId, time_ms: u32) {
        transforms::animate_subtree(&mut self.world, id.0, time_ms);
    }

    pub fn absolute_transform(&self, id: NodeId) -> Option<Mat4> {
        self.node(id).map(|n| n.absolute)
    }

    pub fn absolute_position(&self, id: NodeId) -> Option<Vec3> {
        self.absolute_transform(id).map(|m| m.w_axis.truncate())
    }

    pub fn relative(&self, id: NodeId) -> Option<Transform> {
        self.node(id).map(|n| n.relative)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        if let Some(node) = self.node_mut(id) {
            node.relative.translation = position;
        }
    }

    /// Rotation in degrees.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Vec3) {
        if let Some(node) = self.node_mut(id) {
            node.relative.rotation = rotation;
        }
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) {
        if let Some(node) = self.node_mut(id) {
            node.relative.scale = scale;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(graph: &mut SceneGraph, parent: Option<NodeId>) -> NodeId {
        graph.spawn(SceneNode::new(NodeKind::Empty, Transform::IDENTITY), parent)
    }

    #[test]
    fn reparenting_is_exclusive() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        let b = empty(&mut graph, Some(root));
        let n = empty(&mut graph, Some(a));

        assert!(graph.add_child(b, n));
        assert_eq!(graph.parent(n), Some(b));
        assert!(!graph.children(a).contains(&n));
        assert_eq!(graph.children(b), vec![n]);

        // repeating the move changes nothing
        assert!(graph.add_child(b, n));
        assert_eq!(graph.children(b), vec![n]);
    }

    #[test]
    fn self_and_cycles_are_refused() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        let b = empty(&mut graph, Some(a));

        assert!(!graph.add_child(a, a));
        assert!(!graph.add_child(b, a));
        assert!(!graph.add_child(a, root));
        assert_eq!(graph.parent(a), Some(root));
        assert_eq!(graph.parent(b), Some(a));
    }

    #[test]
    fn remove_child_detaches_only() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        let b = empty(&mut graph, Some(a));

        assert!(graph.remove_child(a, b));
        assert!(!graph.remove_child(a, b));
        assert!(graph.contains(b));
        assert_eq!(graph.parent(b), None);

        assert!(graph.add_child(root, b));
        assert_eq!(graph.children(root), vec![a, b]);
    }

    #[test]
    fn remove_all_orphans_children() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        let b = empty(&mut graph, Some(root));
        graph.remove_all(root);
        assert!(graph.children(root).is_empty());
        assert_eq!(graph.parent(a), None);
        assert_eq!(graph.parent(b), None);
    }

    #[test]
    fn destroy_takes_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        let b = empty(&mut graph, Some(a));
        let c = empty(&mut graph, Some(b));
        let keep = empty(&mut graph, Some(root));

        let gone = graph.destroy(a);
        assert_eq!(gone, vec![a, b, c]);
        assert!(!graph.contains(a) && !graph.contains(b) && !graph.contains(c));
        assert_eq!(graph.children(root), vec![keep]);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    #[should_panic(expected = "destroyed twice")]
    fn destroying_twice_is_a_bug() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        graph.destroy(a);
        graph.destroy(a);
    }

    #[test]
    fn subtree_is_preorder() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = empty(&mut graph, Some(root));
        let a1 = empty(&mut graph, Some(a));
        let b = empty(&mut graph, Some(root));
        let a2 = empty(&mut graph, Some(a));
        assert_eq!(graph.subtree(root), vec![root, a, a1, a2, b]);
    }

    #[test]
    fn absolute_follows_parent_after_sweep() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = empty(&mut graph, Some(root));
        let child = empty(&mut graph, Some(parent));
        graph.set_position(parent, Vec3::new(0.0, 3.0, 0.0));
        graph.set_rotation(parent, Vec3::new(0.0, 0.0, 90.0));
        graph.set_position(child, Vec3::new(1.0, 0.0, 0.0));

        graph.animate(root, 0);

        let parent_abs = graph.absolute_transform(parent).unwrap();
        let child_rel = graph.relative(child).unwrap().matrix();
        assert!(graph
            .absolute_transform(child)
            .unwrap()
            .abs_diff_eq(parent_abs * child_rel, 1e-6));
        assert!(graph
            .absolute_position(child)
            .unwrap()
            .abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), 1e-5));
    }
}
