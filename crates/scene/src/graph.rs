use glam::Mat4;
use grove_common::{MaterialHandle, MeshHandle, NodeId, Transform};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("parent node {0:?} not found")]
    ParentNotFound(NodeId),
}

/// A renderable mesh reference with its shadow participation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshInstance {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// Debug geometry drawn as lines, outside the lit passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Helper {
    /// World-axes gizmo with the given arm length.
    Axes { size: f32 },
    /// Wireframe of the sun's shadow projection volume.
    ShadowFrustum,
}

/// What a node contributes to the rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Empty grouping node; contributes only its transform.
    Group,
    Mesh(MeshInstance),
    Helper(Helper),
}

/// One node in the scene graph.
///
/// `name`, `transform`, and `kind` are freely mutable; parent and child
/// links are managed by [`SceneGraph`] so the hierarchy stays consistent.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The scene hierarchy.
///
/// Uses BTreeMap for deterministic iteration order across all platforms;
/// node ids are issued sequentially and never reused.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all parentless nodes, in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Add a node without a parent. Returns its id.
    pub fn add_root(&mut self, name: &str, transform: Transform, kind: NodeKind) -> NodeId {
        let id = self.alloc();
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                transform,
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        self.roots.push(id);
        id
    }

    /// Add a node under `parent`. Fails if the parent does not exist.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: &str,
        transform: Transform,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::ParentNotFound(parent));
        }
        let id = self.alloc();
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                transform,
                kind,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Composes local transforms up the parent chain into a world matrix.
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_transform(parent).map(|m| m * local),
            None => Some(local),
        }
    }

    /// All nodes in deterministic id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn leaf() -> NodeKind {
        NodeKind::Group
    }

    #[test]
    fn graph_starts_empty() {
        let g = SceneGraph::new();
        assert_eq!(g.len(), 0);
        assert!(g.is_empty());
        assert!(g.roots().is_empty());
    }

    #[test]
    fn add_root_and_child_link_up() {
        let mut g = SceneGraph::new();
        let tree = g.add_root("tree", Transform::default(), leaf());
        let stem = g.add_child(tree, "stem", Transform::default(), leaf()).unwrap();

        assert_eq!(g.len(), 2);
        assert_eq!(g.roots(), &[tree]);
        assert_eq!(g.node(stem).unwrap().parent(), Some(tree));
        assert_eq!(g.node(tree).unwrap().children(), &[stem]);
    }

    #[test]
    fn missing_parent_is_an_error() {
        let mut g = SceneGraph::new();
        let err = g.add_child(NodeId(99), "orphan", Transform::default(), leaf());
        assert!(matches!(err, Err(SceneError::ParentNotFound(NodeId(99)))));
        assert!(g.is_empty());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut g = SceneGraph::new();
        let a = g.add_root("a", Transform::default(), leaf());
        let b = g.add_root("b", Transform::default(), leaf());
        assert_ne!(a, b);
    }

    #[test]
    fn world_transform_composes_down_the_chain() {
        let mut g = SceneGraph::new();
        let tree = g.add_root(
            "tree",
            Transform::from_position(Vec3::new(3.0, 0.0, -3.0)),
            leaf(),
        );
        let foliage = g
            .add_child(
                tree,
                "foliage",
                Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
                leaf(),
            )
            .unwrap();

        let world = g.world_transform(foliage).unwrap();
        let p = world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(3.0, 10.0, -3.0)).length() < 1e-5);
    }

    #[test]
    fn world_transform_of_missing_node_is_none() {
        let g = SceneGraph::new();
        assert!(g.world_transform(NodeId(0)).is_none());
    }

    #[test]
    fn node_mut_edits_are_visible() {
        let mut g = SceneGraph::new();
        let id = g.add_root("sun-proxy", Transform::default(), leaf());
        g.node_mut(id).unwrap().transform.position.y = 42.0;
        assert_eq!(g.node(id).unwrap().transform.position.y, 42.0);
    }

    #[test]
    fn iteration_order_is_deterministic() {
        let mut g = SceneGraph::new();
        for i in 0..16 {
            g.add_root(&format!("n{i}"), Transform::default(), leaf());
        }
        let ids: Vec<NodeId> = g.iter().map(|(id, _)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
