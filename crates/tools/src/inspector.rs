use grove_common::NodeId;
use grove_scene::{NodeKind, Scene};

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene for logging and
/// development UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut meshes = 0;
        let mut helpers = 0;
        let mut groups = 0;
        let mut shadow_casters = 0;
        for (_, node) in scene.graph.iter() {
            match node.kind {
                NodeKind::Group => groups += 1,
                NodeKind::Mesh(instance) => {
                    meshes += 1;
                    if instance.cast_shadow {
                        shadow_casters += 1;
                    }
                }
                NodeKind::Helper(_) => helpers += 1,
            }
        }
        SceneSummary {
            nodes: scene.object_count(),
            meshes,
            helpers,
            groups,
            shadow_casters,
            sun_intensity: scene.sun.intensity,
            ambient_intensity: scene.ambient.intensity,
        }
    }

    /// Inspect a single node, resolving its world position.
    pub fn inspect_node(scene: &Scene, id: NodeId) -> Option<NodeInfo> {
        let node = scene.graph.node(id)?;
        let world = scene.graph.world_transform(id)?;
        let wp = world.transform_point3(glam::Vec3::ZERO);
        let p = node.transform.position;
        Some(NodeInfo {
            id,
            name: node.name.clone(),
            kind: match node.kind {
                NodeKind::Group => "group",
                NodeKind::Mesh(_) => "mesh",
                NodeKind::Helper(_) => "helper",
            },
            position: [p.x, p.y, p.z],
            world_position: [wp.x, wp.y, wp.z],
        })
    }

    /// List all node ids in the scene.
    pub fn list_nodes(scene: &Scene) -> Vec<NodeId> {
        scene.graph.iter().map(|(id, _)| id).collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub helpers: usize,
    pub groups: usize,
    pub shadow_casters: usize,
    pub sun_intensity: f32,
    pub ambient_intensity: f32,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} helpers={} groups={} casters={} sun={:.2} ambient={:.2}",
            self.nodes,
            self.meshes,
            self.helpers,
            self.groups,
            self.shadow_casters,
            self.sun_intensity,
            self.ambient_intensity
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub world_position: [f32; 3],
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] {} ({}) pos=({:.2}, {:.2}, {:.2}) world=({:.2}, {:.2}, {:.2})",
            self.id.0,
            self.name,
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.world_position[0],
            self.world_position[1],
            self.world_position[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use grove_common::Transform;

    fn scene_with_tree() -> (Scene, NodeId) {
        let mut scene = Scene::default();
        let tree = scene.graph.add_root(
            "tree",
            Transform::from_position(Vec3::new(3.0, 0.0, -3.0)),
            NodeKind::Group,
        );
        scene
            .graph
            .add_child(
                tree,
                "foliage",
                Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
                NodeKind::Group,
            )
            .unwrap();
        (scene, tree)
    }

    #[test]
    fn summary_empty_scene() {
        let scene = Scene::default();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.nodes, 0);
        assert_eq!(summary.meshes, 0);
        assert_eq!(summary.sun_intensity, 1.0);
    }

    #[test]
    fn summary_counts_kinds() {
        let (scene, _) = scene_with_tree();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.meshes, 0);
    }

    #[test]
    fn inspect_node_resolves_world_position() {
        let (scene, tree) = scene_with_tree();
        let child = scene.graph.node(tree).unwrap().children()[0];
        let info = SceneInspector::inspect_node(&scene, child).unwrap();
        assert_eq!(info.name, "foliage");
        assert_eq!(info.position, [0.0, 10.0, 0.0]);
        assert_eq!(info.world_position, [3.0, 10.0, -3.0]);
    }

    #[test]
    fn inspect_node_not_found() {
        let scene = Scene::default();
        assert!(SceneInspector::inspect_node(&scene, NodeId(7)).is_none());
    }

    #[test]
    fn list_nodes_returns_all() {
        let (scene, _) = scene_with_tree();
        assert_eq!(SceneInspector::list_nodes(&scene).len(), 2);
    }

    #[test]
    fn summary_display() {
        let (scene, _) = scene_with_tree();
        let s = format!("{}", SceneInspector::summary(&scene));
        assert!(s.contains("nodes=2"));
        assert!(s.contains("sun=1.00"));
    }
}
