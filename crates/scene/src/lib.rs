//! Scene model: node graph, camera, and lighting for the walkthrough.
//!
//! # Invariants
//! - Node cardinality is fixed after assembly; only leaf scalar properties
//!   (transforms, light parameters) change at runtime.
//! - `SceneGraph` iterates in deterministic `NodeId` order on all platforms.

pub mod camera;
pub mod graph;
pub mod light;

pub use camera::Camera;
pub use graph::{Helper, MeshInstance, Node, NodeKind, SceneError, SceneGraph};
pub use light::{AmbientLight, ShadowSettings, SunLight};

use grove_common::Color;

/// A complete renderable scene: the node graph plus its lights and clear
/// color. The camera lives outside so input handling and GUI bindings can
/// borrow them independently.
#[derive(Debug, Default)]
pub struct Scene {
    pub graph: SceneGraph,
    pub sun: SunLight,
    pub ambient: AmbientLight,
    pub background: Color,
}

impl Scene {
    /// Number of nodes in the graph. Constant after assembly.
    pub fn object_count(&self) -> usize {
        self.graph.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_common::Transform;

    #[test]
    fn object_count_tracks_graph() {
        let mut scene = Scene::default();
        assert_eq!(scene.object_count(), 0);
        scene
            .graph
            .add_root("floor", Transform::default(), NodeKind::Group);
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn property_edits_leave_cardinality_fixed() {
        let mut scene = Scene::default();
        let id = scene
            .graph
            .add_root("tree", Transform::default(), NodeKind::Group);
        let before = scene.object_count();

        scene.sun.intensity = 0.4;
        scene.ambient.intensity = 0.7;
        if let Some(node) = scene.graph.node_mut(id) {
            node.transform.position.x = 12.0;
        }

        assert_eq!(scene.object_count(), before);
    }
}
