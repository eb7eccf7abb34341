use grove_scene::{Camera, NodeKind, Scene};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera, then produces output. It never
/// mutates either; all mutation happens between frames in the event layer.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the given scene from the given camera.
    fn render(&self, scene: &Scene, camera: &Camera) -> Self::Output;
}

/// Text renderer producing a human-readable dump of the scene.
///
/// Useful for logging and for testing the render interface without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &Camera) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Scene (nodes={}) ===\n", scene.object_count()));
        out.push_str(&format!(
            "Camera: pos=({:.1}, {:.1}, {:.1}) yaw={:.1} pitch={:.1}\n",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.yaw.to_degrees(),
            camera.pitch.to_degrees()
        ));
        out.push_str(&format!(
            "Sun: pos=({:.0}, {:.0}, {:.0}) intensity={:.2}\n",
            scene.sun.position.x, scene.sun.position.y, scene.sun.position.z, scene.sun.intensity
        ));
        out.push_str(&format!("Ambient: intensity={:.2}\n", scene.ambient.intensity));

        for (id, node) in scene.graph.iter() {
            let kind = match node.kind {
                NodeKind::Group => "group",
                NodeKind::Mesh(_) => "mesh",
                NodeKind::Helper(_) => "helper",
            };
            let p = node.transform.position;
            out.push_str(&format!(
                "  [{}] {} ({kind}) pos=({:.2}, {:.2}, {:.2})\n",
                id.0, node.name, p.x, p.y, p.z
            ));
        }

        out
    }
}
