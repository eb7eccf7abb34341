use crate::MeshData;
use grove_common::{Color, MaterialHandle, MeshHandle};
use std::collections::BTreeMap;

/// A mesh registered in the library.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub name: String,
    pub data: MeshData,
}

/// Toon material: flat base color plus silhouette outline width.
#[derive(Debug, Clone, PartialEq)]
pub struct ToonMaterial {
    pub name: String,
    pub color: Color,
    /// Outline thickness as a fraction of screen height. Zero disables the
    /// outline for this material.
    pub outline_width: f32,
}

impl Default for ToonMaterial {
    fn default() -> Self {
        Self {
            name: "default".into(),
            color: Color {
                r: 0.8,
                g: 0.8,
                b: 0.8,
                a: 1.0,
            },
            outline_width: 0.003,
        }
    }
}

/// Handle-issuing registry for meshes and materials.
///
/// Handles are sequential and stable for the program's lifetime; the GPU
/// layer uploads every registered mesh once at startup and resolves
/// instances by handle each frame.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    meshes: BTreeMap<MeshHandle, MeshAsset>,
    materials: BTreeMap<MaterialHandle, ToonMaterial>,
    next_mesh: u64,
    next_material: u64,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its handle.
    pub fn add_mesh(&mut self, name: &str, data: MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        tracing::debug!(
            name,
            vertices = data.vertex_count(),
            triangles = data.triangle_count(),
            "registered mesh"
        );
        self.meshes.insert(
            handle,
            MeshAsset {
                name: name.to_string(),
                data,
            },
        );
        handle
    }

    /// Register a material and return its handle.
    pub fn add_material(&mut self, material: ToonMaterial) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material);
        self.next_material += 1;
        self.materials.insert(handle, material);
        handle
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshAsset> {
        self.meshes.get(&handle)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&ToonMaterial> {
        self.materials.get(&handle)
    }

    /// All meshes in handle order.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &MeshAsset)> {
        self.meshes.iter().map(|(h, m)| (*h, m))
    }

    /// All materials in handle order.
    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &ToonMaterial)> {
        self.materials.iter().map(|(h, m)| (*h, m))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
