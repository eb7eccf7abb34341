//! Procedural assets: primitive meshes, the toon shading ramp, and the
//! handle registry the renderer consumes.
//!
//! The renderer consumes assets by handle, never by raw file paths. The
//! only file input is the optional gradient ramp image.

pub mod library;
pub mod mesh;
pub mod primitives;
pub mod ramp;

pub use library::{AssetLibrary, MeshAsset, ToonMaterial};
pub use mesh::MeshData;
pub use ramp::GradientRamp;

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
