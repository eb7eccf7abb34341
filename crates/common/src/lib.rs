//! Shared vocabulary types used across the grove workspace.

pub mod types;

pub use types::{Color, MaterialHandle, MeshHandle, NodeId, Transform};
