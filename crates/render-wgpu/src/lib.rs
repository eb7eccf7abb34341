//! wgpu render backend for the grove viewer.
//!
//! Draws the scene graph in two passes: a depth-only pass into the sun's
//! shadow map, then a color pass with toon-shaded meshes, inverted-hull
//! outlines, and helper lines.
//!
//! # Invariants
//! - Rendering never mutates the scene.
//! - One command submission per frame.
//! - Meshes, materials, and the gradient ramp are uploaded once at startup;
//!   only uniforms, instances, and helper lines are rewritten per frame.

mod gpu;
mod helpers;
mod shaders;
mod shadow;

pub use gpu::WgpuRenderer;
