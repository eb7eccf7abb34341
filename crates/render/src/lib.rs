//! Render interfaces: the renderer contract and the frame loop.
//!
//! # Invariants
//! - `FrameLoop::tick` performs exactly one draw per call.
//! - Renderers read scene and camera; they never mutate them.

mod frame;
mod renderer;

pub use frame::{FrameLoop, FrameStats};
pub use renderer::{DebugTextRenderer, Renderer};
