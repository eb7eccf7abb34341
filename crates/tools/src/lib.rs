//! Developer tooling: live debug panel and scene inspector.
//!
//! # Invariants
//! - The panel binds through [`TunableSource`] only; it never reaches into
//!   scene internals.
//! - Slider edits land in place, visible to the next frame with no apply
//!   step.

pub mod bindings;
pub mod inspector;
pub mod panel;

pub use bindings::{Tunable, TunableGroup, TunableSource};
pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use panel::DebugPanel;
