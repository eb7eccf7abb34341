//! Input mapping: raw key and mouse events become walkthrough commands.
//!
//! # Invariants
//! - Movement commands are applied immediately, never queued.
//! - Unmapped keys produce no command and no state change.

pub mod command;
pub mod controller;
pub mod keymap;

pub use command::MoveCommand;
pub use controller::WalkController;
pub use keymap::Keymap;
