//! Systems for the lava scene.
//!
//! Organized by functionality:
//! - command: Command queue processing from WASM
//! - frame: Animation, continuous motion and quiz flow ticks
//! - quiz_flow: Built-in quiz driven through the scene bridge
//! - rendering: Gizmo rendering and render camera sync
//! - state_sync: Sync quiz state to shared stores for the page

pub mod command;
pub mod frame;
pub mod quiz_flow;
pub mod rendering;
pub mod state_sync;

pub use command::*;
pub use frame::*;
pub use quiz_flow::*;
pub use rendering::*;
pub use state_sync::*;
