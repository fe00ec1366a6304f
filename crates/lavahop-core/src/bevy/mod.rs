//! Bevy-based scene engine for lavahop.
//!
//! Holds the lava scene as ECS entities and resources, animates it through a
//! world-driven task scheduler, and runs the built-in quiz on top of the
//! scene bridge. Everything except `systems::rendering` and `wasm_entry`
//! runs headless.

pub mod animation;
pub mod bridge;
pub mod components;
pub mod picking;
pub mod plugin;
pub mod resources;
pub mod scene_graph;
pub mod state_store;
pub mod systems;
pub mod victory;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(all(target_arch = "wasm32", feature = "windowed"))]
pub mod wasm_entry;

#[cfg(all(target_arch = "wasm32", feature = "windowed"))]
pub use wasm_entry::*;

pub use animation::{AnimationScheduler, AnimationTask, TaskKind};
pub use bridge::{
    on_correct, on_option_selected, on_question_started, on_victory, on_victory_end, on_wrong,
    spawn_confetti_burst,
};
pub use components::*;
pub use picking::{PickRay, PlatformFootprint, pick_platform};
pub use plugin::{LavahopHeadlessPlugin, LavahopUnifiedPlugin};
pub use resources::*;
pub use scene_graph::{dispose, spawn_scene};
pub use state_store::{
    AudioCue, Feedback, NoticeStore, QuizStore, QuizSummary, SceneNotice, SceneStores,
};
pub use systems::quiz_flow::{FlowError, QuizFlow};
