//! State synchronization systems.
//!
//! Syncs the quiz flow to `SceneStores` for the host page.

use bevy::prelude::*;

use crate::bevy::state_store::SceneStores;
use crate::bevy::systems::quiz_flow::QuizFlow;

/// System to publish the quiz summary.
///
/// Runs every frame; the store only bumps its version on change.
pub fn sync_scene_to_stores(flow: Option<Res<QuizFlow>>, stores: Res<SceneStores>) {
    let summary = flow.map(|f| f.summary()).unwrap_or_default();
    stores.quiz.update(summary);
}
