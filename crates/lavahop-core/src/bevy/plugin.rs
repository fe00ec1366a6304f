//! Bevy plugins for the lava scene.
//!
//! Provides:
//! - `LavahopHeadlessPlugin`: Logic-only plugin (no rendering/window dependencies) for headless testing
//! - `LavahopUnifiedPlugin`: Full plugin including `LavahopHeadlessPlugin` + rendering systems

use bevy::prelude::*;

use crate::bevy::animation::AnimationScheduler;
use crate::bevy::components::hex_color;
use crate::bevy::resources::*;
use crate::bevy::state_store::SceneStores;
use crate::bevy::systems;
use crate::config::SceneConfig;

// ============================================================================
// Headless Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Headless plugin containing all scene logic without rendering or window dependencies.
///
/// Use this plugin in tests with `MinimalPlugins` to run ECS systems
/// without requiring a windowing or rendering backend.
///
/// Excluded systems (rendering-dependent):
/// - Gizmos-based rendering (render_scene)
/// - Camera3d spawning and projection sync (setup_render_camera, sync_render_camera)
pub struct LavahopHeadlessPlugin {
    pub seed: u64,
    pub config: SceneConfig,
    pub command_queue: Option<SceneCommandQueue>,
    pub state_stores: Option<SceneStores>,
}

impl Default for LavahopHeadlessPlugin {
    fn default() -> Self {
        Self {
            seed: 12345,
            config: SceneConfig::default(),
            command_queue: None,
            state_stores: None,
        }
    }
}

impl Plugin for LavahopHeadlessPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // Resources (all registered upfront, systems gated by run_if)
        // ====================================================================
        app.insert_resource(SceneSettings::new(self.config.clone()))
            .insert_resource(DeterministicRng::new(self.seed))
            .insert_resource(AnimationScheduler::default())
            .insert_resource(systems::QuizFlow::default())
            .insert_resource(ViewportSize::default())
            .insert_resource(SceneClock::default())
            .insert_resource(VictoryMode::default())
            .insert_resource(HoverState::default())
            .insert_resource(self.command_queue.clone().unwrap_or_default())
            .insert_resource(self.state_stores.clone().unwrap_or_default());

        // ====================================================================
        // Frame order: commands, animations, continuous motion, quiz steps
        // ====================================================================
        app.add_systems(
            Update,
            (
                systems::process_scene_commands,
                (
                    systems::advance_animations,
                    systems::animate_continuous_motion,
                    systems::advance_quiz_flow,
                )
                    .chain()
                    .run_if(scene_is_live),
            )
                .chain(),
        );

        // WASM exit system
        #[cfg(all(target_arch = "wasm32", feature = "windowed"))]
        app.add_systems(Update, crate::bevy::wasm_entry::check_exit_system);

        // State sync (always active)
        app.add_systems(PostUpdate, systems::sync_scene_to_stores);
    }
}

// ============================================================================
// Unified Plugin (headless + rendering)
// ============================================================================

/// Unified plugin for the browser build.
///
/// Includes `LavahopHeadlessPlugin` for all scene logic, plus rendering systems
/// that require `Gizmos`, `Projection`, and `Camera3d`.
pub struct LavahopUnifiedPlugin {
    pub seed: u64,
    pub config: SceneConfig,
    pub command_queue: Option<SceneCommandQueue>,
    pub state_stores: Option<SceneStores>,
}

impl Default for LavahopUnifiedPlugin {
    fn default() -> Self {
        Self {
            seed: 12345,
            config: SceneConfig::default(),
            command_queue: None,
            state_stores: None,
        }
    }
}

impl LavahopUnifiedPlugin {
    pub fn new(command_queue: SceneCommandQueue, state_stores: SceneStores) -> Self {
        Self {
            command_queue: Some(command_queue),
            state_stores: Some(state_stores),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }
}

impl Plugin for LavahopUnifiedPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(LavahopHeadlessPlugin {
            seed: self.seed,
            config: self.config.clone(),
            command_queue: self.command_queue.clone(),
            state_stores: self.state_stores.clone(),
        });

        app.insert_resource(ClearColor(hex_color(self.config.palette.background)));
        app.add_systems(Startup, systems::setup_render_camera);

        app.add_systems(
            Update,
            (systems::sync_render_camera, systems::render_scene)
                .chain()
                .after(systems::advance_quiz_flow)
                .run_if(scene_is_live),
        );
    }
}
