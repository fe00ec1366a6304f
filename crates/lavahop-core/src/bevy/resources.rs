//! ECS Resources for the lava scene.
//!
//! These resources hold shared scene state and configuration.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::quiz::{QuizMode, WordEntry};

/// Scene configuration resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneSettings(pub SceneConfig);

impl SceneSettings {
    pub fn new(config: SceneConfig) -> Self {
        Self(config)
    }
}

/// Deterministic RNG resource.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Entities of the live scene session.
///
/// Replaced wholesale by `spawn_scene`; once disposed it is never reused.
#[derive(Resource, Debug, Clone)]
pub struct SceneHandles {
    pub platforms: Vec<Entity>,
    pub labels: Vec<Entity>,
    pub character: Entity,
    pub ground: Entity,
    pub camera: Entity,
    pub embers: Vec<Entity>,
    disposed: bool,
}

impl SceneHandles {
    pub fn new(
        platforms: Vec<Entity>,
        labels: Vec<Entity>,
        character: Entity,
        ground: Entity,
        camera: Entity,
        embers: Vec<Entity>,
    ) -> Self {
        Self {
            platforms,
            labels,
            character,
            ground,
            camera,
            embers,
            disposed: false,
        }
    }

    pub fn platform(&self, index: usize) -> Result<Entity, SceneError> {
        self.platforms
            .get(index)
            .copied()
            .ok_or(SceneError::InvalidPlatform {
                index,
                count: self.platforms.len(),
            })
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }

    /// Every entity the handles refer to.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.platforms
            .iter()
            .chain(self.labels.iter())
            .chain(self.embers.iter())
            .copied()
            .chain([self.character, self.ground, self.camera])
    }
}

/// Run condition: a scene exists and has not been disposed.
pub fn scene_is_live(handles: Option<Res<SceneHandles>>) -> bool {
    handles.is_some_and(|h| !h.is_disposed())
}

/// Handles of the live scene, or why there is none.
pub fn live_handles(world: &World) -> Result<&SceneHandles, SceneError> {
    let handles = world
        .get_resource::<SceneHandles>()
        .ok_or(SceneError::NotSpawned)?;
    if handles.is_disposed() {
        return Err(SceneError::Disposed);
    }
    Ok(handles)
}

/// Current scene configuration, defaults when none is installed.
pub fn scene_config(world: &World) -> SceneConfig {
    world
        .get_resource::<SceneSettings>()
        .map(|s| s.0.clone())
        .unwrap_or_default()
}

/// Canvas size in pixels, kept across scene rebuilds.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize(pub Vec2);

impl Default for ViewportSize {
    fn default() -> Self {
        Self(Vec2::new(1280.0, 720.0))
    }
}

/// Logical resting position of the character.
///
/// Only task completion and explicit resets write here; the animated
/// transform may be anywhere in between.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CharacterRest {
    pub home: Vec3,
    pub resting: Vec3,
}

impl CharacterRest {
    pub fn at_home(home: Vec3) -> Self {
        Self {
            home,
            resting: home,
        }
    }

    pub fn set(&mut self, resting: Vec3) {
        self.resting = resting;
    }

    pub fn send_home(&mut self) {
        self.resting = self.home;
    }
}

/// Platform currently under the pointer.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct HoverState {
    pub hovered: Option<usize>,
    /// Color the hovered platform had before the hover tint.
    pub restore: Option<Color>,
}

/// Scene time used by continuous motion, advanced once per frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SceneClock {
    pub elapsed: f32,
}

/// Celebration state.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct VictoryMode {
    pub active: bool,
    /// Seconds since victory mode was enabled.
    pub elapsed: f32,
    /// Confetti bursts fired since victory mode was enabled.
    pub bursts_triggered: u64,
}

impl VictoryMode {
    pub fn enable(&mut self) {
        *self = Self {
            active: true,
            elapsed: 0.0,
            bursts_triggered: 0,
        };
    }

    pub fn disable(&mut self) {
        self.active = false;
    }
}

/// Commands that can be sent from JavaScript to the Bevy app.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneCommand {
    /// Build a fresh scene and start a quiz over the given words.
    StartSession {
        words: Vec<WordEntry>,
        #[serde(default)]
        mode: QuizMode,
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Build a fresh scene without the built-in quiz; the host drives events.
    StartScene,
    /// Tear the scene down.
    EndSession,
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    /// Pick an option without pointer picking (answer cards).
    SelectOption { index: usize },
    Resize { width: f32, height: f32 },

    // ========== Raw bridge events ==========
    Correct { index: usize },
    Wrong { index: usize },
    Victory,
    VictoryEnd,
    QuestionStarted { index: usize },
}

/// Thread-safe command queue for WASM interop.
///
/// This allows JavaScript to push commands that will be processed
/// by Bevy systems on the next frame.
#[derive(Resource, Clone, Default)]
pub struct SceneCommandQueue {
    inner: Arc<Mutex<VecDeque<SceneCommand>>>,
}

impl SceneCommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SceneCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands.
    pub fn drain(&self) -> Vec<SceneCommand> {
        self.inner.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
