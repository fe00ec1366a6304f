//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `LavahopHeadlessPlugin` for testing scene logic
//! without a rendering or windowing backend.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::bevy::plugin::LavahopHeadlessPlugin;
use crate::bevy::resources::{SceneCommand, SceneCommandQueue};
use crate::quiz::WordEntry;

/// Frame length used by every `TestApp` update.
pub(crate) const TEST_DT: f32 = 0.05;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a new test app with default seed.
    pub fn new() -> Self {
        Self::with_seed(12345)
    }

    /// Create a new test app with a specific RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(LavahopHeadlessPlugin {
            seed,
            ..LavahopHeadlessPlugin::default()
        });
        // Every update advances time by exactly one test frame.
        app.insert_resource(TimeUpdateStrategy::ManualDuration(
            Duration::from_secs_f32(TEST_DT),
        ));
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Runs enough frames to cover `seconds`.
    pub fn advance_seconds(&mut self, seconds: f32) {
        let frames = (seconds / TEST_DT).ceil() as usize;
        for _ in 0..frames {
            self.app.update();
        }
    }

    /// Push a command to the command queue.
    pub fn push_command(&mut self, command: SceneCommand) {
        self.app.world().resource::<SceneCommandQueue>().push(command);
    }

    /// Word list with `count` distinct entries.
    pub fn words(count: usize) -> Vec<WordEntry> {
        (0..count)
            .map(|i| WordEntry::new(format!("word{i}"), format!("meaning{i}")))
            .collect()
    }

    /// Get a reference to the World.
    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Get a mutable reference to the World.
    #[allow(dead_code)]
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
