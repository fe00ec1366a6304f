//! Command processing system.
//!
//! Processes commands from the JavaScript/WASM interface.

use bevy::prelude::*;

use crate::bevy::animation::AnimationScheduler;
use crate::bevy::bridge::{
    on_correct, on_option_selected, on_question_started, on_victory, on_victory_end, on_wrong,
};
use crate::bevy::picking::{clear_hover, hover_platform, on_resize, pick_from_pointer};
use crate::bevy::resources::{SceneCommand, SceneCommandQueue, scene_config};
use crate::bevy::scene_graph::{dispose, spawn_scene};
use crate::bevy::state_store::{SceneNotice, notify};
use crate::bevy::systems::quiz_flow::{FlowError, QuizFlow, select_option, start_quiz, stop_quiz};
use crate::error::SceneError;

/// System to process all commands from the external command queue.
pub fn process_scene_commands(world: &mut World) {
    let Some(queue) = world.get_resource::<SceneCommandQueue>().cloned() else {
        return;
    };
    for command in queue.drain() {
        apply_scene_command(world, command);
    }
}

/// Applies one command. Failures are logged and the command is dropped.
pub fn apply_scene_command(world: &mut World, command: SceneCommand) {
    let result: Result<(), FlowError> = match command {
        SceneCommand::StartSession { words, mode, seed } => {
            tracing::info!("[command] StartSession ({} words)", words.len());
            stop_quiz(world);
            let config = scene_config(world);
            spawn_scene(world, &config);
            start_quiz(world, words, mode, seed.unwrap_or_else(fresh_session_seed))
        }
        SceneCommand::StartScene => {
            tracing::info!("[command] StartScene");
            stop_quiz(world);
            let config = scene_config(world);
            spawn_scene(world, &config);
            on_question_started(world, 0).map_err(FlowError::from)
        }
        SceneCommand::EndSession => {
            tracing::info!("[command] EndSession");
            stop_quiz(world);
            dispose(world).map_err(FlowError::from)
        }
        SceneCommand::PointerDown { x, y } => match pick_from_pointer(world, Vec2::new(x, y)) {
            Some(index) => select(world, index),
            None => Ok(()),
        },
        SceneCommand::PointerMove { x, y } => hover_platform(world, Vec2::new(x, y))
            .map(|_| ())
            .map_err(FlowError::from),
        SceneCommand::PointerLeave => clear_hover(world).map_err(FlowError::from),
        SceneCommand::SelectOption { index } => select(world, index),
        SceneCommand::Resize { width, height } => {
            on_resize(world, width, height);
            Ok(())
        }
        SceneCommand::Correct { index } => on_correct(world, index).map_err(FlowError::from),
        SceneCommand::Wrong { index } => on_wrong(world, index).map_err(FlowError::from),
        SceneCommand::Victory => on_victory(world).map_err(FlowError::from),
        SceneCommand::VictoryEnd => on_victory_end(world).map_err(FlowError::from),
        SceneCommand::QuestionStarted { index } => {
            on_question_started(world, index).map_err(FlowError::from)
        }
    };

    if let Err(e) = result {
        match e {
            FlowError::Scene(SceneError::Disposed | SceneError::NotSpawned) => {
                tracing::debug!("[command] Ignored without a live scene: {e}");
            }
            _ => tracing::warn!("[command] {e}"),
        }
    }
}

/// Routes a selection to the quiz, or straight to the scene when the host
/// runs its own game logic.
fn select(world: &mut World, index: usize) -> Result<(), FlowError> {
    if world.get_resource::<QuizFlow>().is_some_and(QuizFlow::is_running) {
        return select_option(world, index);
    }
    let busy = world
        .get_resource::<AnimationScheduler>()
        .is_some_and(AnimationScheduler::has_character_motion);
    if busy {
        tracing::debug!("[command] Selection of {index} ignored while the character moves");
        return Ok(());
    }
    on_option_selected(world, index, |world, index| {
        notify(world, SceneNotice::OptionChosen { index });
    })?;
    Ok(())
}

/// Seed for sessions started without one: a new word order every time.
fn fresh_session_seed() -> u64 {
    use rand::Rng;

    rand::rng().random()
}
