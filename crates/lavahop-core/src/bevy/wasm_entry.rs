//! WASM entry points for the lava scene.
//!
//! Provides JavaScript-callable functions to start the scene, feed it
//! pointer and quiz commands, and poll its state.

use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use bevy::winit::{UpdateMode, WinitSettings};
use parking_lot::Mutex;
use wasm_bindgen::prelude::*;

use crate::bevy::plugin::LavahopUnifiedPlugin;
use crate::bevy::resources::{SceneCommand, SceneCommandQueue};
use crate::bevy::state_store::SceneStores;
use crate::config::SceneConfig;
use crate::quiz::{QuizMode, WordEntry};

// ============================================================================
// Global State
// ============================================================================

/// Atomic flag for signaling app shutdown (checked every frame by Bevy system).
static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);

/// Atomic flag indicating whether the Bevy App has been started.
/// In WASM, the EventLoop can only be created once.
static BEVY_APP_STARTED: AtomicBool = AtomicBool::new(false);

static TRACING_READY: AtomicBool = AtomicBool::new(false);

/// Global state that can be reset on page reload.
struct GlobalState {
    command_queue: SceneCommandQueue,
    state_stores: SceneStores,
}

impl GlobalState {
    fn new() -> Self {
        Self {
            command_queue: SceneCommandQueue::new(),
            state_stores: SceneStores::new(),
        }
    }
}

static GLOBAL_STATE: Mutex<Option<GlobalState>> = Mutex::new(None);

fn command_queue() -> SceneCommandQueue {
    GLOBAL_STATE
        .lock()
        .get_or_insert_with(GlobalState::new)
        .command_queue
        .clone()
}

fn state_stores() -> SceneStores {
    GLOBAL_STATE
        .lock()
        .get_or_insert_with(GlobalState::new)
        .state_stores
        .clone()
}

fn is_shutdown_requested() -> bool {
    SHOULD_EXIT.load(Ordering::SeqCst)
}

fn push(command: SceneCommand) -> Result<(), JsValue> {
    if is_shutdown_requested() {
        return Err(JsValue::from_str("Bevy app is shutting down"));
    }
    command_queue().push(command);
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, Layer};
    use tracing_web::MakeWebConsoleWriter;

    if TRACING_READY.swap(true, Ordering::SeqCst) {
        return;
    }
    let filter = EnvFilter::new("info,wgpu=error,naga=warn");
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new())
        .with_filter(filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Request Bevy app to exit. Called before page unload.
#[wasm_bindgen]
pub fn request_lavahop_exit() {
    tracing::info!("[scene] exit requested");
    SHOULD_EXIT.store(true, Ordering::SeqCst);
}

/// Reset global state. Called after app exits or before page unload.
#[wasm_bindgen]
pub fn reset_lavahop_state() {
    tracing::info!("[scene] clearing global state");
    SHOULD_EXIT.store(true, Ordering::SeqCst);
    let mut guard = GLOBAL_STATE.lock();
    if let Some(state) = guard.as_ref() {
        state.command_queue.clear();
    }
    *guard = None;
    SHOULD_EXIT.store(false, Ordering::SeqCst);
}

/// Bevy system that checks if exit was requested and sends AppExit.
pub fn check_exit_system(mut exit: MessageWriter<bevy::app::AppExit>) {
    if SHOULD_EXIT.load(Ordering::SeqCst) {
        tracing::info!("[scene] check_exit_system: sending AppExit");
        exit.write(bevy::app::AppExit::Success);
    }
}

// ============================================================================
// Initialization
// ============================================================================

/// Starts the Bevy app on `canvas_id`. `config_json` overrides the
/// default scene configuration when given.
#[wasm_bindgen]
pub fn start_lavahop(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_tracing();

    if BEVY_APP_STARTED.load(Ordering::SeqCst) {
        tracing::info!("[scene] App already running, skipping creation");
        return Ok(());
    }

    let config = match config_json {
        Some(json) => SceneConfig::from_json(&json)
            .map_err(|e| JsValue::from_str(&format!("Invalid scene config: {e}")))?,
        None => SceneConfig::default(),
    };

    tracing::info!("[scene] creating Bevy app for canvas: #{canvas_id}");

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    canvas: Some(format!("#{canvas_id}")),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: true,
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(),
    );
    app.insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::Continuous,
    });
    app.add_plugins(LavahopUnifiedPlugin::new(command_queue(), state_stores()).with_config(config));

    BEVY_APP_STARTED.store(true, Ordering::SeqCst);
    app.run();
    tracing::info!("[scene] app.run() returned");

    Ok(())
}

/// Check if Bevy app is currently running.
#[wasm_bindgen]
pub fn is_lavahop_running() -> bool {
    BEVY_APP_STARTED.load(Ordering::SeqCst) && !is_shutdown_requested()
}

// ============================================================================
// Commands
// ============================================================================

/// Sends a JSON-encoded `SceneCommand`.
#[wasm_bindgen]
pub fn send_scene_command(command_json: &str) -> Result<(), JsValue> {
    let command: SceneCommand = serde_json::from_str(command_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid command JSON: {e}")))?;
    push(command)
}

/// Builds a fresh scene and starts a quiz over `words_json`
/// (`[{"word": .., "correct": ..}, ..]`).
#[wasm_bindgen]
pub fn start_session(words_json: &str, mode: &str, seed: Option<u64>) -> Result<(), JsValue> {
    let words: Vec<WordEntry> = serde_json::from_str(words_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid word list: {e}")))?;
    let mode = match mode {
        "meaning" => QuizMode::Meaning,
        _ => QuizMode::Word,
    };
    push(SceneCommand::StartSession { words, mode, seed })
}

#[wasm_bindgen]
pub fn end_session() -> Result<(), JsValue> {
    push(SceneCommand::EndSession)
}

#[wasm_bindgen]
pub fn pointer_down(x: f32, y: f32) -> Result<(), JsValue> {
    push(SceneCommand::PointerDown { x, y })
}

#[wasm_bindgen]
pub fn pointer_move(x: f32, y: f32) -> Result<(), JsValue> {
    push(SceneCommand::PointerMove { x, y })
}

#[wasm_bindgen]
pub fn pointer_leave() -> Result<(), JsValue> {
    push(SceneCommand::PointerLeave)
}

/// Keyboard or button selection of option `index`.
#[wasm_bindgen]
pub fn select_option(index: usize) -> Result<(), JsValue> {
    push(SceneCommand::SelectOption { index })
}

#[wasm_bindgen]
pub fn resize(width: f32, height: f32) -> Result<(), JsValue> {
    push(SceneCommand::Resize { width, height })
}

// ============================================================================
// State
// ============================================================================

/// Current quiz summary as a JS object.
#[wasm_bindgen]
pub fn get_quiz_summary() -> Result<JsValue, JsValue> {
    let summary = state_stores().quiz.get_summary();
    serde_wasm_bindgen::to_value(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Version of the quiz summary; changes only when the summary does.
#[wasm_bindgen]
pub fn get_quiz_version() -> u64 {
    state_stores().quiz.get_version()
}

/// Drains pending notices (landings, audio cues, session end).
#[wasm_bindgen]
pub fn take_scene_notices() -> Result<JsValue, JsValue> {
    let notices = state_stores().notices.drain();
    serde_wasm_bindgen::to_value(&notices).map_err(|e| JsValue::from_str(&e.to_string()))
}
