//! Lavahop Core Library
//!
//! The lava-platform vocabulary quiz scene: four answer platforms over a
//! pulsing lava floor, a character that jumps to the chosen answer, and the
//! celebration and failure animations around it.
//!
//! - `quiz`: Word order, options, score and lives (no Bevy types)
//! - `config`: Tunables with JSON overrides
//! - `bevy`: ECS scene, animation scheduler, picking and plugins

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod easing;
pub mod error;
pub mod quiz;

// Bevy integration
pub mod bevy;

pub use config::{ConfigError, PLATFORM_COUNT, PLATFORM_LABELS, SceneConfig};
pub use easing::EasingType;
pub use error::SceneError;
pub use quiz::{QuizError, QuizMode, QuizPhase, QuizSession, WordEntry};
