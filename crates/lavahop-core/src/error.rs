//! Errors raised by the scene layer.
//!
//! None of these are fatal: callers log them and skip the requested
//! animation for the current frame.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("platform index {index} out of range (scene has {count} platforms)")]
    InvalidPlatform { index: usize, count: usize },
    #[error("scene has been disposed")]
    Disposed,
    #[error("no scene has been spawned")]
    NotSpawned,
    #[error("scene entity is missing")]
    MissingEntity,
}
