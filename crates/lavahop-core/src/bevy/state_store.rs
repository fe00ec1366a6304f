//! Shared state stores between Bevy and the host page.
//!
//! The page polls these from JavaScript; Bevy systems are the only writers.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::Resource;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::quiz::{QuizMode, QuizPhase};

/// Maximum number of undelivered notices to keep.
const MAX_NOTICES: usize = 64;

// ============================================================================
// Data Types
// ============================================================================

/// Sound the page should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Intro,
    Select,
    Good,
    Wrong,
    Lose,
    Win,
}

/// One-shot event for the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneNotice {
    /// The character landed on option `index`.
    OptionChosen { index: usize },
    Audio { cue: AudioCue },
    SessionFinished { victory: bool, score: usize, total: usize },
}

/// Text shown under the question after an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Wrong { correct_answer: String },
}

/// Quiz state summary for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuizSummary {
    pub active: bool,
    pub mode: QuizMode,
    pub prompt: String,
    pub options: Vec<String>,
    /// One-based, for display.
    pub question_number: usize,
    pub total_questions: usize,
    pub score: usize,
    pub lives: u32,
    pub phase: QuizPhase,
    pub feedback: Option<Feedback>,
    /// Correct option highlighted after a wrong answer.
    pub revealed_index: Option<usize>,
    pub show_overlay: bool,
}

// ============================================================================
// Individual Stores
// ============================================================================

/// Store for the quiz summary.
#[derive(Debug, Default)]
pub struct QuizStore {
    summary: RwLock<QuizSummary>,
    version: RwLock<u64>,
}

impl QuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_summary(&self) -> QuizSummary {
        self.summary.read().clone()
    }

    pub fn get_version(&self) -> u64 {
        *self.version.read()
    }

    /// Replaces the summary; the version only moves when something changed.
    pub fn update(&self, summary: QuizSummary) {
        let mut current = self.summary.write();
        if *current != summary {
            *current = summary;
            *self.version.write() += 1;
        }
    }
}

/// Store for pending notices, drained by the page.
#[derive(Debug, Default)]
pub struct NoticeStore {
    notices: RwLock<VecDeque<SceneNotice>>,
}

impl NoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notice: SceneNotice) {
        let mut notices = self.notices.write();
        notices.push_back(notice);
        while notices.len() > MAX_NOTICES {
            notices.pop_front();
        }
    }

    pub fn drain(&self) -> Vec<SceneNotice> {
        self.notices.write().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.notices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.read().is_empty()
    }
}

// ============================================================================
// Combined State Stores
// ============================================================================

/// All state stores combined for easy sharing.
#[derive(Debug, Clone, Resource)]
pub struct SceneStores {
    pub quiz: Arc<QuizStore>,
    pub notices: Arc<NoticeStore>,
}

impl SceneStores {
    pub fn new() -> Self {
        Self {
            quiz: Arc::new(QuizStore::new()),
            notices: Arc::new(NoticeStore::new()),
        }
    }
}

impl Default for SceneStores {
    fn default() -> Self {
        Self::new()
    }
}

/// Queues a notice if the world has stores attached.
pub fn notify(world: &bevy::prelude::World, notice: SceneNotice) {
    if let Some(stores) = world.get_resource::<SceneStores>() {
        stores.notices.push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_moves_only_on_change() {
        let store = QuizStore::new();
        let summary = QuizSummary {
            active: true,
            score: 2,
            ..QuizSummary::default()
        };
        store.update(summary.clone());
        store.update(summary);
        assert_eq!(store.get_version(), 1);
        assert_eq!(store.get_summary().score, 2);
    }

    #[test]
    fn test_notice_queue_is_bounded() {
        let store = NoticeStore::new();
        for index in 0..(MAX_NOTICES + 10) {
            store.push(SceneNotice::OptionChosen { index });
        }
        let drained = store.drain();
        assert_eq!(drained.len(), MAX_NOTICES);
        assert_eq!(drained[0], SceneNotice::OptionChosen { index: 10 });
        assert!(store.is_empty());
    }

    #[test]
    fn test_notice_json_shape() {
        let json = serde_json::to_string(&SceneNotice::Audio {
            cue: AudioCue::Good,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"audio","cue":"good"}"#);
    }
}
