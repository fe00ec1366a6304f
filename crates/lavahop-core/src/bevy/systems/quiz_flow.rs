//! Built-in quiz flow.
//!
//! Drives a `QuizSession` through the scene: selecting an option jumps the
//! character, the landing resolves the answer, and the follow-up steps
//! (next question, reveal, victory) are paced by countdowns advanced each
//! frame.

use bevy::prelude::*;
use thiserror::Error;

use crate::bevy::bridge::{
    on_correct, on_option_selected, on_question_started, on_victory, on_victory_end, on_wrong,
};
use crate::bevy::components::hex_color;
use crate::bevy::picking::clear_hover;
use crate::bevy::resources::{live_handles, scene_config};
use crate::bevy::scene_graph::set_platform_color;
use crate::bevy::state_store::{AudioCue, Feedback, QuizSummary, SceneNotice, notify};
use crate::error::SceneError;
use crate::quiz::{Advance, QuizError, QuizMode, QuizSession, Verdict, WordEntry};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("no quiz session is running")]
    NoSession,
}

/// Delayed step of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowStep {
    Advance,
    Reveal(usize),
    ShowOverlay,
    EndVictory,
}

/// Quiz session plus its pending steps.
#[derive(Resource, Default)]
pub struct QuizFlow {
    session: Option<QuizSession>,
    /// Seconds left and the step to run, in scheduling order.
    pending: Vec<(f32, FlowStep)>,
    feedback: Option<Feedback>,
    revealed: Option<usize>,
    overlay: bool,
}

impl QuizFlow {
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn pending_steps(&self) -> usize {
        self.pending.len()
    }

    fn schedule(&mut self, delay: f32, step: FlowStep) {
        self.pending.push((delay, step));
    }

    /// Summary for the page.
    pub fn summary(&self) -> QuizSummary {
        let Some(session) = &self.session else {
            return QuizSummary::default();
        };
        let question = session.question();
        QuizSummary {
            active: true,
            mode: session.mode(),
            prompt: question.map(|q| q.prompt.clone()).unwrap_or_default(),
            options: question.map(|q| q.options.clone()).unwrap_or_default(),
            question_number: session.question_index() + 1,
            total_questions: session.total_questions(),
            score: session.score(),
            lives: session.lives(),
            phase: session.phase(),
            feedback: self.feedback.clone(),
            revealed_index: self.revealed,
            show_overlay: self.overlay,
        }
    }
}

/// Starts a quiz on the live scene.
pub fn start_quiz(
    world: &mut World,
    words: Vec<WordEntry>,
    mode: QuizMode,
    seed: u64,
) -> Result<(), FlowError> {
    live_handles(world)?;
    let rules = scene_config(world).quiz;
    let session = QuizSession::new(words, mode, &rules, seed)?;
    tracing::info!(
        "[quiz] Starting {:?} quiz with {} questions",
        mode,
        session.total_questions()
    );
    world.insert_resource(QuizFlow {
        session: Some(session),
        ..QuizFlow::default()
    });
    notify(world, SceneNotice::Audio { cue: AudioCue::Intro });
    on_question_started(world, 0)?;
    Ok(())
}

/// Drops the running quiz, if any.
pub fn stop_quiz(world: &mut World) {
    world.insert_resource(QuizFlow::default());
}

/// Picks option `index` for the current question.
pub fn select_option(world: &mut World, index: usize) -> Result<(), FlowError> {
    live_handles(world)?.platform(index)?;
    world
        .get_resource_mut::<QuizFlow>()
        .and_then(|mut flow| flow.session.as_mut().map(|s| s.begin_answer(index)))
        .ok_or(FlowError::NoSession)??;

    notify(world, SceneNotice::Audio { cue: AudioCue::Select });
    on_option_selected(world, index, resolve_answer)?;
    Ok(())
}

/// Landing callback of the selection jump.
fn resolve_answer(world: &mut World, index: usize) {
    notify(world, SceneNotice::OptionChosen { index });
    let rules = scene_config(world).quiz;

    let resolved = world.get_resource_mut::<QuizFlow>().and_then(|mut flow| {
        let session = flow.session.as_mut()?;
        let verdict = session.resolve(index);
        let correct_answer = session.correct_answer().unwrap_or_default().to_string();
        let correct_index = session.correct_index();
        Some((verdict, correct_answer, correct_index))
    });
    let Some((verdict, correct_answer, correct_index)) = resolved else {
        tracing::debug!("[quiz] Landing on {index} with no session");
        return;
    };

    let verdict = match verdict {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!("[quiz] Could not resolve option {index}: {e}");
            return;
        }
    };

    {
        let mut flow = world.resource_mut::<QuizFlow>();
        match verdict {
            Verdict::Correct => {
                flow.feedback = Some(Feedback::Correct);
                flow.schedule(rules.correct_advance_delay, FlowStep::Advance);
            }
            Verdict::Wrong => {
                flow.feedback = Some(Feedback::Wrong { correct_answer });
                if let Some(correct) = correct_index {
                    flow.schedule(rules.wrong_reveal_delay, FlowStep::Reveal(correct));
                }
                flow.schedule(rules.wrong_advance_delay, FlowStep::Advance);
            }
        }
    }

    let (result, cue) = match verdict {
        Verdict::Correct => (on_correct(world, index), AudioCue::Good),
        Verdict::Wrong => (on_wrong(world, index), AudioCue::Wrong),
    };
    notify(world, SceneNotice::Audio { cue });
    if let Err(e) = result {
        tracing::warn!("[quiz] Answer animation skipped: {e}");
    }
}

/// Counts down pending steps and runs the ones that are due.
pub fn tick_quiz_flow(world: &mut World, delta: f32) {
    let due: Vec<FlowStep> = {
        let Some(mut flow) = world.get_resource_mut::<QuizFlow>() else {
            return;
        };
        if flow.pending.is_empty() {
            return;
        }
        let mut due = Vec::new();
        flow.pending.retain_mut(|(remaining, step)| {
            *remaining -= delta;
            if *remaining <= 0.0 {
                due.push(*step);
                false
            } else {
                true
            }
        });
        due
    };

    for step in due {
        if let Err(e) = run_step(world, step) {
            tracing::warn!("[quiz] Step {step:?} failed: {e}");
        }
    }
}

fn run_step(world: &mut World, step: FlowStep) -> Result<(), FlowError> {
    match step {
        FlowStep::Advance => {
            let advance = world
                .get_resource_mut::<QuizFlow>()
                .and_then(|mut flow| flow.session.as_mut().map(QuizSession::advance))
                .ok_or(FlowError::NoSession)??;
            advance_to(world, advance)
        }
        FlowStep::Reveal(index) => {
            let color = hex_color(scene_config(world).palette.platform_correct);
            world.resource_mut::<QuizFlow>().revealed = Some(index);
            // A pending hover restore would paint over the reveal.
            clear_hover(world)?;
            set_platform_color(world, index, color)?;
            Ok(())
        }
        FlowStep::ShowOverlay => {
            world.resource_mut::<QuizFlow>().overlay = true;
            Ok(())
        }
        FlowStep::EndVictory => {
            world.resource_mut::<QuizFlow>().overlay = false;
            on_victory_end(world)?;
            finish(world, true);
            Ok(())
        }
    }
}

fn advance_to(world: &mut World, advance: Advance) -> Result<(), FlowError> {
    match advance {
        Advance::NextQuestion(index) => {
            {
                let mut flow = world.resource_mut::<QuizFlow>();
                flow.feedback = None;
                flow.revealed = None;
            }
            on_question_started(world, index)?;
        }
        Advance::Victory => {
            let rules = scene_config(world).quiz;
            {
                let mut flow = world.resource_mut::<QuizFlow>();
                flow.schedule(rules.victory_overlay_delay, FlowStep::ShowOverlay);
                flow.schedule(rules.victory_duration, FlowStep::EndVictory);
            }
            notify(world, SceneNotice::Audio { cue: AudioCue::Win });
            on_victory(world)?;
        }
        Advance::Defeat => {
            world.resource_mut::<QuizFlow>().overlay = true;
            notify(world, SceneNotice::Audio { cue: AudioCue::Lose });
            finish(world, false);
        }
    }
    Ok(())
}

fn finish(world: &mut World, victory: bool) {
    let Some((score, total)) = world
        .get_resource::<QuizFlow>()
        .and_then(|flow| flow.session.as_ref())
        .map(|s| (s.score(), s.total_questions()))
    else {
        return;
    };
    tracing::info!("[quiz] Session finished (victory={victory}, score={score}/{total})");
    notify(
        world,
        SceneNotice::SessionFinished {
            victory,
            score,
            total,
        },
    );
}
