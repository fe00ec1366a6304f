//! Quiz session bookkeeping.
//!
//! Owns the word order, the four options of the current question, score and
//! lives. It knows nothing about the scene: the Bevy flow in
//! `bevy::systems::quiz_flow` translates its verdicts into scene events.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{PLATFORM_COUNT, QuizRules};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("word list needs at least 4 distinct answers, found {found}")]
    NotEnoughWords { found: usize },
    #[error("option {0} does not exist for the current question")]
    InvalidOption(usize),
    #[error("quiz is not waiting for an answer")]
    NotAwaitingAnswer,
    #[error("quiz has already finished")]
    Finished,
}

/// One vocabulary entry: the word and its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    #[serde(alias = "meaning")]
    pub correct: String,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, correct: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            correct: correct.into(),
        }
    }
}

/// Which side of the entry is shown and which side is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    /// Show the word, pick its meaning.
    #[default]
    Word,
    /// Show the meaning, pick the word.
    Meaning,
}

impl QuizMode {
    fn prompt(self, entry: &WordEntry) -> &str {
        match self {
            Self::Word => &entry.word,
            Self::Meaning => &entry.correct,
        }
    }

    fn answer(self, entry: &WordEntry) -> &str {
        match self {
            Self::Word => &entry.correct,
            Self::Meaning => &entry.word,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Zero-based position in the session.
    pub number: usize,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    #[default]
    AwaitingAnswer,
    /// An option was picked; the jump is in flight.
    Resolving,
    /// The verdict is shown; waiting for `advance`.
    ShowingResult,
    Won,
    Lost,
}

impl QuizPhase {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    NextQuestion(usize),
    Victory,
    Defeat,
}

pub struct QuizSession {
    words: Vec<WordEntry>,
    mode: QuizMode,
    order: Vec<usize>,
    current: usize,
    score: usize,
    lives: u32,
    question: Option<Question>,
    phase: QuizPhase,
    rng: ChaCha8Rng,
}

impl QuizSession {
    /// Starts a session and prepares the first question.
    ///
    /// At most `rules.total_questions` words are asked; a shorter list asks
    /// every word once.
    pub fn new(
        words: Vec<WordEntry>,
        mode: QuizMode,
        rules: &QuizRules,
        seed: u64,
    ) -> Result<Self, QuizError> {
        // Every question needs three distractors besides its own answer.
        let found = words
            .iter()
            .map(|entry| distractor_pool(&words, mode, entry).len() + 1)
            .min()
            .unwrap_or(0);
        if found < PLATFORM_COUNT {
            return Err(QuizError::NotEnoughWords { found });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..words.len()).collect();
        order.shuffle(&mut rng);
        order.truncate(rules.total_questions.max(1));

        let mut session = Self {
            words,
            mode,
            order,
            current: 0,
            score: 0,
            lives: rules.lives,
            question: None,
            phase: QuizPhase::AwaitingAnswer,
            rng,
        };
        session.prepare_question();
        Ok(session)
    }

    fn prepare_question(&mut self) {
        let entry = &self.words[self.order[self.current]];
        let answer = self.mode.answer(entry).to_string();
        let prompt = self.mode.prompt(entry).to_string();

        let mut distractors = distractor_pool(&self.words, self.mode, entry);
        distractors.shuffle(&mut self.rng);
        distractors.truncate(PLATFORM_COUNT - 1);

        let mut options = distractors;
        options.push(answer.clone());
        options.shuffle(&mut self.rng);
        let correct_index = options.iter().position(|o| *o == answer).unwrap_or(0);

        self.question = Some(Question {
            number: self.current,
            prompt,
            options,
            correct_index,
        });
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Number of questions this session asks.
    pub fn total_questions(&self) -> usize {
        self.order.len()
    }

    pub fn question_index(&self) -> usize {
        self.current
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.question.as_ref().map(|q| q.correct_index)
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.question
            .as_ref()
            .map(|q| q.options[q.correct_index].as_str())
    }

    pub fn can_answer(&self) -> bool {
        self.phase == QuizPhase::AwaitingAnswer
    }

    pub fn is_victory(&self) -> bool {
        self.score >= self.order.len() && self.lives > 0
    }

    /// Locks in the picked option while its jump plays.
    pub fn begin_answer(&mut self, index: usize) -> Result<(), QuizError> {
        if self.phase.is_finished() {
            return Err(QuizError::Finished);
        }
        if self.phase != QuizPhase::AwaitingAnswer {
            return Err(QuizError::NotAwaitingAnswer);
        }
        let options = self.question.as_ref().map_or(0, |q| q.options.len());
        if index >= options {
            return Err(QuizError::InvalidOption(index));
        }
        self.phase = QuizPhase::Resolving;
        Ok(())
    }

    /// Scores the option picked in `begin_answer`.
    pub fn resolve(&mut self, index: usize) -> Result<Verdict, QuizError> {
        if self.phase != QuizPhase::Resolving {
            return Err(QuizError::NotAwaitingAnswer);
        }
        let correct = self.correct_index().ok_or(QuizError::Finished)?;

        let verdict = if index == correct {
            self.score += 1;
            Verdict::Correct
        } else {
            self.lives = self.lives.saturating_sub(1);
            Verdict::Wrong
        };

        self.phase = if self.lives == 0 {
            QuizPhase::Lost
        } else {
            QuizPhase::ShowingResult
        };

        tracing::debug!(
            "[quiz] question {} answered {:?} (score={}, lives={})",
            self.current,
            verdict,
            self.score,
            self.lives
        );
        Ok(verdict)
    }

    /// Moves past the shown result.
    pub fn advance(&mut self) -> Result<Advance, QuizError> {
        match self.phase {
            QuizPhase::Lost => return Ok(Advance::Defeat),
            QuizPhase::Won => return Ok(Advance::Victory),
            QuizPhase::ShowingResult => {}
            QuizPhase::AwaitingAnswer | QuizPhase::Resolving => {
                return Err(QuizError::NotAwaitingAnswer);
            }
        }

        if self.is_victory() {
            self.phase = QuizPhase::Won;
            return Ok(Advance::Victory);
        }

        self.current += 1;
        if self.current >= self.order.len() {
            self.current = self.order.len() - 1;
            self.phase = QuizPhase::Lost;
            return Ok(Advance::Defeat);
        }

        self.prepare_question();
        self.phase = QuizPhase::AwaitingAnswer;
        Ok(Advance::NextQuestion(self.current))
    }
}

/// Distinct wrong answers for `entry`. Other meanings of the same word are
/// left out.
fn distractor_pool(words: &[WordEntry], mode: QuizMode, entry: &WordEntry) -> Vec<String> {
    let answer = mode.answer(entry);
    let mut pool: Vec<String> = Vec::new();
    for other in words {
        let candidate = mode.answer(other);
        if other.word == entry.word || candidate == answer {
            continue;
        }
        if !pool.iter().any(|d| d == candidate) {
            pool.push(candidate.to_string());
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| WordEntry::new(format!("word{i}"), format!("meaning{i}")))
            .collect()
    }

    fn rules(total: usize) -> QuizRules {
        QuizRules {
            total_questions: total,
            ..QuizRules::default()
        }
    }

    fn answer(session: &mut QuizSession, correct: bool) -> Verdict {
        let right = session.correct_index().unwrap();
        let pick = if correct { right } else { (right + 1) % 4 };
        session.begin_answer(pick).unwrap();
        session.resolve(pick).unwrap()
    }

    #[test]
    fn test_rejects_short_word_list() {
        let result = QuizSession::new(words(3), QuizMode::Word, &rules(15), 1);
        assert!(matches!(result, Err(QuizError::NotEnoughWords { found: 3 })));
    }

    #[test]
    fn test_rejects_list_with_shared_answers() {
        let shared = vec![
            WordEntry::new("big", "large"),
            WordEntry::new("huge", "large"),
            WordEntry::new("small", "tiny"),
            WordEntry::new("little", "tiny"),
            WordEntry::new("fast", "quick"),
            WordEntry::new("rapid", "quick"),
        ];
        let result = QuizSession::new(shared.clone(), QuizMode::Word, &rules(15), 1);
        assert_eq!(result.err(), Some(QuizError::NotEnoughWords { found: 3 }));

        // Every word is distinct, so the reverse direction has enough answers.
        let mut session = QuizSession::new(shared, QuizMode::Meaning, &rules(15), 1).unwrap();
        assert_eq!(session.question().unwrap().options.len(), 4);
        answer(&mut session, true);
    }

    #[test]
    fn test_same_word_meanings_are_not_distractors() {
        let list = vec![
            WordEntry::new("bank", "river side"),
            WordEntry::new("bank", "money house"),
            WordEntry::new("tree", "plant"),
            WordEntry::new("stone", "rock"),
        ];
        let result = QuizSession::new(list, QuizMode::Word, &rules(15), 1);
        assert_eq!(result.err(), Some(QuizError::NotEnoughWords { found: 3 }));
    }

    #[test]
    fn test_question_contains_answer_once() {
        let session = QuizSession::new(words(20), QuizMode::Word, &rules(15), 7).unwrap();
        let question = session.question().unwrap();

        assert_eq!(question.options.len(), 4);
        let answer = session.correct_answer().unwrap();
        assert_eq!(question.options.iter().filter(|o| *o == answer).count(), 1);

        let index: usize = question.prompt.trim_start_matches("word").parse().unwrap();
        assert_eq!(answer, format!("meaning{index}"));
    }

    #[test]
    fn test_meaning_mode_asks_for_words() {
        let session = QuizSession::new(words(6), QuizMode::Meaning, &rules(15), 3).unwrap();
        let question = session.question().unwrap();
        assert!(question.prompt.starts_with("meaning"));
        assert!(question.options.iter().all(|o| o.starts_with("word")));
        // A short list asks every word once.
        assert_eq!(session.total_questions(), 6);
    }

    #[test]
    fn test_same_seed_same_questions() {
        let a = QuizSession::new(words(20), QuizMode::Word, &rules(15), 42).unwrap();
        let b = QuizSession::new(words(20), QuizMode::Word, &rules(15), 42).unwrap();
        assert_eq!(a.question(), b.question());
    }

    #[test]
    fn test_double_answer_rejected() {
        let mut session = QuizSession::new(words(8), QuizMode::Word, &rules(5), 1).unwrap();
        session.begin_answer(0).unwrap();
        assert_eq!(session.begin_answer(1), Err(QuizError::NotAwaitingAnswer));
        assert_eq!(session.begin_answer(9), Err(QuizError::NotAwaitingAnswer));
    }

    #[test]
    fn test_invalid_option_rejected() {
        let mut session = QuizSession::new(words(8), QuizMode::Word, &rules(5), 1).unwrap();
        assert_eq!(session.begin_answer(4), Err(QuizError::InvalidOption(4)));
        assert!(session.can_answer());
    }

    #[test]
    fn test_all_correct_wins() {
        let mut session = QuizSession::new(words(20), QuizMode::Word, &rules(15), 11).unwrap();
        for i in 0..15 {
            assert_eq!(answer(&mut session, true), Verdict::Correct);
            let next = session.advance().unwrap();
            if i < 14 {
                assert_eq!(next, Advance::NextQuestion(i + 1));
            } else {
                assert_eq!(next, Advance::Victory);
            }
        }
        assert_eq!(session.phase(), QuizPhase::Won);
        assert_eq!(session.score(), 15);
        assert_eq!(session.lives(), 3);
    }

    #[test]
    fn test_three_wrong_loses() {
        let mut session = QuizSession::new(words(20), QuizMode::Word, &rules(15), 5).unwrap();
        for _ in 0..2 {
            assert_eq!(answer(&mut session, false), Verdict::Wrong);
            assert!(matches!(session.advance().unwrap(), Advance::NextQuestion(_)));
        }
        assert_eq!(answer(&mut session, false), Verdict::Wrong);
        assert_eq!(session.phase(), QuizPhase::Lost);
        assert_eq!(session.advance().unwrap(), Advance::Defeat);
        assert_eq!(session.begin_answer(0), Err(QuizError::Finished));
    }

    #[test]
    fn test_running_out_of_questions_is_defeat() {
        let mut session = QuizSession::new(words(10), QuizMode::Word, &rules(3), 9).unwrap();
        assert_eq!(answer(&mut session, false), Verdict::Wrong);
        session.advance().unwrap();
        assert_eq!(answer(&mut session, true), Verdict::Correct);
        session.advance().unwrap();
        assert_eq!(answer(&mut session, true), Verdict::Correct);
        assert_eq!(session.advance().unwrap(), Advance::Defeat);
        assert_eq!(session.phase(), QuizPhase::Lost);
    }

    #[test]
    fn test_word_list_json() {
        let json = r#"[{ "word": "afdalen", "correct": "Naar beneden gaan." }]"#;
        let parsed: Vec<WordEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0], WordEntry::new("afdalen", "Naar beneden gaan."));
    }
}
