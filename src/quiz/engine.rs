use rand::Rng;

use crate::quiz::options::{self, DISTRACTOR_COUNT};
use crate::quiz::{
    AnswerResult, DataLoadError, Difficulty, LogoRecord, QuestionMode, QuestionView, QuizError,
    ScoreSummary,
};

pub const CORRECT_MESSAGE: &str = "Correct answer!";
pub const WRONG_MESSAGE_PREFIX: &str = "Wrong answer. The correct answer is: ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    #[default]
    NotStarted,
    AwaitingAnswer,
    /// An answer was checked and the next question has not been shown yet.
    Advancing,
    Ended,
}

/// Question selection, answer checking and score keeping for one player.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizEngine {
    bank: Vec<LogoRecord>,
    current_index: usize,
    correct_answer: String,
    options: Vec<String>,
    difficulty: Difficulty,
    correct_count: u32,
    total_count: u32,
    phase: Phase,
}

impl QuizEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a quiz over `bank` and prepares the first question.
    ///
    /// An empty bank leaves the engine untouched.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        bank: Vec<LogoRecord>,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<QuestionView, QuizError> {
        if bank.is_empty() {
            return Err(DataLoadError::Empty.into());
        }

        self.bank = bank;
        self.difficulty = difficulty;
        self.reset_session();
        self.phase = Phase::AwaitingAnswer;
        self.next_question(rng)
    }

    /// Picks a question uniformly at random. The same logo may come up twice in a row.
    pub fn next_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<QuestionView, QuizError> {
        self.ensure_started()?;
        let index = rng.gen_range(0..self.bank.len());
        self.show_question(index, rng)
    }

    pub fn show_question<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        rng: &mut R,
    ) -> Result<QuestionView, QuizError> {
        self.ensure_started()?;
        let record = self.bank.get(index).ok_or(QuizError::IndexOutOfRange {
            index,
            len: self.bank.len(),
        })?;

        self.correct_answer = record.answer.to_lowercase();
        self.current_index = index;
        self.options = if self.difficulty.is_hard() {
            Vec::new()
        } else {
            self.build_options(rng)
        };
        self.phase = Phase::AwaitingAnswer;

        Ok(self.current_view())
    }

    /// Choice-mode options for the current question, lower-cased.
    pub fn build_options<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let pool = self
            .bank
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.current_index)
            .map(|(_, record)| record.answer.to_lowercase());

        options::build_options(&self.correct_answer, pool, DISTRACTOR_COUNT, rng)
    }

    pub fn current_view(&self) -> QuestionView {
        let image_ref = self
            .bank
            .get(self.current_index)
            .map(|record| record.image_ref.clone())
            .unwrap_or_default();
        let mode = if self.difficulty.is_hard() {
            QuestionMode::Typed
        } else {
            QuestionMode::Choice {
                options: self.options.clone(),
            }
        };
        QuestionView { image_ref, mode }
    }

    /// Turns raw front-end input into the value to check.
    ///
    /// In choice mode only one of the offered options counts as a selection;
    /// anything else is treated as nothing selected.
    pub fn resolve_input<'a>(&'a self, text: Option<&'a str>) -> Option<&'a str> {
        let text = text?;
        if self.difficulty.is_hard() {
            return Some(text);
        }
        self.options
            .iter()
            .find(|option| option.to_lowercase() == text.to_lowercase())
            .map(String::as_str)
    }

    /// Scores one answer. `None` means nothing was selected and is always wrong.
    ///
    /// Only one answer is accepted per question; the next one must be shown first.
    pub fn check_answer(&mut self, input: Option<&str>) -> Result<AnswerResult, QuizError> {
        match self.phase {
            Phase::AwaitingAnswer => {}
            Phase::Advancing => return Err(QuizError::AnswerPending),
            Phase::NotStarted | Phase::Ended => return Err(QuizError::NotStarted),
        }

        self.total_count += 1;
        self.phase = Phase::Advancing;

        let is_correct = input.is_some_and(|answer| answer.to_lowercase() == self.correct_answer);
        if is_correct {
            self.correct_count += 1;
            return Ok(AnswerResult {
                is_correct,
                message: CORRECT_MESSAGE.to_string(),
            });
        }

        Ok(AnswerResult {
            is_correct,
            message: format!("{}{}", WRONG_MESSAGE_PREFIX, self.correct_answer),
        })
    }

    pub fn end_quiz(&mut self) -> ScoreSummary {
        let summary = self.summary();
        self.reset_session();
        self.phase = Phase::Ended;
        summary
    }

    /// Zeroes the tally. The bank and difficulty are kept.
    pub fn reset_session(&mut self) {
        self.correct_count = 0;
        self.total_count = 0;
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            correct_count: self.correct_count,
            total_count: self.total_count,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn bank_len(&self) -> usize {
        self.bank.len()
    }

    fn ensure_started(&self) -> Result<(), QuizError> {
        match self.phase {
            Phase::AwaitingAnswer | Phase::Advancing => Ok(()),
            Phase::NotStarted | Phase::Ended => Err(QuizError::NotStarted),
        }
    }
}
