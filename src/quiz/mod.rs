pub mod advance;
pub mod bank;
pub mod engine;
pub mod error;
pub mod options;

use std::fmt;

pub use engine::{Phase, QuizEngine};
pub use error::{DataLoadError, QuizError};

/// One logo in the question bank, as stored in the bank file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogoRecord {
    #[serde(rename = "src")]
    pub image_ref: String,
    #[serde(rename = "odpowiedz", alias = "answer")]
    pub answer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

pub const EASY_SELECTOR: &str = "łatwy";
pub const HARD_SELECTOR: &str = "trudny";

impl Difficulty {
    /// Maps the difficulty selector value; only `"trudny"` selects hard mode.
    pub fn from_selector(value: &str) -> Self {
        if value == HARD_SELECTOR {
            Difficulty::Hard
        } else {
            Difficulty::Easy
        }
    }

    pub fn is_hard(self) -> bool {
        self == Difficulty::Hard
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QuestionMode {
    Choice { options: Vec<String> },
    Typed,
}

/// What the front-end has to render for the current question.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionView {
    pub image_ref: String,
    pub mode: QuestionMode,
}

impl QuestionView {
    pub fn options(&self) -> Option<&[String]> {
        match &self.mode {
            QuestionMode::Choice { options } => Some(options),
            QuestionMode::Typed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub is_correct: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub correct_count: u32,
    pub total_count: u32,
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {} / {}", self.correct_count, self.total_count)
    }
}
