use std::path::PathBuf;

use thiserror::Error;

/// The question bank could not be turned into a usable quiz.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank is empty")]
    Empty,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
    #[error("quiz has not been started")]
    NotStarted,
    #[error("answer already submitted, next question is pending")]
    AnswerPending,
    #[error("question index {index} out of range for a bank of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
