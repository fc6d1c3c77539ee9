use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const BANK_PATH_VAR: &str = "QUIZ_BANK_PATH";
pub const ADVANCE_DELAY_VAR: &str = "QUIZ_ADVANCE_DELAY_MS";

const DEFAULT_BANK_PATH: &str = "loga.json";
const DEFAULT_ADVANCE_DELAY_MS: u64 = 800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("QUIZ_ADVANCE_DELAY_MS must be a number of milliseconds, got {0:?}")]
    InvalidDelay(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bank_path: PathBuf,
    /// How long an answer's result stays up before the next logo is shown.
    pub advance_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bank_path = lookup(BANK_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BANK_PATH));

        let advance_delay = match lookup(ADVANCE_DELAY_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidDelay(raw))?,
            None => Duration::from_millis(DEFAULT_ADVANCE_DELAY_MS),
        };

        Ok(Self {
            bank_path,
            advance_delay,
        })
    }

    /// Directory that relative image paths in the bank are resolved against.
    pub fn bank_dir(&self) -> &Path {
        self.bank_path.parent().unwrap_or_else(|| Path::new(""))
    }
}
