//! Session configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::constants::{
    DEFAULT_BATCH_SIZE, REVEAL_WINDOW, SKIP_REVEAL_WINDOW, STARTING_LIVES, TIME_PER_QUESTION_SECS,
};

/// Configuration error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds allowed per question (default: 30)
    pub time_per_question_secs: u32,

    /// Lives at session start (default: 3)
    pub starting_lives: u8,

    /// Reveal window after a manual or timed-out answer
    pub reveal_window: Duration,

    /// Reveal window after a skip
    pub skip_reveal_window: Duration,

    /// Maximum questions drawn from the pool per session
    pub batch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_per_question_secs: TIME_PER_QUESTION_SECS,
            starting_lives: STARTING_LIVES,
            reveal_window: REVEAL_WINDOW,
            skip_reveal_window: SKIP_REVEAL_WINDOW,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SessionConfig {
    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_per_question_secs == 0 || self.time_per_question_secs > 600 {
            return Err(invalid(
                "time_per_question_secs",
                "Must be between 1 and 600 seconds",
            ));
        }

        if self.starting_lives == 0 {
            return Err(invalid("starting_lives", "Must be at least 1"));
        }

        if self.reveal_window.is_zero() {
            return Err(invalid("reveal_window", "Must be greater than 0"));
        }

        if self.skip_reveal_window.is_zero() || self.skip_reveal_window > self.reveal_window {
            return Err(invalid(
                "skip_reveal_window",
                "Must be greater than 0 and no longer than the reveal window",
            ));
        }

        if self.batch_size == 0 {
            return Err(invalid("batch_size", "Must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
