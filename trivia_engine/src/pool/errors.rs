//! Question pool error types.

use thiserror::Error;

use crate::game::{QuestionError, QuestionId};

/// Question pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    /// Reading or writing the pool file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pool file is not valid JSON (or a record failed validation while loading)
    #[error("Invalid pool file: {0}")]
    Json(#[from] serde_json::Error),

    /// Authored question was rejected
    #[error("Invalid question: {0}")]
    InvalidQuestion(#[from] QuestionError),

    /// No question with this id
    #[error("Question {0} not found")]
    NotFound(QuestionId),

    /// Two records share an id
    #[error("Duplicate question id {0}")]
    DuplicateId(QuestionId),
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
