//! Trivia game engine - core FSM and game logic.
//!
//! This module provides the foundational quiz implementation including:
//! - Question and answer entities
//! - The session state machine (idle, active, finished)
//! - The three once-per-session helps
//! - Unbiased question shuffling
//! - Result aggregation for finished sessions

// Submodules
pub mod constants;
pub mod entities;
pub mod help;
pub mod results;
pub mod shuffle;
pub mod state_machine;

pub use entities::{
    AnswerChoice, Difficulty, GameAnswer, HelpAvailability, HelpKind, Question, QuestionDraft,
    QuestionError, QuestionId,
};
pub use help::{Assist, Help, HelpOutcome};
pub use results::{AnswerReview, GameResult, PerformanceTier};
pub use shuffle::QuestionShuffler;
pub use state_machine::{GameError, GameState, Phase, QuizAction, QuizEvent};
