//! # Trivia Engine
//!
//! A timed multiple-choice trivia session engine built around a small,
//! deterministic finite state machine (FSM).
//!
//! A session moves through three phases:
//!
//! - **Idle**: no session running, no questions loaded
//! - **Active**: questions are being asked and answered
//! - **Finished**: terminal, read-only until the session is reset
//!
//! Every transition is an explicit [`QuizAction`] applied to an owned
//! [`GameState`]. Timing (the per-question countdown and the reveal window
//! between an answer and the next question) lives outside the state machine
//! in the [`session`] module, which drives the FSM from a single tokio task.
//!
//! ## Core Modules
//!
//! - [`game`]: entities, state machine, helps, shuffling, and result aggregation
//! - [`session`]: countdown, orchestration, and the session actor
//! - [`pool`]: question pool storage consumed at session start
//!
//! ## Example
//!
//! ```
//! use trivia_engine::{GameState, Phase};
//!
//! // A fresh state is idle
//! let state = GameState::default();
//! assert_eq!(state.phase(), Phase::Idle);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    AnswerChoice, Difficulty, GameAnswer, GameError, GameResult, GameState, HelpAvailability,
    HelpKind, HelpOutcome, Phase, PerformanceTier, Question, QuestionDraft, QuestionError,
    QuestionId, QuizAction, QuizEvent, constants,
};

/// Question pool storage.
pub mod pool;
pub use pool::{FilePool, InMemoryPool, PoolError, QuestionPool};

/// Session timing, orchestration, and the async session actor.
pub mod session;
pub use session::{
    Clock, Effect, Orchestrator, SessionActor, SessionConfig, SessionHandle, SessionSnapshot,
};
