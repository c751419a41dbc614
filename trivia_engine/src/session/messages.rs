//! Session actor message types.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use super::timer::RevealToken;
use crate::game::{
    GameError, GameResult, GameState, HelpKind, HelpOutcome, Phase, Question, QuizEvent,
};

/// Reply carrying the session state after a successful action
pub type SnapshotReply = oneshot::Sender<Result<SessionSnapshot, GameError>>;

/// Messages that can be sent to a SessionActor
#[derive(Debug)]
pub enum SessionMessage {
    /// Start a new session with the selected questions
    Start {
        questions: Vec<Question>,
        response: SnapshotReply,
    },

    /// Select an option on the visible question
    Answer { option: u8, response: SnapshotReply },

    /// Use one of the three helps
    UseHelp {
        kind: HelpKind,
        response: oneshot::Sender<Result<HelpOutcome, GameError>>,
    },

    /// Force the session to finish
    Finish { response: SnapshotReply },

    /// Return to the idle state
    Reset { response: SnapshotReply },

    /// Read the latest committed state
    GetSnapshot {
        response: oneshot::Sender<SessionSnapshot>,
    },

    /// Summary of the finished session
    GetResult {
        response: oneshot::Sender<Result<GameResult, GameError>>,
    },

    /// Subscribe to session notices
    Subscribe { sender: mpsc::Sender<QuizEvent> },

    /// Internal: a reveal window elapsed (posted by the scheduled task)
    RevealElapsed { token: RevealToken },

    /// Stop the actor
    Close { response: oneshot::Sender<()> },
}

/// Point-in-time view of a session for display
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub state: GameState,
    /// Seconds left on the visible question
    pub remaining_secs: u32,
    /// Options removed by 50/50 on the visible question
    pub eliminated: Vec<u8>,
    /// True while the answer is revealed and input is locked
    pub revealing: bool,
}

impl SessionSnapshot {
    /// The visible question, if any
    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question()
    }
}
