//! Result aggregation for finished sessions.
//!
//! Everything here is a pure read-side view. A [`GameResult`] built from a
//! finished [`GameState`] is identical to one rebuilt from the persisted
//! answer log alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    constants::POINTS_PER_CORRECT_ANSWER,
    entities::{AnswerChoice, GameAnswer, HelpKind, Question},
    state_machine::{GameError, GameState},
};

/// Performance tier derived from accuracy
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceTier {
    /// Map an accuracy percentage to a tier.
    #[must_use]
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            Self::Excellent
        } else if accuracy >= 70.0 {
            Self::Good
        } else if accuracy >= 50.0 {
            Self::Fair
        } else {
            Self::NeedsImprovement
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs improvement",
        }
    }

    /// Encouragement line shown with the tier
    #[must_use]
    pub fn feedback(&self) -> &'static str {
        match self {
            Self::Excellent => "Amazing! You really know this subject!",
            Self::Good => "Well done! Keep it up!",
            Self::Fair => "Good work! Keep studying!",
            Self::NeedsImprovement => "Don't give up! Practice makes perfect!",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Summary statistics of a finished session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score: u32,
    /// Percentage in `[0, 100]`.
    pub accuracy: f64,
    pub total_time_secs: u64,
    pub average_time_per_question: f64,
    pub tier: PerformanceTier,
    pub answers: Vec<GameAnswer>,
}

impl GameResult {
    /// Summarize a finished session.
    ///
    /// # Errors
    ///
    /// Returns `GameError::SessionNotFinished` unless the session finished.
    pub fn from_state(state: &GameState) -> Result<Self, GameError> {
        if !state.is_finished() {
            return Err(GameError::SessionNotFinished);
        }

        Ok(Self::from_log(
            state.questions().len(),
            state.answers(),
            Some(state.start_time()),
            state.end_time(),
        ))
    }

    /// Rebuild a summary from an answer log.
    ///
    /// # Arguments
    ///
    /// * `total_questions` - Number of questions the session was started with
    /// * `answers` - The answer log in visitation order
    /// * `started_at` / `ended_at` - Session timestamps, if known
    #[must_use]
    pub fn from_log(
        total_questions: usize,
        answers: &[GameAnswer],
        started_at: Option<DateTime<Utc>>,
        ended_at: Option<DateTime<Utc>>,
    ) -> Self {
        let correct_answers = answers.iter().filter(|a| a.is_correct).count();

        let accuracy = if total_questions == 0 {
            0.0
        } else {
            correct_answers as f64 / total_questions as f64 * 100.0
        };

        let total_time_secs = match (started_at, ended_at) {
            (Some(start), Some(end)) => u64::try_from((end - start).num_seconds()).unwrap_or(0),
            _ => 0,
        };

        let average_time_per_question = if answers.is_empty() {
            0.0
        } else {
            let sum: u64 = answers.iter().map(|a| u64::from(a.time_spent)).sum();
            sum as f64 / answers.len() as f64
        };

        let score = u32::try_from(correct_answers)
            .unwrap_or(u32::MAX)
            .saturating_mul(POINTS_PER_CORRECT_ANSWER);

        Self {
            total_questions,
            correct_answers,
            score,
            accuracy,
            total_time_secs,
            average_time_per_question,
            tier: PerformanceTier::from_accuracy(accuracy),
            answers: answers.to_vec(),
        }
    }

    /// Helps that show up in the answer log.
    #[must_use]
    pub fn helps_used(&self) -> Vec<HelpKind> {
        HelpKind::ALL
            .into_iter()
            .filter(|kind| self.answers.iter().any(|a| a.help_used == Some(*kind)))
            .collect()
    }

    /// Per-answer rows for a detailed summary.
    ///
    /// Answers that reference a question missing from `questions` are left
    /// out rather than failing the whole summary.
    #[must_use]
    pub fn review(&self, questions: &[Question]) -> Vec<AnswerReview> {
        self.answers
            .iter()
            .enumerate()
            .filter_map(|(position, answer)| {
                let Some(question) = questions.iter().find(|q| *q.id() == answer.question_id)
                else {
                    log::warn!(
                        "Answer {} references unknown question {}",
                        position + 1,
                        answer.question_id
                    );
                    return None;
                };

                Some(AnswerReview {
                    position: position + 1,
                    prompt: question.prompt().to_string(),
                    category: question.category().to_string(),
                    time_spent: answer.time_spent,
                    help_used: answer.help_used,
                    choice: answer.choice,
                    is_correct: answer.is_correct,
                    correct_option: question.correct_answer(),
                })
            })
            .collect()
    }
}

/// One row of the detailed session summary
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReview {
    /// 1-based position in the session
    pub position: usize,
    pub prompt: String,
    pub category: String,
    pub time_spent: u32,
    pub help_used: Option<HelpKind>,
    pub choice: AnswerChoice,
    pub is_correct: bool,
    pub correct_option: u8,
}
