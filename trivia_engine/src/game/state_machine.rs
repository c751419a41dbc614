//! Quiz session state machine.
//!
//! [`GameState`] is the single source of truth for a session. It only
//! changes through [`GameState::apply`], which validates the action first
//! and leaves the state untouched when it rejects it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::constants::{
    OPTION_COUNT, POINTS_PER_CORRECT_ANSWER, STARTING_LIVES, TIME_PER_QUESTION_SECS,
};
use super::entities::{AnswerChoice, GameAnswer, HelpAvailability, HelpKind, Question};

/// Errors returned for rejected session actions
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("can't start a session without questions")]
    NoQuestions,
    #[error("no active session")]
    NotActive,
    #[error("question {} was already answered", .index + 1)]
    AlreadyAnswered { index: usize },
    #[error("current question hasn't been answered yet")]
    QuestionNotAnswered,
    #[error("{0} help is not available")]
    HelpUnavailable(HelpKind),
    #[error("input is locked while the answer is revealed")]
    InputLocked,
    #[error("option {0} was eliminated")]
    OptionEliminated(u8),
    #[error("option {0} does not exist")]
    InvalidOption(u8),
    #[error("session hasn't finished")]
    SessionNotFinished,
    #[error("session is closed")]
    SessionClosed,
}

/// Lifecycle phase derived from the active/finished flags
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Phase {
    Idle,
    Active,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Active => write!(f, "active"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}

/// Actions accepted by the state machine
#[derive(Clone, Debug, PartialEq)]
pub enum QuizAction {
    /// Replace the session. Questions are used in the given order.
    StartGame {
        questions: Vec<Question>,
        time_per_question: u32,
        lives: u8,
    },
    AnswerQuestion {
        choice: AnswerChoice,
        time_spent: u32,
        help_used: Option<HelpKind>,
    },
    UseHelp(HelpKind),
    NextQuestion,
    FinishGame,
    ResetGame,
}

impl QuizAction {
    /// Start with the default lives and time budget.
    #[must_use]
    pub fn start(questions: Vec<Question>) -> Self {
        Self::StartGame {
            questions,
            time_per_question: TIME_PER_QUESTION_SECS,
            lives: STARTING_LIVES,
        }
    }

    /// Answer with a real option and no help.
    #[must_use]
    pub fn answer(option: u8, time_spent: u32) -> Self {
        Self::AnswerQuestion {
            choice: AnswerChoice::Answered(option),
            time_spent,
            help_used: None,
        }
    }
}

/// Events that occur during a session
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum QuizEvent {
    Started { questions: usize },
    Answered { index: usize, choice: AnswerChoice, correct: bool },
    TimeExpired { index: usize },
    HelpUsed(HelpKind),
    Eliminated([u8; 2]),
    Hint(String),
    Skipped { index: usize },
    Advanced { index: usize },
    Finished { score: u32 },
    Reset,
}

impl fmt::Display for QuizEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Started { questions } => format!("quiz started with {questions} questions"),
            Self::Answered {
                choice, correct, ..
            } => {
                if *correct {
                    format!("{choice} is correct! +{POINTS_PER_CORRECT_ANSWER} points")
                } else {
                    match choice {
                        AnswerChoice::Answered(_) => format!("{choice} is wrong"),
                        AnswerChoice::TimedOut => "no answer given".to_string(),
                        AnswerChoice::Skipped => "question skipped".to_string(),
                    }
                }
            }
            Self::TimeExpired { index } => format!("time's up on question {}", index + 1),
            Self::HelpUsed(kind) => format!("{kind} used"),
            Self::Eliminated(_) => "two incorrect options were eliminated".to_string(),
            Self::Hint(text) => format!("hint: {text}"),
            Self::Skipped { index } => {
                format!("question {} skipped, moving on", index + 1)
            }
            Self::Advanced { index } => format!("question {}", index + 1),
            Self::Finished { score } => format!("quiz finished with {score} points"),
            Self::Reset => "quiz reset".to_string(),
        };
        write!(f, "{repr}")
    }
}

/// The aggregate root of a quiz session.
///
/// `GameState::default()` is the idle state. Starting a session replaces the
/// whole value; resetting restores the default.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Fixed at session start.
    questions: Vec<Question>,
    current_question_index: usize,
    score: u32,
    lives: u8,
    time_per_question: u32,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    /// One entry per resolved question, in visitation order.
    answers: Vec<GameAnswer>,
    helps: HelpAvailability,
    is_active: bool,
    is_finished: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            current_question_index: 0,
            score: 0,
            lives: STARTING_LIVES,
            time_per_question: TIME_PER_QUESTION_SECS,
            start_time: DateTime::<Utc>::UNIX_EPOCH,
            end_time: None,
            answers: Vec::new(),
            helps: HelpAvailability::default(),
            is_active: false,
            is_finished: false,
        }
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action at wall time `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`GameError`] when the action is invalid for the current
    /// state. The state is unchanged in that case.
    pub fn apply(
        &mut self,
        action: QuizAction,
        now: DateTime<Utc>,
    ) -> Result<Vec<QuizEvent>, GameError> {
        match action {
            QuizAction::StartGame {
                questions,
                time_per_question,
                lives,
            } => self.start_game(questions, time_per_question, lives, now),
            QuizAction::AnswerQuestion {
                choice,
                time_spent,
                help_used,
            } => self.answer_question(choice, time_spent, help_used),
            QuizAction::UseHelp(kind) => self.use_help(kind),
            QuizAction::NextQuestion => self.next_question(now),
            QuizAction::FinishGame => self.finish_game(now),
            QuizAction::ResetGame => Ok(self.reset_game()),
        }
    }

    fn start_game(
        &mut self,
        questions: Vec<Question>,
        time_per_question: u32,
        lives: u8,
        now: DateTime<Utc>,
    ) -> Result<Vec<QuizEvent>, GameError> {
        if questions.is_empty() {
            return Err(GameError::NoQuestions);
        }

        let count = questions.len();
        *self = Self {
            questions,
            lives,
            time_per_question,
            start_time: now,
            is_active: true,
            ..Self::default()
        };
        Ok(vec![QuizEvent::Started { questions: count }])
    }

    fn answer_question(
        &mut self,
        choice: AnswerChoice,
        time_spent: u32,
        help_used: Option<HelpKind>,
    ) -> Result<Vec<QuizEvent>, GameError> {
        let index = self.ensure_unanswered()?;
        if let AnswerChoice::Answered(option) = choice
            && usize::from(option) >= OPTION_COUNT
        {
            return Err(GameError::InvalidOption(option));
        }
        let question = self.questions.get(index).ok_or(GameError::NotActive)?;

        let is_correct = question.is_correct(choice);
        let answer = GameAnswer {
            question_id: question.id().clone(),
            choice,
            is_correct,
            time_spent,
            help_used,
        };

        if is_correct {
            self.score += POINTS_PER_CORRECT_ANSWER;
        } else {
            self.lives = self.lives.saturating_sub(1);
        }
        self.answers.push(answer);

        Ok(vec![QuizEvent::Answered {
            index,
            choice,
            correct: is_correct,
        }])
    }

    fn use_help(&mut self, kind: HelpKind) -> Result<Vec<QuizEvent>, GameError> {
        self.ensure_unanswered()?;
        if !self.helps.consume(kind) {
            return Err(GameError::HelpUnavailable(kind));
        }
        Ok(vec![QuizEvent::HelpUsed(kind)])
    }

    fn next_question(&mut self, now: DateTime<Utc>) -> Result<Vec<QuizEvent>, GameError> {
        if !self.is_active {
            return Err(GameError::NotActive);
        }
        if !self.is_current_answered() {
            return Err(GameError::QuestionNotAnswered);
        }

        self.current_question_index += 1;
        if self.current_question_index >= self.questions.len() || self.lives == 0 {
            self.is_active = false;
            self.is_finished = true;
            self.end_time = Some(now);
            return Ok(vec![QuizEvent::Finished { score: self.score }]);
        }

        Ok(vec![QuizEvent::Advanced {
            index: self.current_question_index,
        }])
    }

    fn finish_game(&mut self, now: DateTime<Utc>) -> Result<Vec<QuizEvent>, GameError> {
        match self.phase() {
            Phase::Idle => Err(GameError::NotActive),
            Phase::Finished => Ok(Vec::new()),
            Phase::Active => {
                // Step past an answered question so the log and index agree.
                self.current_question_index = self.answers.len();
                self.is_active = false;
                self.is_finished = true;
                self.end_time.get_or_insert(now);
                Ok(vec![QuizEvent::Finished { score: self.score }])
            }
        }
    }

    fn reset_game(&mut self) -> Vec<QuizEvent> {
        *self = Self::default();
        vec![QuizEvent::Reset]
    }

    /// Index of the current question if it is still open for an answer.
    fn ensure_unanswered(&self) -> Result<usize, GameError> {
        if !self.is_active {
            return Err(GameError::NotActive);
        }
        let index = self.current_question_index;
        if self.is_current_answered() {
            return Err(GameError::AlreadyAnswered { index });
        }
        Ok(index)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.is_active, self.is_finished) {
            (true, _) => Phase::Active,
            (false, true) => Phase::Finished,
            (false, false) => Phase::Idle,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The visible question while the session is active.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_active {
            self.questions.get(self.current_question_index)
        } else {
            None
        }
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    /// Whether the answer log already holds an entry for the current index.
    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.answers.len() > self.current_question_index
    }

    /// Whether the current question is the last one of the session.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn lives(&self) -> u8 {
        self.lives
    }

    #[must_use]
    pub fn time_per_question(&self) -> u32 {
        self.time_per_question
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    #[must_use]
    pub fn answers(&self) -> &[GameAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn helps(&self) -> HelpAvailability {
        self.helps
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_finished
    }
}
