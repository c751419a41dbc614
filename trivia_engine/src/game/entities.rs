use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

use super::constants::OPTION_COUNT;

/// Errors raised while authoring a question.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum QuestionError {
    #[error("question text can't be blank")]
    BlankPrompt,
    #[error("option {0} can't be blank")]
    BlankOption(u8),
    #[error("category can't be blank")]
    BlankCategory,
    #[error("correct option {0} is out of range")]
    CorrectOptionOutOfRange(u8),
    #[error("unknown difficulty {0:?}")]
    UnknownDifficulty(String),
}

/// Letter shown for an option index (0 -> 'A').
#[must_use]
pub fn option_letter(index: u8) -> char {
    char::from(b'A'.saturating_add(index))
}

/// Stable, unique question identifier.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    /// A fresh random identifier for newly authored questions.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Difficulty tier of a question.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// User-supplied question data before it has an identifier.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: u8,
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// An authored multiple-choice question. Immutable once created.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    question: String,
    options: [String; OPTION_COUNT],
    correct_answer: u8,
    category: String,
    difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

/// On-disk shape of a question; validated on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: QuestionId,
    #[serde(flatten)]
    draft: QuestionDraft,
}

impl<'de> Deserialize<'de> for Question {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = QuestionRecord::deserialize(deserializer)?;
        Question::new(record.id, record.draft).map_err(serde::de::Error::custom)
    }
}

impl Question {
    /// Validate a draft and turn it into a question.
    ///
    /// Blank text fields are rejected and a blank hint becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`QuestionError`] describing the first invalid field.
    pub fn new(id: QuestionId, draft: QuestionDraft) -> Result<Self, QuestionError> {
        if draft.question.trim().is_empty() {
            return Err(QuestionError::BlankPrompt);
        }
        for (index, option) in (0u8..).zip(draft.options.iter()) {
            if option.trim().is_empty() {
                return Err(QuestionError::BlankOption(index));
            }
        }
        if draft.category.trim().is_empty() {
            return Err(QuestionError::BlankCategory);
        }
        if usize::from(draft.correct_answer) >= OPTION_COUNT {
            return Err(QuestionError::CorrectOptionOutOfRange(draft.correct_answer));
        }

        let hint = draft
            .hint
            .map(|hint| hint.trim().to_string())
            .filter(|hint| !hint.is_empty());

        Ok(Self {
            id,
            question: draft.question.trim().to_string(),
            options: draft.options.map(|option| option.trim().to_string()),
            correct_answer: draft.correct_answer,
            category: draft.category.trim().to_string(),
            difficulty: draft.difficulty,
            hint,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> u8 {
        self.correct_answer
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Whether `choice` selects the correct option. Sentinels never do.
    #[must_use]
    pub fn is_correct(&self, choice: AnswerChoice) -> bool {
        choice.option() == Some(self.correct_answer)
    }
}

/// What the player ended up doing with a question.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerChoice {
    /// A real option, index-addressed.
    Answered(u8),
    /// The countdown ran out.
    TimedOut,
    /// The skip help was used.
    Skipped,
}

impl AnswerChoice {
    /// The selected option index, if a real option was chosen.
    #[must_use]
    pub fn option(&self) -> Option<u8> {
        match self {
            AnswerChoice::Answered(index) => Some(*index),
            AnswerChoice::TimedOut | AnswerChoice::Skipped => None,
        }
    }
}

impl fmt::Display for AnswerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerChoice::Answered(index) => write!(f, "{}", option_letter(*index)),
            AnswerChoice::TimedOut => write!(f, "timed out"),
            AnswerChoice::Skipped => write!(f, "skipped"),
        }
    }
}

/// The three once-per-session helps.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HelpKind {
    FiftyFifty,
    Skip,
    Hint,
}

impl HelpKind {
    pub const ALL: [HelpKind; 3] = [HelpKind::FiftyFifty, HelpKind::Skip, HelpKind::Hint];
}

impl fmt::Display for HelpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HelpKind::FiftyFifty => write!(f, "50/50"),
            HelpKind::Skip => write!(f, "skip"),
            HelpKind::Hint => write!(f, "hint"),
        }
    }
}

/// Which helps are still available in the current session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpAvailability {
    pub fifty_fifty: bool,
    pub skip: bool,
    pub hint: bool,
}

impl Default for HelpAvailability {
    fn default() -> Self {
        Self {
            fifty_fifty: true,
            skip: true,
            hint: true,
        }
    }
}

impl HelpAvailability {
    #[must_use]
    pub fn is_available(&self, kind: HelpKind) -> bool {
        match kind {
            HelpKind::FiftyFifty => self.fifty_fifty,
            HelpKind::Skip => self.skip,
            HelpKind::Hint => self.hint,
        }
    }

    /// Mark a help as used. Returns false if it was already gone.
    pub fn consume(&mut self, kind: HelpKind) -> bool {
        let slot = match kind {
            HelpKind::FiftyFifty => &mut self.fifty_fifty,
            HelpKind::Skip => &mut self.skip,
            HelpKind::Hint => &mut self.hint,
        };
        std::mem::replace(slot, false)
    }

    /// Helps consumed so far, in declaration order.
    #[must_use]
    pub fn used(&self) -> Vec<HelpKind> {
        HelpKind::ALL
            .into_iter()
            .filter(|kind| !self.is_available(*kind))
            .collect()
    }
}

/// One resolved question in the session log.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAnswer {
    pub question_id: QuestionId,
    pub choice: AnswerChoice,
    pub is_correct: bool,
    /// Whole seconds spent on the question.
    pub time_spent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_used: Option<HelpKind>,
}
