//! The help subsystem.
//!
//! Each help is its own type implementing [`Assist`]; [`Help`] dispatches
//! over them with `enum_dispatch`. Applying a help never touches
//! [`GameState`](super::GameState): consuming the help is the state
//! machine's job, computing what the player sees is done here.

use enum_dispatch::enum_dispatch;
use rand::{RngCore, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::{
    constants::{HINT_FALLBACK, OPTION_COUNT},
    entities::{HelpKind, Question},
};

/// What the player gets back from a help.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum HelpOutcome {
    /// Two incorrect options removed for the current question.
    Eliminated([u8; 2]),
    /// The current question is given up on.
    Skip,
    /// Text to show once.
    Hint(String),
}

#[enum_dispatch]
pub trait Assist {
    fn kind(&self) -> HelpKind;

    fn apply(&self, question: &Question, rng: &mut dyn RngCore) -> HelpOutcome;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FiftyFifty;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Skip;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Hint;

#[enum_dispatch(Assist)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Help {
    FiftyFifty,
    Skip,
    Hint,
}

impl From<HelpKind> for Help {
    fn from(value: HelpKind) -> Self {
        match value {
            HelpKind::FiftyFifty => FiftyFifty.into(),
            HelpKind::Skip => Skip.into(),
            HelpKind::Hint => Hint.into(),
        }
    }
}

impl Assist for FiftyFifty {
    fn kind(&self) -> HelpKind {
        HelpKind::FiftyFifty
    }

    /// Picks two of the three wrong options uniformly at random.
    fn apply(&self, question: &Question, rng: &mut dyn RngCore) -> HelpOutcome {
        let correct = question.correct_answer();
        let mut wrong: Vec<u8> = (0u8..)
            .take(OPTION_COUNT)
            .filter(|&index| index != correct)
            .collect();
        wrong.shuffle(rng);

        let mut eliminated = [wrong[0], wrong[1]];
        eliminated.sort_unstable();
        HelpOutcome::Eliminated(eliminated)
    }
}

impl Assist for Skip {
    fn kind(&self) -> HelpKind {
        HelpKind::Skip
    }

    fn apply(&self, _question: &Question, _rng: &mut dyn RngCore) -> HelpOutcome {
        HelpOutcome::Skip
    }
}

impl Assist for Hint {
    fn kind(&self) -> HelpKind {
        HelpKind::Hint
    }

    fn apply(&self, question: &Question, _rng: &mut dyn RngCore) -> HelpOutcome {
        let text = question.hint().unwrap_or(HINT_FALLBACK);
        HelpOutcome::Hint(text.to_string())
    }
}
