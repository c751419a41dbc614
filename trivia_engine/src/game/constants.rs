//! Game rules shared by the state machine and the session orchestrator.

use std::time::Duration;

/// Points awarded for a correct answer.
pub const POINTS_PER_CORRECT_ANSWER: u32 = 100;

/// Lives at the start of every session.
pub const STARTING_LIVES: u8 = 3;

/// Per-question time budget in seconds.
pub const TIME_PER_QUESTION_SECS: u32 = 30;

/// Every question has exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// How long the correct answer stays visible after a manual or timed-out answer.
pub const REVEAL_WINDOW: Duration = Duration::from_secs(2);

/// How long the reveal lasts after a skip.
pub const SKIP_REVEAL_WINDOW: Duration = Duration::from_secs(1);

/// Maximum number of questions drawn from the pool for one session.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Shown by the hint help when the question has no authored hint.
pub const HINT_FALLBACK: &str =
    "This question has no specific hint. Read every option carefully!";
