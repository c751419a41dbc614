use std::fmt;
use trivia_engine::{
    Difficulty, HelpKind, QuestionDraft,
    constants::OPTION_COUNT,
};

/// Errors that can occur while parsing player or authoring input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not an option letter or number.
    InvalidOption(String),
    /// `--options` didn't split into exactly four options.
    WrongOptionCount(usize),
    /// Unknown difficulty name.
    InvalidDifficulty(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOption(value) => write!(
                f,
                "Invalid option '{}'. Use a letter A-D or a number 1-4",
                value
            ),
            Self::WrongOptionCount(count) => write!(
                f,
                "Expected {} options separated by '|', got {}",
                OPTION_COUNT, count
            ),
            Self::InvalidDifficulty(value) => write!(
                f,
                "Invalid difficulty '{}'. Use easy, medium or hard",
                value
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type '?' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// What the player typed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// Select an option (0-based).
    Answer(u8),
    /// Use a help on the visible question.
    Help(HelpKind),
    /// Show the current question again.
    Status,
    /// Show the command list.
    Commands,
    /// Stop and show the result.
    Quit,
}

pub const PLAY_COMMANDS: &str = "\
  a-d or 1-4   answer
  5            50/50 (remove two wrong options)
  s            skip the question
  h            show a hint
  ?            show these commands
  .            show the question again
  q            finish the quiz
";

/// Parse one line of player input.
///
/// # Examples
///
/// ```
/// use trivia_cli::commands::{parse_play_command, PlayCommand};
/// use trivia_engine::HelpKind;
///
/// assert_eq!(parse_play_command("b"), Ok(PlayCommand::Answer(1)));
/// assert_eq!(parse_play_command("4"), Ok(PlayCommand::Answer(3)));
/// assert_eq!(parse_play_command("skip"), Ok(PlayCommand::Help(HelpKind::Skip)));
/// ```
pub fn parse_play_command(input: &str) -> Result<PlayCommand, ParseError> {
    let trimmed = input.trim().to_lowercase();

    match trimmed.as_str() {
        "5" | "50" | "50/50" | "5050" => return Ok(PlayCommand::Help(HelpKind::FiftyFifty)),
        "s" | "skip" => return Ok(PlayCommand::Help(HelpKind::Skip)),
        "h" | "hint" => return Ok(PlayCommand::Help(HelpKind::Hint)),
        "?" | "help" => return Ok(PlayCommand::Commands),
        "." | "status" | "" => return Ok(PlayCommand::Status),
        "q" | "quit" | "exit" => return Ok(PlayCommand::Quit),
        _ => {}
    }

    parse_option(&trimmed)
        .map(PlayCommand::Answer)
        .map_err(|_| ParseError::UnrecognizedCommand(input.trim().to_string()))
}

/// Parse an option given as a letter (A-D) or a 1-based number (1-4).
pub fn parse_option(input: &str) -> Result<u8, ParseError> {
    let trimmed = input.trim();
    let invalid = || ParseError::InvalidOption(trimmed.to_string());

    let mut chars = trimmed.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(invalid());
    };

    let index = match c.to_ascii_lowercase() {
        letter @ 'a'..='d' => letter as u8 - b'a',
        digit @ '1'..='4' => digit as u8 - b'1',
        _ => return Err(invalid()),
    };
    Ok(index)
}

/// Split `A|B|C|D` into the four options.
pub fn parse_options(input: &str) -> Result<[String; OPTION_COUNT], ParseError> {
    let parts: Vec<String> = input.split('|').map(|s| s.trim().to_string()).collect();
    let count = parts.len();
    parts
        .try_into()
        .map_err(|_| ParseError::WrongOptionCount(count))
}

/// Arguments of the `add` subcommand before validation.
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub question: String,
    pub options: String,
    pub correct: String,
    pub category: String,
    pub difficulty: Option<String>,
    pub hint: Option<String>,
}

/// Turn `add` arguments into a draft. Field validation happens in the pool.
pub fn build_draft(args: AddArgs) -> Result<QuestionDraft, ParseError> {
    let difficulty = match args.difficulty {
        Some(value) => value
            .parse::<Difficulty>()
            .map_err(|_| ParseError::InvalidDifficulty(value))?,
        None => Difficulty::default(),
    };

    Ok(QuestionDraft {
        question: args.question,
        options: parse_options(&args.options)?,
        correct_answer: parse_option(&args.correct)?,
        category: args.category,
        difficulty,
        hint: args.hint,
    })
}
