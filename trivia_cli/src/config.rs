//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::path::PathBuf;
use std::time::Duration;
use trivia_engine::session::{ConfigError, SessionConfig};

/// Default location of the question pool
pub const DEFAULT_POOL_PATH: &str = "questions.json";

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Question pool file
    pub pool_path: PathBuf,
    /// Session rules
    pub session: SessionConfig,
}

/// Values given on the command line, taking priority over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub pool_path: Option<PathBuf>,
    pub time_per_question_secs: Option<u32>,
    pub batch_size: Option<usize>,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Errors
    ///
    /// Returns error if a variable is malformed or the result fails validation
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SessionConfig::default();

        let pool_path = overrides
            .pool_path
            .or_else(|| lookup("TRIVIA_POOL_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_POOL_PATH));

        let time_per_question_secs = match overrides.time_per_question_secs {
            Some(secs) => secs,
            None => parse_var_or(
                &lookup,
                "TRIVIA_TIME_PER_QUESTION",
                defaults.time_per_question_secs,
            )?,
        };

        let batch_size = match overrides.batch_size {
            Some(size) => size,
            None => parse_var_or(&lookup, "TRIVIA_BATCH_SIZE", defaults.batch_size)?,
        };

        let reveal_ms = parse_var_or(
            &lookup,
            "TRIVIA_REVEAL_MS",
            millis(defaults.reveal_window),
        )?;
        let skip_reveal_ms = parse_var_or(
            &lookup,
            "TRIVIA_SKIP_REVEAL_MS",
            millis(defaults.skip_reveal_window),
        )?;

        let config = CliConfig {
            pool_path,
            session: SessionConfig {
                time_per_question_secs,
                batch_size,
                reveal_window: Duration::from_millis(reveal_ms),
                skip_reveal_window: Duration::from_millis(skip_reveal_ms),
                ..defaults
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "TRIVIA_POOL_PATH".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }
        self.session.validate()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Parse a variable, falling back to `default` when unset
fn parse_var_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            field: key.to_string(),
            reason: format!("'{value}' is not a valid number"),
        }),
        None => Ok(default),
    }
}
