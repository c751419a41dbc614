//! Wall clock for session timestamps.
//!
//! Only `GameState::start_time`/`end_time` read it; question timing runs on
//! the monotonic instants passed to the orchestrator.

use chrono::{DateTime, Duration, Utc};

/// Source of session start and end timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// `Utc::now()`, used by real sessions
    #[default]
    System,
    /// Pinned time so results have exact `total_time_secs` in tests
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Move a pinned clock forward, e.g. between answering and finishing.
    /// The system clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut clock = Clock::fixed(start);
        clock.advance(Duration::seconds(42));
        assert_eq!(clock.now(), start + Duration::seconds(42));
    }

    #[test]
    fn test_system_clock_ignores_advance() {
        let mut clock = Clock::System;
        clock.advance(Duration::days(365));
        assert!(clock.now() <= Utc::now());
    }
}
