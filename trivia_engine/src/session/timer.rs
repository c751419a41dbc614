//! Per-question countdown and the reveal window.
//!
//! Both are driven by the [`Instant`] passed into every call, so tests can
//! step time explicitly and the actor can use tokio's (pausable) clock.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Result of a countdown tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running (stopped after an answer, or never started)
    Idle,
    /// Seconds left
    Running(u32),
    /// Budget used up. Reported once, then the countdown stops.
    Expired,
}

/// Countdown for the visible question
#[derive(Clone, Debug)]
pub struct Countdown {
    budget: u32,
    remaining: u32,
    started_at: Instant,
    running: bool,
}

impl Countdown {
    /// Create a stopped countdown with the given budget in seconds
    pub fn new(budget: u32, at: Instant) -> Self {
        Self {
            budget,
            remaining: budget,
            started_at: at,
            running: false,
        }
    }

    /// Start over with the full budget
    pub fn restart(&mut self, budget: u32, at: Instant) {
        self.budget = budget;
        self.remaining = budget;
        self.started_at = at;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Whole seconds since the question became visible, capped at the budget
    pub fn elapsed_secs(&self, at: Instant) -> u32 {
        let secs = at.saturating_duration_since(self.started_at).as_secs();
        u32::try_from(secs).unwrap_or(u32::MAX).min(self.budget)
    }

    /// Recompute the remaining seconds at `at`
    pub fn tick(&mut self, at: Instant) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining = self.budget - self.elapsed_secs(at);
        if self.remaining == 0 {
            self.running = false;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining)
        }
    }
}

/// Identifies one scheduled reveal-to-advance callback
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct RevealToken(u64);

/// A reveal window waiting to elapse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingAdvance {
    pub token: RevealToken,
    pub question_index: usize,
    pub deadline: Instant,
}

/// Tracks the single pending reveal window.
///
/// Opening a new window or cancelling invalidates the previous token, so a
/// callback that fires late is recognised as stale and ignored.
#[derive(Clone, Debug, Default)]
pub struct RevealWindow {
    pending: Option<PendingAdvance>,
    next_token: u64,
}

impl RevealWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a window for the question at `question_index`
    pub fn open(&mut self, question_index: usize, at: Instant, length: Duration) -> RevealToken {
        self.next_token += 1;
        let token = RevealToken(self.next_token);
        self.pending = Some(PendingAdvance {
            token,
            question_index,
            deadline: at + length,
        });
        token
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Close the window if `token` is current and its deadline has passed
    pub fn take_due(&mut self, token: RevealToken, at: Instant) -> Option<PendingAdvance> {
        match self.pending {
            Some(pending) if pending.token == token && at >= pending.deadline => {
                self.pending = None;
                Some(pending)
            }
            _ => None,
        }
    }

    /// Drop the pending window, returning its token
    pub fn cancel(&mut self) -> Option<RevealToken> {
        self.pending.take().map(|pending| pending.token)
    }
}
