//! Session module providing timing and orchestration around the quiz FSM.
//!
//! This module implements:
//! - Countdown: per-question time budget driven by monotonic instants
//! - RevealWindow: the cancellable delay between an answer and the advance
//! - Orchestrator: synchronous driver of the state machine that returns
//!   effects instead of touching timers itself
//! - SessionActor: async actor owning an orchestrator, serializing user
//!   actions and timer ticks through one mpsc inbox
//!
//! ## Architecture
//!
//! The actor runs in its own Tokio task. A one second interval and user
//! messages race in a `select!` loop, but only the actor mutates the
//! session, so a late tick can never double-submit an answer.
//!
//! ## Example
//!
//! ```ignore
//! use trivia_engine::session::{SessionActor, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, handle) = SessionActor::new(SessionConfig::default())?;
//!
//!     // Spawn session actor
//!     tokio::spawn(actor.run());
//!
//!     // Use handle to drive the session
//!     // handle.start(questions).await?;
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod clock;
pub mod config;
pub mod messages;
pub mod orchestrator;
pub mod timer;

pub use actor::{SessionActor, SessionHandle};
pub use clock::Clock;
pub use config::{ConfigError, SessionConfig};
pub use messages::{SessionMessage, SessionSnapshot};
pub use orchestrator::{Effect, Orchestrator};
pub use timer::{Countdown, RevealToken, RevealWindow, TickOutcome};
