//! Question pool module.
//!
//! The pool is the authored question set a session draws from. The engine
//! only reads it at session start; authoring goes through [`QuestionPool`].
//!
//! ## Example
//!
//! ```no_run
//! use trivia_engine::pool::{FilePool, QuestionPool, select_batch};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = FilePool::open("questions.json")?;
//!     let batch = select_batch(pool.list(), 10, &mut rand::rng());
//!     println!("{} questions selected", batch.len());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod store;

pub use errors::{PoolError, PoolResult};
pub use manager::{FilePool, InMemoryPool};
pub use store::JsonRecordStore;

use rand::{Rng, seq::IndexedRandom};

use crate::game::{Question, QuestionDraft, QuestionId};

/// Authoring access to a question pool
pub trait QuestionPool {
    /// Questions in authoring order
    fn list(&self) -> &[Question];

    /// Validate a draft and append it under a fresh id
    fn add(&mut self, draft: QuestionDraft) -> PoolResult<Question>;

    /// Remove a question, returning it
    fn remove(&mut self, id: &QuestionId) -> PoolResult<Question>;

    fn len(&self) -> usize {
        self.list().len()
    }

    fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.list().iter().find(|q| q.id() == id)
    }
}

/// Pick the questions for one session.
///
/// Returns the whole pool when it holds at most `max` questions, otherwise a
/// uniform random sample of `max`. Order is left to the session shuffle.
pub fn select_batch<R: Rng + ?Sized>(pool: &[Question], max: usize, rng: &mut R) -> Vec<Question> {
    if pool.len() <= max {
        return pool.to_vec();
    }
    pool.choose_multiple(rng, max).cloned().collect()
}
