//! Question order randomization.

use rand::{Rng, seq::SliceRandom};
use std::collections::HashSet;

use super::entities::{Question, QuestionId};

/// Shuffles session questions so consecutive sessions never repeat an order.
#[derive(Debug, Default)]
pub struct QuestionShuffler {
    /// Order presented by the previous session
    last_order: Vec<QuestionId>,
}

impl QuestionShuffler {
    /// Create a new shuffler with no session history
    pub fn new() -> Self {
        Self::default()
    }

    /// Order questions for a new session
    ///
    /// Uses a Fisher-Yates shuffle and draws again whenever the questions
    /// shared with the previous session would come out in the same relative
    /// order. With fewer than two shared questions any order is accepted.
    ///
    /// # Arguments
    ///
    /// * `questions` - Questions selected for the session
    /// * `rng` - Random source
    ///
    /// # Returns
    ///
    /// * `Vec<Question>` - The same questions in session order
    pub fn shuffle<R: Rng + ?Sized>(
        &mut self,
        mut questions: Vec<Question>,
        rng: &mut R,
    ) -> Vec<Question> {
        loop {
            questions.shuffle(rng);
            if !self.repeats_last_order(&questions) {
                break;
            }
        }

        self.last_order = questions.iter().map(|q| q.id().clone()).collect();
        questions
    }

    /// Order presented by the previous session
    pub fn last_order(&self) -> &[QuestionId] {
        &self.last_order
    }

    fn repeats_last_order(&self, questions: &[Question]) -> bool {
        let current: HashSet<&QuestionId> = questions.iter().map(Question::id).collect();
        let previous: HashSet<&QuestionId> = self.last_order.iter().collect();

        let shared_now = first_occurrences(questions.iter().map(Question::id), &previous);
        // a repeated id can't be reordered against itself
        if shared_now.len() < 2 {
            return false;
        }

        let shared_before = first_occurrences(self.last_order.iter(), &current);
        shared_now == shared_before
    }
}

/// Distinct ids from `ids` that are also in `keep`, in first-seen order
fn first_occurrences<'a>(
    ids: impl Iterator<Item = &'a QuestionId>,
    keep: &HashSet<&QuestionId>,
) -> Vec<&'a QuestionId> {
    let mut seen = HashSet::new();
    ids.filter(|id| keep.contains(*id) && seen.insert(*id))
        .collect()
}
