//! Question pool implementations.

use std::collections::HashSet;
use std::path::PathBuf;

use super::{
    QuestionPool,
    errors::{PoolError, PoolResult},
    store::JsonRecordStore,
};
use crate::game::{Question, QuestionDraft, QuestionId};

/// Pool kept in memory only
#[derive(Clone, Debug, Default)]
pub struct InMemoryPool {
    questions: Vec<Question>,
}

impl InMemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool seeded with already validated questions
    ///
    /// # Errors
    ///
    /// Returns `PoolError::DuplicateId` if two questions share an id.
    pub fn with_questions(questions: Vec<Question>) -> PoolResult<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(PoolError::DuplicateId(dup.id().clone()));
        }
        Ok(Self { questions })
    }

    fn position(&self, id: &QuestionId) -> PoolResult<usize> {
        self.questions
            .iter()
            .position(|q| q.id() == id)
            .ok_or_else(|| PoolError::NotFound(id.clone()))
    }
}

impl QuestionPool for InMemoryPool {
    fn list(&self) -> &[Question] {
        &self.questions
    }

    fn add(&mut self, draft: QuestionDraft) -> PoolResult<Question> {
        let question = Question::new(QuestionId::generate(), draft)?;
        self.questions.push(question.clone());
        Ok(question)
    }

    fn remove(&mut self, id: &QuestionId) -> PoolResult<Question> {
        let index = self.position(id)?;
        Ok(self.questions.remove(index))
    }
}

/// Pool persisted as a JSON array.
///
/// Every mutation rewrites the file; the in-memory copy only changes once
/// the write succeeded.
#[derive(Debug)]
pub struct FilePool {
    store: JsonRecordStore<Question>,
    inner: InMemoryPool,
}

impl FilePool {
    /// Open the pool at `path`. A missing file is an empty pool.
    ///
    /// # Errors
    ///
    /// Fails when the file can't be read, isn't JSON, holds an invalid
    /// question, or repeats an id.
    pub fn open(path: impl Into<PathBuf>) -> PoolResult<Self> {
        let store = JsonRecordStore::new(path);
        let inner = InMemoryPool::with_questions(store.load()?)?;
        log::info!(
            "Loaded {} questions from {}",
            inner.len(),
            store.path().display()
        );

        Ok(Self { store, inner })
    }

    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }

    fn commit(&mut self, next: InMemoryPool) -> PoolResult<()> {
        self.store.save(next.list())?;
        self.inner = next;
        Ok(())
    }
}

impl QuestionPool for FilePool {
    fn list(&self) -> &[Question] {
        self.inner.list()
    }

    fn add(&mut self, draft: QuestionDraft) -> PoolResult<Question> {
        let mut next = self.inner.clone();
        let question = next.add(draft)?;
        self.commit(next)?;
        log::debug!("Added question {}", question.id());
        Ok(question)
    }

    fn remove(&mut self, id: &QuestionId) -> PoolResult<Question> {
        let mut next = self.inner.clone();
        let question = next.remove(id)?;
        self.commit(next)?;
        log::debug!("Removed question {id}");
        Ok(question)
    }
}
