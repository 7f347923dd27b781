use crate::models::QuizPlan;
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryQuizStore;
pub use mongo::MongoQuizStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quiz '{0}' already exists")]
    DuplicateTitle(String),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("{0}")]
    Rejected(String),
}

/// A quiz that was written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedQuiz {
    pub title: String,
    pub question_count: usize,
}

/// Persistence boundary of the importer: a title lookup used as the
/// de-duplication key, and an atomic "create this quiz" call.
pub trait QuizMaterializer {
    /// Whether a quiz with exactly this title is already stored.
    fn exists(&self, title: &str) -> Result<bool, StoreError>;

    /// Stores the quiz header, one question per record and its options,
    /// or nothing at all.
    fn create(&mut self, plan: &QuizPlan) -> Result<MaterializedQuiz, StoreError>;
}
