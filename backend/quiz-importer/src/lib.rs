pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod source;
pub mod store;
pub mod utils;

pub use config::Config;
pub use models::{ChapterId, ImportEvent, ImportResult, QuestionRecord, QuizPlan};
pub use services::{ChapterQuizPlanner, PlannerError, PlannerSettings};
pub use source::{JsonFileSource, QuestionSource, SourceError};
pub use store::{InMemoryQuizStore, MaterializedQuiz, MongoQuizStore, QuizMaterializer, StoreError};
