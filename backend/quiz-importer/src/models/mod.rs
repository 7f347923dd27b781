pub mod import;
pub mod question;
pub mod quiz;

pub use import::{ImportEvent, ImportResult};
pub use question::{ChapterId, QuestionRecord};
pub use quiz::{
    FrontendQuestion, OptionDocument, QuestionDocument, QuizDocument, QuizPlan, StoreSummary,
    TopicRecord,
};
