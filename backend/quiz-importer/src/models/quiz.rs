use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::question::{ChapterId, QuestionRecord};

/// A quiz planned for one chapter, handed to a [`crate::store::QuizMaterializer`].
#[derive(Debug, Clone)]
pub struct QuizPlan {
    pub title: String,
    pub topic_name: String,
    pub system_category: Option<String>,
    pub chapter_id: ChapterId,
    pub quiz_number: usize,
    pub questions: Vec<QuestionRecord>,
}

/// Quiz as persisted in the `quizzes` collection. Questions and options are
/// embedded so a quiz is written with a single insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub system_categories: Vec<String>,
    pub chapter_id: ChapterId,
    pub import_run_id: String,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: BsonDateTime,
    #[serde(default)]
    pub questions: Vec<QuestionDocument>,
}

impl QuizDocument {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn option_count(&self) -> usize {
        self.questions.iter().map(|q| q.options.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDocument {
    pub text: String,
    /// 1-based
    pub position: usize,
    pub chapter_no: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    pub options: Vec<OptionDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDocument {
    pub text: String,
    /// 1-based
    pub position: usize,
    pub is_correct: bool,
}

/// Topic record in the `topics` collection (get-or-create by name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
}

/// Question shape consumed by the quiz-taking widget (0-based answer index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendQuestion {
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "answerIndex")]
    pub answer_index: usize,
}

/// Totals reported by a store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreSummary {
    pub quizzes: u64,
    pub questions: u64,
    pub options: u64,
    pub topics: u64,
    /// (title, question count), ordered by title
    pub quiz_sizes: Vec<(String, usize)>,
}

impl StoreSummary {
    pub fn log(&self) {
        info!("Total quizzes: {}", self.quizzes);
        info!("Total questions: {}", self.questions);
        info!("Total options: {}", self.options);
        info!("Total topics: {}", self.topics);
        for (title, count) in &self.quiz_sizes {
            info!("- {}: {} questions", title, count);
        }
    }
}
