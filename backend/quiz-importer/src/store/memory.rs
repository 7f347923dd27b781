use std::collections::{BTreeMap, BTreeSet, HashSet};

use uuid::Uuid;

use super::{MaterializedQuiz, QuizMaterializer, StoreError};
use crate::models::{QuizDocument, QuizPlan, StoreSummary};
use crate::services::transform::plan_to_document;

/// Quiz store kept in process memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryQuizStore {
    quizzes: BTreeMap<String, QuizDocument>,
    topics: BTreeSet<String>,
    rejected_titles: HashSet<String>,
    import_run_id: String,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self {
            import_run_id: Uuid::new_v4().to_string(),
            ..Self::default()
        }
    }

    /// Makes `create` fail for this title, simulating a persistence error.
    pub fn reject_title(&mut self, title: impl Into<String>) {
        self.rejected_titles.insert(title.into());
    }

    pub fn get(&self, title: &str) -> Option<&QuizDocument> {
        self.quizzes.get(title)
    }

    pub fn quizzes(&self) -> impl Iterator<Item = &QuizDocument> {
        self.quizzes.values()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.quizzes.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            quizzes: self.quizzes.len() as u64,
            questions: self.quizzes().map(|q| q.question_count() as u64).sum(),
            options: self.quizzes().map(|q| q.option_count() as u64).sum(),
            topics: self.topics.len() as u64,
            quiz_sizes: self
                .quizzes()
                .map(|q| (q.title.clone(), q.question_count()))
                .collect(),
        }
    }
}

impl QuizMaterializer for InMemoryQuizStore {
    fn exists(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self.quizzes.contains_key(title))
    }

    fn create(&mut self, plan: &QuizPlan) -> Result<MaterializedQuiz, StoreError> {
        if self.rejected_titles.contains(&plan.title) {
            return Err(StoreError::Rejected(format!(
                "store rejected quiz '{}'",
                plan.title
            )));
        }
        if self.quizzes.contains_key(&plan.title) {
            return Err(StoreError::DuplicateTitle(plan.title.clone()));
        }

        let document = plan_to_document(plan, &self.import_run_id);
        if let Some(topic) = &document.topic {
            self.topics.insert(topic.clone());
        }

        let materialized = MaterializedQuiz {
            title: document.title.clone(),
            question_count: document.question_count(),
        };
        self.quizzes.insert(document.title.clone(), document);

        Ok(materialized)
    }
}
