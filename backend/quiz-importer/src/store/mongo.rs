use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    sync::{Client, Collection, Database},
    IndexModel,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::{MaterializedQuiz, QuizMaterializer, StoreError};
use crate::metrics::track_db_operation;
use crate::models::{QuizDocument, QuizPlan, StoreSummary, TopicRecord};
use crate::services::transform::plan_to_document;

const QUIZZES_COLLECTION: &str = "quizzes";
const TOPICS_COLLECTION: &str = "topics";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Quiz store backed by MongoDB, using the driver's blocking API.
///
/// A quiz is one document with its questions and options embedded, so a
/// single `insert_one` either stores all of it or nothing. A unique index
/// on `title` backs the title pre-check.
pub struct MongoQuizStore {
    db: Database,
    import_run_id: String,
}

impl MongoQuizStore {
    pub fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)?;
        let db = client.database(database);

        track_db_operation("ping", "admin", || db.run_command(doc! { "ping": 1 }).run())?;
        info!("MongoDB connected (database: {})", database);

        let store = Self::new(db);
        store.ensure_indexes()?;
        Ok(store)
    }

    pub fn new(db: Database) -> Self {
        let import_run_id = Uuid::new_v4().to_string();
        debug!("Import run id: {}", import_run_id);
        Self { db, import_run_id }
    }

    fn quizzes(&self) -> Collection<QuizDocument> {
        self.db.collection(QUIZZES_COLLECTION)
    }

    fn topics(&self) -> Collection<TopicRecord> {
        self.db.collection(TOPICS_COLLECTION)
    }

    pub fn ensure_indexes(&self) -> Result<(), StoreError> {
        let unique_title = IndexModel::builder()
            .keys(doc! { "title": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        track_db_operation("create_index", QUIZZES_COLLECTION, || {
            self.quizzes().create_index(unique_title).run()
        })?;

        let unique_topic = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        track_db_operation("create_index", TOPICS_COLLECTION, || {
            self.topics().create_index(unique_topic).run()
        })?;

        Ok(())
    }

    /// Get-or-create a topic by name.
    fn ensure_topic(&self, name: &str) -> Result<(), StoreError> {
        track_db_operation("upsert", TOPICS_COLLECTION, || {
            self.topics()
                .update_one(
                    doc! { "name": name },
                    doc! { "$setOnInsert": { "name": name } },
                )
                .upsert(true)
                .run()
        })?;
        Ok(())
    }

    pub fn summary(&self) -> Result<StoreSummary, StoreError> {
        let cursor = track_db_operation("find", QUIZZES_COLLECTION, || {
            self.quizzes().find(doc! {}).sort(doc! { "title": 1 }).run()
        })?;

        let mut summary = StoreSummary::default();
        for quiz in cursor {
            let quiz = quiz?;
            summary.quizzes += 1;
            summary.questions += quiz.question_count() as u64;
            summary.options += quiz.option_count() as u64;
            summary
                .quiz_sizes
                .push((quiz.title.clone(), quiz.question_count()));
        }

        summary.topics = track_db_operation("count", TOPICS_COLLECTION, || {
            self.topics().count_documents(doc! {}).run()
        })?;

        Ok(summary)
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY_CODE
    )
}

impl QuizMaterializer for MongoQuizStore {
    fn exists(&self, title: &str) -> Result<bool, StoreError> {
        let count = track_db_operation("count", QUIZZES_COLLECTION, || {
            self.quizzes()
                .count_documents(doc! { "title": title })
                .run()
        })?;
        Ok(count > 0)
    }

    fn create(&mut self, plan: &QuizPlan) -> Result<MaterializedQuiz, StoreError> {
        if !plan.topic_name.is_empty() {
            self.ensure_topic(&plan.topic_name)?;
        }

        let document = plan_to_document(plan, &self.import_run_id);
        let insert = track_db_operation("insert", QUIZZES_COLLECTION, || {
            self.quizzes().insert_one(&document).run()
        });

        match insert {
            Ok(result) => {
                debug!("Inserted quiz '{}' as {}", document.title, result.inserted_id);
                Ok(MaterializedQuiz {
                    title: document.title.clone(),
                    question_count: document.question_count(),
                })
            }
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateTitle(plan.title.clone())),
            Err(e) => Err(e.into()),
        }
    }
}
