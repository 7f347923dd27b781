use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::models::{ChapterId, QuestionRecord};

const BANK_EXTENSION: &str = "json";
const MAX_LOGGED_TOPICS: usize = 10;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("quiz bank file not found: {0}")]
    NotFound(PathBuf),
    #[error("import directory not found or not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid quiz bank {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("quiz bank {0} contains no questions")]
    Empty(PathBuf),
}

/// Supplies the full question collection for one import.
pub trait QuestionSource {
    fn load(&self) -> Result<Vec<QuestionRecord>, SourceError>;
}

/// A quiz bank stored as a JSON array of question records.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuestionSource for JsonFileSource {
    fn load(&self) -> Result<Vec<QuestionRecord>, SourceError> {
        info!("Loading quiz bank from: {}", self.path.display());

        if !self.path.is_file() {
            return Err(SourceError::NotFound(self.path.clone()));
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<QuestionRecord> =
            serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if records.is_empty() {
            return Err(SourceError::Empty(self.path.clone()));
        }

        log_bank_overview(&records);
        Ok(records)
    }
}

/// Questions already in memory, e.g. generated sample data.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<QuestionRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<QuestionRecord>) -> Self {
        Self { records }
    }
}

impl InMemorySource {
    /// Small generated bank for trying out the importer: three chapters,
    /// two questions each.
    pub fn sample() -> Self {
        let rows: [(i64, &str, &str, [&str; 3], usize, &str); 6] = [
            (1, "Test Topic A", "Test question 1?", ["Option A", "Option B", "Option C"], 1, "Introduction to Testing"),
            (1, "Test Topic B", "Test question 2?", ["Option D", "Option E", "Option F"], 2, "Introduction to Testing"),
            (2, "Test Topic C", "Test question 3?", ["Option G", "Option H", "Option I"], 3, "Advanced Testing"),
            (2, "Test Topic D", "Test question 4?", ["Option J", "Option K", "Option L"], 1, "Advanced Testing"),
            (10, "Advanced Testing", "Test question 5?", ["Option M", "Option N", "Option O"], 2, "Expert Testing"),
            (10, "Advanced Testing", "Test question 6?", ["Option P", "Option Q", "Option R"], 3, "Expert Testing"),
        ];

        let records = rows
            .into_iter()
            .map(|(chapter, topic, text, options, answer, chapter_title)| {
                QuestionRecord::new(
                    chapter,
                    text,
                    options.iter().map(|o| o.to_string()).collect(),
                    answer,
                )
                .with_topic(topic)
                .with_chapter_title(chapter_title)
            })
            .collect();
        Self::new(records)
    }
}

impl QuestionSource for InMemorySource {
    fn load(&self) -> Result<Vec<QuestionRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

fn log_bank_overview(records: &[QuestionRecord]) {
    let mut chapter_titles: BTreeMap<ChapterId, &str> = BTreeMap::new();
    for record in records {
        if let Some(title) = record.chapter_title.as_deref() {
            chapter_titles.entry(record.chapter_id.normalized()).or_insert(title);
        }
    }
    let chapters: BTreeSet<ChapterId> = records.iter().map(|r| r.chapter_id.normalized()).collect();
    let topics: BTreeSet<&str> = records.iter().filter_map(|r| r.topic.as_deref()).collect();

    info!(
        "Quiz bank loaded with {} questions, {} unique chapters",
        records.len(),
        chapters.len()
    );
    if !chapter_titles.is_empty() {
        info!("Chapter titles: {:?}", chapter_titles);
    }
    if !topics.is_empty() {
        info!("Topics: {} unique topics", topics.len());
        if topics.len() <= MAX_LOGGED_TOPICS {
            info!("Topic values: {:?}", topics);
        }
    }
}

/// Quiz bank files (`*.json`) directly inside `dir`, sorted by file name.
pub fn list_bank_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    if !dir.is_dir() {
        return Err(SourceError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == BANK_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
