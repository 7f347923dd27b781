#![allow(dead_code)]

use std::path::{Path, PathBuf};

use quiz_importer::{ChapterId, ChapterQuizPlanner, PlannerSettings, QuestionRecord};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// `count` questions for one chapter, titled "Test Chapter {chapter}".
pub fn chapter_questions(chapter: impl Into<ChapterId>, count: usize) -> Vec<QuestionRecord> {
    let chapter = chapter.into();
    (0..count)
        .map(|i| {
            QuestionRecord::new(
                chapter.clone(),
                format!("Q{} Ch{}", i + 1, chapter),
                vec![
                    format!("Opt A{}", i),
                    format!("Opt B{}", i),
                    format!("Opt C{}", i),
                ],
                (i % 3) + 1,
            )
            .with_chapter_title(format!("Test Chapter {}", chapter))
        })
        .collect()
}

pub fn with_topic(records: Vec<QuestionRecord>, topic: &str) -> Vec<QuestionRecord> {
    records.into_iter().map(|r| r.with_topic(topic)).collect()
}

/// Planner with a 1.5 single quiz threshold, prefixes and descriptive
/// titles off unless `configure` turns them on.
pub fn planner(configure: impl FnOnce(&mut PlannerSettings)) -> ChapterQuizPlanner {
    let mut settings = PlannerSettings::new(1.5);
    settings.use_descriptive_titles = false;
    settings.use_chapter_prefix = false;
    configure(&mut settings);
    ChapterQuizPlanner::new(settings).expect("test settings should be valid")
}

/// Fresh directory under the system temp dir.
pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quiz-importer-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

pub fn write_bank(dir: &Path, name: &str, records: &[QuestionRecord]) -> PathBuf {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(records).expect("records should serialize");
    std::fs::write(&path, json).expect("failed to write bank");
    path
}
