use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use super::chapter_planner::ChapterQuizPlanner;
use crate::metrics::BANK_FILES_TOTAL;
use crate::models::ImportResult;
use crate::source::{list_bank_files, JsonFileSource, QuestionSource, SourceError};
use crate::store::QuizMaterializer;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectoryImportSummary {
    pub files_scanned: usize,
    /// Files that produced at least one quiz or question.
    pub files_succeeded: usize,
    pub files_failed: usize,
    pub quizzes_created: usize,
    pub questions_imported: usize,
}

/// Imports every quiz bank in `dir`. A bank that cannot be loaded is
/// counted as failed and the remaining files are still processed.
pub fn import_directory<M>(
    dir: &Path,
    planner: &ChapterQuizPlanner,
    store: &mut M,
) -> Result<DirectoryImportSummary, SourceError>
where
    M: QuizMaterializer + ?Sized,
{
    let files = list_bank_files(dir)?;
    info!(
        "Scanned {} quiz bank files in {}",
        files.len(),
        dir.display()
    );

    let mut summary = DirectoryImportSummary {
        files_scanned: files.len(),
        ..Default::default()
    };

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!("Processing file: {}", name);

        let records = match JsonFileSource::new(path).load() {
            Ok(records) => records,
            Err(e) => {
                error!("Skipping {}: {}", name, e);
                BANK_FILES_TOTAL.with_label_values(&["failed"]).inc();
                summary.files_failed += 1;
                continue;
            }
        };

        let result: ImportResult = planner.import(&records, store);
        summary.quizzes_created += result.quizzes_created;
        summary.questions_imported += result.questions_imported;
        if result.quizzes_created > 0 || result.questions_imported > 0 {
            summary.files_succeeded += 1;
            BANK_FILES_TOTAL.with_label_values(&["imported"]).inc();
        } else {
            BANK_FILES_TOTAL.with_label_values(&["unchanged"]).inc();
        }
        info!(
            "Processed {}: created {} quizzes, {} questions",
            name, result.quizzes_created, result.questions_imported
        );
    }

    info!(
        "Directory import: {} files scanned, {} imported, {} quizzes, {} questions",
        summary.files_scanned,
        summary.files_succeeded,
        summary.quizzes_created,
        summary.questions_imported
    );
    if summary.files_failed > 0 {
        warn!("Failed to process {} files", summary.files_failed);
    }

    Ok(summary)
}
