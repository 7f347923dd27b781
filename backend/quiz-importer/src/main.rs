use std::path::PathBuf;

use anyhow::{Context, Result};
use quiz_importer::{
    config::Config,
    logging::init_tracing,
    metrics::write_metrics_file,
    services::{import_directory, ChapterQuizPlanner, PlannerSettings},
    source::{InMemorySource, JsonFileSource, QuestionSource},
    store::{InMemoryQuizStore, MongoQuizStore, QuizMaterializer},
    ImportResult,
};

fn main() -> Result<()> {
    init_tracing();
    tracing::info!("Starting quiz importer");

    let config = Config::load().context("Failed to load configuration")?;
    let planner =
        ChapterQuizPlanner::new(config.import.clone()).context("Invalid import settings")?;

    if config.dry_run {
        tracing::info!("Dry run: quizzes are planned into memory, MongoDB is not touched");
        let mut store = InMemoryQuizStore::new();
        run_import(&config, &planner, &mut store)?;
        store.summary().log();
    } else {
        let mut store = MongoQuizStore::connect(&config.mongo_uri, &config.mongo_database)
            .context("Failed to connect to MongoDB")?;
        run_import(&config, &planner, &mut store)?;
        store
            .summary()
            .context("Failed to summarize the quiz store")?
            .log();
    }

    if let Some(path) = &config.metrics_path {
        write_metrics_file(path)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }

    Ok(())
}

fn run_import<M: QuizMaterializer>(
    config: &Config,
    planner: &ChapterQuizPlanner,
    store: &mut M,
) -> Result<()> {
    if config.sample_data {
        tracing::info!("Importing the built-in sample bank");
        let sample_planner = ChapterQuizPlanner::new(PlannerSettings {
            questions_per_quiz: 2,
            quizzes_per_chapter: 1,
            ..planner.settings().clone()
        })?;
        let records = InMemorySource::sample().load()?;
        log_result("Sample import", &sample_planner.import(&records, store));
        return Ok(());
    }

    // An explicit path wins over the configured directory/file
    let target = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.directory.clone())
        .or_else(|| config.source.clone())
        .context("No quiz bank given: pass a path or set import.source / import.directory")?;

    if target.is_dir() {
        let summary = import_directory(&target, planner, store)
            .with_context(|| format!("Failed to import directory {}", target.display()))?;
        tracing::info!(
            "Directory import completed: {} quizzes, {} questions from {} of {} files",
            summary.quizzes_created,
            summary.questions_imported,
            summary.files_succeeded,
            summary.files_scanned
        );
    } else {
        let records = JsonFileSource::new(&target)
            .load()
            .context("Failed to load quiz bank")?;
        log_result("Import", &planner.import(&records, store));
    }

    Ok(())
}

fn log_result(label: &str, result: &ImportResult) {
    tracing::info!(
        "{} completed: created {} quizzes with a total of {} questions",
        label,
        result.quizzes_created,
        result.questions_imported
    );
    if result.failures() > 0 {
        tracing::warn!("{} quizzes failed to import", result.failures());
    }
}
