use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::path::Path;

lazy_static! {
    // Import Metrics
    pub static ref QUIZZES_CREATED_TOTAL: IntCounter = register_int_counter!(
        "quizzes_created_total",
        "Total number of quizzes materialized by the importer"
    )
    .unwrap();

    pub static ref QUESTIONS_IMPORTED_TOTAL: IntCounter = register_int_counter!(
        "questions_imported_total",
        "Total number of questions stored across created quizzes"
    )
    .unwrap();

    pub static ref QUIZ_PLANS_SKIPPED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quiz_plans_skipped_total",
        "Planned quizzes that were not created",
        &["reason"]
    )
    .unwrap();

    pub static ref BANK_FILES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "bank_files_total",
        "Quiz bank files processed by directory imports",
        &["status"]
    )
    .unwrap();

    // Database Metrics (MongoDB)
    pub static ref DB_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "db_operations_total",
        "Total number of database operations",
        &["operation", "collection", "status"]
    )
    .unwrap();

    pub static ref DB_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "db_operation_duration_seconds",
        "Database operation duration in seconds",
        &["operation", "collection"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Writes the current metrics for a node_exporter textfile collector.
pub fn write_metrics_file(path: &Path) -> anyhow::Result<()> {
    let rendered = render_metrics()?;
    std::fs::write(path, rendered)?;
    Ok(())
}

/// Helper: track database operation with metrics
pub fn track_db_operation<T, E, F>(operation: &str, collection: &str, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let start = std::time::Instant::now();
    let result = f();
    let duration = start.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    DB_OPERATIONS_TOTAL
        .with_label_values(&[operation, collection, status])
        .inc();

    DB_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation, collection])
        .observe(duration);

    result
}

pub fn record_quiz_created(question_count: usize) {
    QUIZZES_CREATED_TOTAL.inc();
    QUESTIONS_IMPORTED_TOTAL.inc_by(question_count as u64);
}

/// `reason` is one of `duplicate_title`, `pool_exhausted`, `failed`
pub fn record_plan_skipped(reason: &str) {
    QUIZ_PLANS_SKIPPED_TOTAL.with_label_values(&[reason]).inc();
}
