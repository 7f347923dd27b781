use std::path::PathBuf;

use quiz_importer::{ChapterQuizPlanner, Config, PlannerError};

fn clear_env() {
    for key in ["MONGO_URI", "MONGO_DATABASE", "SINGLE_QUIZ_THRESHOLD"] {
        std::env::remove_var(key);
    }
}

fn settings(overrides: &[(&str, config::Value)]) -> config::Config {
    let mut builder = config::Config::builder();
    for (key, value) in overrides {
        builder = builder
            .set_override(*key, value.clone())
            .expect("override should be accepted");
    }
    builder.build().expect("settings should build")
}

#[test]
#[serial_test::serial]
fn test_defaults_with_threshold_only() {
    clear_env();
    let settings = settings(&[("import.single_quiz_threshold", 1.5.into())]);

    let config = Config::from_settings(&settings).unwrap();

    assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
    assert_eq!(config.mongo_database, "quizmaster");
    assert_eq!(config.import.questions_per_quiz, 20);
    assert_eq!(config.import.quizzes_per_chapter, 2);
    assert_eq!(config.import.max_quizzes_per_chapter, 5);
    assert_eq!(config.import.min_coverage_percentage, 40);
    assert_eq!(config.import.chapter_zfill, 2);
    assert_eq!(config.import.single_quiz_threshold, 1.5);
    assert!(config.import.use_descriptive_titles);
    assert!(config.import.use_chapter_prefix);
    assert!(config.import.system_category.is_none());
    assert!(config.source.is_none());
    assert!(config.directory.is_none());
    assert!(config.metrics_path.is_none());
    assert!(!config.dry_run);
    assert!(!config.sample_data);
}

#[test]
#[serial_test::serial]
fn test_missing_threshold_is_an_error() {
    clear_env();
    let settings = settings(&[]);

    let err = Config::from_settings(&settings).unwrap_err();

    assert!(matches!(err, config::ConfigError::NotFound(key) if key == "import.single_quiz_threshold"));
}

#[test]
#[serial_test::serial]
fn test_threshold_and_database_from_env() {
    clear_env();
    std::env::set_var("SINGLE_QUIZ_THRESHOLD", "2.5");
    std::env::set_var("MONGO_URI", "mongodb://db.internal:27017");
    std::env::set_var("MONGO_DATABASE", "quizzes_test");

    let config = Config::from_settings(&settings(&[])).unwrap();
    clear_env();

    assert_eq!(config.import.single_quiz_threshold, 2.5);
    assert_eq!(config.mongo_uri, "mongodb://db.internal:27017");
    assert_eq!(config.mongo_database, "quizzes_test");
}

#[test]
#[serial_test::serial]
fn test_invalid_threshold_env_is_an_error() {
    clear_env();
    std::env::set_var("SINGLE_QUIZ_THRESHOLD", "lots");

    let result = Config::from_settings(&settings(&[]));
    clear_env();

    assert!(matches!(result, Err(config::ConfigError::Message(_))));
}

#[test]
#[serial_test::serial]
fn test_overrides_are_applied() {
    clear_env();
    let settings = settings(&[
        ("database.mongo_uri", "mongodb://other:27017".into()),
        ("import.single_quiz_threshold", 1.0.into()),
        ("import.questions_per_quiz", 15i64.into()),
        ("import.max_quizzes_per_chapter", 8i64.into()),
        ("import.use_chapter_prefix", false.into()),
        ("import.system_category", "Nursing".into()),
        ("import.directory", "banks".into()),
        ("metrics.path", "out/metrics.prom".into()),
        ("import.dry_run", true.into()),
        ("import.sample_data", true.into()),
    ]);

    let config = Config::from_settings(&settings).unwrap();

    assert_eq!(config.mongo_uri, "mongodb://other:27017");
    assert_eq!(config.import.questions_per_quiz, 15);
    assert_eq!(config.import.max_quizzes_per_chapter, 8);
    assert!(!config.import.use_chapter_prefix);
    assert_eq!(config.import.system_category.as_deref(), Some("Nursing"));
    assert_eq!(config.directory, Some(PathBuf::from("banks")));
    assert_eq!(config.metrics_path, Some(PathBuf::from("out/metrics.prom")));
    assert!(config.dry_run);
    assert!(config.sample_data);
}

#[test]
#[serial_test::serial]
fn test_mistyped_threshold_reports_type_error() {
    clear_env();
    std::env::set_var("SINGLE_QUIZ_THRESHOLD", "1.5");
    let settings = settings(&[("import.single_quiz_threshold", "lots".into())]);

    let result = Config::from_settings(&settings);
    clear_env();

    assert!(matches!(result, Err(config::ConfigError::Type { .. })));
}

#[test]
#[serial_test::serial]
fn test_negative_count_is_an_error() {
    clear_env();
    let settings = settings(&[
        ("import.single_quiz_threshold", 1.5.into()),
        ("import.questions_per_quiz", (-3i64).into()),
    ]);

    assert!(matches!(
        Config::from_settings(&settings),
        Err(config::ConfigError::Message(_))
    ));
}

#[test]
#[serial_test::serial]
fn test_out_of_range_settings_rejected_by_planner() {
    clear_env();
    let settings = settings(&[
        ("import.single_quiz_threshold", 1.5.into()),
        ("import.min_coverage_percentage", 0i64.into()),
    ]);
    let config = Config::from_settings(&settings).unwrap();

    let err = ChapterQuizPlanner::new(config.import).unwrap_err();

    assert!(matches!(err, PlannerError::InvalidSettings(_)));
}
