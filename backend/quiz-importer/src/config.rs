use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::services::chapter_planner::{
    PlannerSettings, DEFAULT_CHAPTER_ZFILL, DEFAULT_MAX_QUIZZES_PER_CHAPTER,
    DEFAULT_MIN_COVERAGE_PERCENTAGE, DEFAULT_QUESTIONS_PER_QUIZ, DEFAULT_QUIZZES_PER_CHAPTER,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub import: PlannerSettings,
    /// Single quiz bank file to import
    pub source: Option<PathBuf>,
    /// Directory of quiz bank files to import
    pub directory: Option<PathBuf>,
    /// Where to write Prometheus text metrics after a run
    pub metrics_path: Option<PathBuf>,
    /// Plan into an in-memory store instead of MongoDB
    pub dry_run: bool,
    /// Import the built-in sample bank instead of a file
    pub sample_data: bool,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables (prefix: APP_)
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &config::Config) -> Result<Self, config::ConfigError> {
        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "quizmaster".to_string());

        // No default on purpose: the right value depends on the bank
        let single_quiz_threshold = match settings.get_float("import.single_quiz_threshold") {
            Ok(value) => value,
            Err(config::ConfigError::NotFound(_)) => env::var("SINGLE_QUIZ_THRESHOLD")
                .map_err(|_| {
                    config::ConfigError::NotFound("import.single_quiz_threshold".to_string())
                })?
                .parse::<f64>()
                .map_err(|e| {
                    config::ConfigError::Message(format!("invalid SINGLE_QUIZ_THRESHOLD: {}", e))
                })?,
            Err(e) => return Err(e),
        };

        let import = PlannerSettings {
            questions_per_quiz: get_usize(
                settings,
                "import.questions_per_quiz",
                DEFAULT_QUESTIONS_PER_QUIZ,
            )?,
            quizzes_per_chapter: get_usize(
                settings,
                "import.quizzes_per_chapter",
                DEFAULT_QUIZZES_PER_CHAPTER,
            )?,
            max_quizzes_per_chapter: get_usize(
                settings,
                "import.max_quizzes_per_chapter",
                DEFAULT_MAX_QUIZZES_PER_CHAPTER,
            )?,
            min_coverage_percentage: get_usize(
                settings,
                "import.min_coverage_percentage",
                DEFAULT_MIN_COVERAGE_PERCENTAGE,
            )?,
            single_quiz_threshold,
            use_descriptive_titles: settings
                .get_bool("import.use_descriptive_titles")
                .unwrap_or(true),
            use_chapter_prefix: settings.get_bool("import.use_chapter_prefix").unwrap_or(true),
            chapter_zfill: get_usize(settings, "import.chapter_zfill", DEFAULT_CHAPTER_ZFILL)?,
            system_category: settings.get_string("import.system_category").ok(),
        };

        Ok(Config {
            mongo_uri,
            mongo_database,
            import,
            source: settings.get_string("import.source").ok().map(PathBuf::from),
            directory: settings
                .get_string("import.directory")
                .ok()
                .map(PathBuf::from),
            metrics_path: settings.get_string("metrics.path").ok().map(PathBuf::from),
            dry_run: settings.get_bool("import.dry_run").unwrap_or(false),
            sample_data: settings.get_bool("import.sample_data").unwrap_or(false),
        })
    }
}

fn get_usize(
    settings: &config::Config,
    key: &str,
    default: usize,
) -> Result<usize, config::ConfigError> {
    match settings.get_int(key) {
        Ok(value) => usize::try_from(value).map_err(|_| {
            config::ConfigError::Message(format!("{} must not be negative (got {})", key, value))
        }),
        Err(config::ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(e),
    }
}
