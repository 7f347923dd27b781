use std::collections::{BTreeMap, HashMap, HashSet};

use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::metrics::{record_plan_skipped, record_quiz_created};
use crate::models::{ChapterId, ImportEvent, ImportResult, QuestionRecord, QuizPlan};
use crate::store::QuizMaterializer;

pub const DEFAULT_QUESTIONS_PER_QUIZ: usize = 20;
pub const DEFAULT_QUIZZES_PER_CHAPTER: usize = 2;
pub const DEFAULT_MAX_QUIZZES_PER_CHAPTER: usize = 5;
pub const DEFAULT_MIN_COVERAGE_PERCENTAGE: usize = 40;
pub const DEFAULT_CHAPTER_ZFILL: usize = 2;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid planner settings: {0}")]
    InvalidSettings(#[from] ValidationErrors),
}

fn default_questions_per_quiz() -> usize {
    DEFAULT_QUESTIONS_PER_QUIZ
}

fn default_quizzes_per_chapter() -> usize {
    DEFAULT_QUIZZES_PER_CHAPTER
}

fn default_max_quizzes_per_chapter() -> usize {
    DEFAULT_MAX_QUIZZES_PER_CHAPTER
}

fn default_min_coverage_percentage() -> usize {
    DEFAULT_MIN_COVERAGE_PERCENTAGE
}

fn default_chapter_zfill() -> usize {
    DEFAULT_CHAPTER_ZFILL
}

fn default_true() -> bool {
    true
}

fn validate_threshold(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    let mut err = ValidationError::new("single_quiz_threshold");
    err.message = Some("single_quiz_threshold must be a finite number above 0".into());
    Err(err)
}

/// Knobs of a planning run. `single_quiz_threshold` has no default and
/// must always be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlannerSettings {
    #[serde(default = "default_questions_per_quiz")]
    #[validate(range(min = 1, message = "questions_per_quiz must be at least 1"))]
    pub questions_per_quiz: usize,

    #[serde(default = "default_quizzes_per_chapter")]
    #[validate(range(min = 1, message = "quizzes_per_chapter must be at least 1"))]
    pub quizzes_per_chapter: usize,

    #[serde(default = "default_max_quizzes_per_chapter")]
    #[validate(range(min = 1, message = "max_quizzes_per_chapter must be at least 1"))]
    pub max_quizzes_per_chapter: usize,

    #[serde(default = "default_min_coverage_percentage")]
    #[validate(range(
        min = 1,
        max = 100,
        message = "min_coverage_percentage must be between 1 and 100"
    ))]
    pub min_coverage_percentage: usize,

    /// A chapter with fewer than `questions_per_quiz * single_quiz_threshold`
    /// questions becomes a single quiz.
    #[validate(custom(function = "validate_threshold"))]
    pub single_quiz_threshold: f64,

    #[serde(default = "default_true")]
    pub use_descriptive_titles: bool,

    #[serde(default = "default_true")]
    pub use_chapter_prefix: bool,

    #[serde(default = "default_chapter_zfill")]
    #[validate(range(max = 10, message = "chapter_zfill must be at most 10"))]
    pub chapter_zfill: usize,

    /// Assigned to every quiz, overriding per-question categories.
    #[serde(default)]
    pub system_category: Option<String>,
}

impl PlannerSettings {
    pub fn new(single_quiz_threshold: f64) -> Self {
        Self {
            questions_per_quiz: DEFAULT_QUESTIONS_PER_QUIZ,
            quizzes_per_chapter: DEFAULT_QUIZZES_PER_CHAPTER,
            max_quizzes_per_chapter: DEFAULT_MAX_QUIZZES_PER_CHAPTER,
            min_coverage_percentage: DEFAULT_MIN_COVERAGE_PERCENTAGE,
            single_quiz_threshold,
            use_descriptive_titles: true,
            use_chapter_prefix: true,
            chapter_zfill: DEFAULT_CHAPTER_ZFILL,
            system_category: None,
        }
    }
}

/// How many quizzes a chapter gets and how large each one aims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterPlan {
    pub quiz_count: usize,
    pub per_quiz_size: usize,
    /// The chapter was small enough to become a single quiz.
    pub collapsed: bool,
    pub min_questions_to_cover: usize,
    pub required_quizzes: usize,
}

/// Title, topic and category shared by all quizzes of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMetadata {
    pub title: String,
    pub primary_topic: Option<String>,
    pub system_category: Option<String>,
}

impl ChapterMetadata {
    pub fn from_questions(
        chapter_id: &ChapterId,
        questions: &[&QuestionRecord],
        category_override: Option<&str>,
    ) -> Self {
        let title = most_common(questions.iter().map(|q| q.chapter_title.as_deref()))
            .unwrap_or_else(|| format!("Chapter {}", chapter_id));
        let primary_topic = most_common(questions.iter().map(|q| q.topic.as_deref()));
        let system_category = match category_override {
            Some(category) => Some(category.to_string()),
            None => most_common(questions.iter().map(|q| q.system_category.as_deref())),
        };

        Self {
            title,
            primary_topic,
            system_category,
        }
    }
}

/// Most frequent non-blank value; ties go to the value seen first.
fn most_common<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.enumerate() {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string())
}

/// Groups records by normalized chapter id, keeping source order within a chapter.
pub fn group_by_chapter(records: &[QuestionRecord]) -> BTreeMap<ChapterId, Vec<&QuestionRecord>> {
    let mut chapters: BTreeMap<ChapterId, Vec<&QuestionRecord>> = BTreeMap::new();
    for record in records {
        chapters
            .entry(record.chapter_id.normalized())
            .or_default()
            .push(record);
    }
    chapters
}

/// Draws up to `size` indices in `0..pool_len` that are not in `used`,
/// uniformly and without replacement.
pub fn sample_unused<R: Rng + ?Sized>(
    rng: &mut R,
    pool_len: usize,
    used: &HashSet<usize>,
    size: usize,
) -> Vec<usize> {
    let available: Vec<usize> = (0..pool_len).filter(|i| !used.contains(i)).collect();
    let amount = size.min(available.len());
    index::sample(rng, available.len(), amount)
        .into_iter()
        .map(|i| available[i])
        .collect()
}

/// Splits a quiz bank into per-chapter quizzes.
///
/// Every chapter is planned on its own: a small chapter collapses into one
/// quiz holding all of its questions, a larger one gets the default number
/// of quizzes, raised when needed to reach the minimum coverage and capped
/// by `max_quizzes_per_chapter`. Questions are drawn at random without
/// replacement, so no question appears in two quizzes of the same chapter.
#[derive(Debug)]
pub struct ChapterQuizPlanner {
    settings: PlannerSettings,
}

impl ChapterQuizPlanner {
    pub fn new(settings: PlannerSettings) -> Result<Self, PlannerError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Quiz count and per-quiz size for a chapter, `None` when it is empty.
    pub fn plan_chapter(&self, question_count: usize) -> Option<ChapterPlan> {
        if question_count == 0 {
            return None;
        }

        let s = &self.settings;
        let collapse_below = s.questions_per_quiz as f64 * s.single_quiz_threshold;

        if (question_count as f64) < collapse_below {
            return Some(ChapterPlan {
                quiz_count: 1,
                per_quiz_size: question_count,
                collapsed: true,
                min_questions_to_cover: question_count,
                required_quizzes: 1,
            });
        }

        let per_quiz_size = s.questions_per_quiz;
        let min_questions_to_cover = question_count * s.min_coverage_percentage / 100;
        let required_quizzes = min_questions_to_cover.div_ceil(per_quiz_size);

        let mut quiz_count = s.quizzes_per_chapter;
        if required_quizzes > quiz_count {
            quiz_count = s.max_quizzes_per_chapter.min(required_quizzes);
        }
        quiz_count = quiz_count.min(s.max_quizzes_per_chapter);

        Some(ChapterPlan {
            quiz_count,
            per_quiz_size,
            collapsed: false,
            min_questions_to_cover,
            required_quizzes,
        })
    }

    /// Title prefix for a chapter: the zero-padded number, or the raw id when
    /// it is not numeric, followed by a space.
    pub fn chapter_prefix(&self, chapter_id: &ChapterId) -> String {
        if !self.settings.use_chapter_prefix {
            return String::new();
        }
        match chapter_id.as_number() {
            Some(n) => format!("{:0width$} ", n, width = self.settings.chapter_zfill),
            None => format!("{} ", chapter_id),
        }
    }

    /// Returns `(title, topic_name)` for quiz number `quiz_number`.
    pub fn quiz_title(
        &self,
        prefix: &str,
        metadata: &ChapterMetadata,
        quiz_number: usize,
    ) -> (String, String) {
        match metadata
            .primary_topic
            .as_deref()
            .filter(|_| self.settings.use_descriptive_titles)
        {
            Some(topic) => (
                format!("{}{}: {} - Quiz {}", prefix, metadata.title, topic, quiz_number),
                topic.to_string(),
            ),
            None => (
                format!("{}{} - Quiz {}", prefix, metadata.title, quiz_number),
                metadata.title.clone(),
            ),
        }
    }

    /// Imports `records` with the thread-local RNG.
    pub fn import<M>(&self, records: &[QuestionRecord], store: &mut M) -> ImportResult
    where
        M: QuizMaterializer + ?Sized,
    {
        self.import_questions_by_chapter(records, store, &mut rand::rng())
    }

    pub fn import_questions_by_chapter<M, R>(
        &self,
        records: &[QuestionRecord],
        store: &mut M,
        rng: &mut R,
    ) -> ImportResult
    where
        M: QuizMaterializer + ?Sized,
        R: Rng + ?Sized,
    {
        let chapters = group_by_chapter(records);
        let s = &self.settings;
        info!(
            "Processing {} chapters. Settings: {} questions/quiz, {} quizzes/chapter (target), max {}, min coverage {}%, single quiz threshold {}",
            chapters.len(),
            s.questions_per_quiz,
            s.quizzes_per_chapter,
            s.max_quizzes_per_chapter,
            s.min_coverage_percentage,
            s.single_quiz_threshold
        );

        let mut result = ImportResult::default();
        for (chapter_id, questions) in &chapters {
            result.merge(self.import_chapter(chapter_id, questions, store, rng));
        }

        info!(
            "Import finished: {} quizzes created, {} questions imported",
            result.quizzes_created, result.questions_imported
        );
        result
    }

    /// Plans and materializes the quizzes of a single chapter.
    pub fn import_chapter<M, R>(
        &self,
        chapter_id: &ChapterId,
        questions: &[&QuestionRecord],
        store: &mut M,
        rng: &mut R,
    ) -> ImportResult
    where
        M: QuizMaterializer + ?Sized,
        R: Rng + ?Sized,
    {
        let mut result = ImportResult::default();
        let total = questions.len();
        info!("Processing chapter {}: {} questions available", chapter_id, total);

        let Some(plan) = self.plan_chapter(total) else {
            warn!("Chapter {} has no questions, skipping", chapter_id);
            result.events.push(ImportEvent::EmptyChapter {
                chapter_id: chapter_id.clone(),
            });
            return result;
        };

        if plan.collapsed {
            info!(
                "Chapter {}: {} questions is below the single quiz threshold, creating one quiz with all of them",
                chapter_id, total
            );
        } else {
            info!(
                "Chapter {}: {} quizzes of {} questions (coverage needs {} questions, {} quizzes)",
                chapter_id,
                plan.quiz_count,
                plan.per_quiz_size,
                plan.min_questions_to_cover,
                plan.required_quizzes
            );
        }

        let prefix = self.chapter_prefix(chapter_id);
        let metadata = ChapterMetadata::from_questions(
            chapter_id,
            questions,
            self.settings.system_category.as_deref(),
        );
        debug!("Chapter {} metadata: {:?}", chapter_id, metadata);

        let mut used: HashSet<usize> = HashSet::new();

        for quiz_number in 1..=plan.quiz_count {
            if used.len() >= total {
                warn!(
                    "No unique questions left in chapter {} for quiz {}, stopping",
                    chapter_id, quiz_number
                );
                record_plan_skipped("pool_exhausted");
                result.events.push(ImportEvent::PoolExhausted {
                    chapter_id: chapter_id.clone(),
                    quiz_number,
                });
                break;
            }

            let picked = sample_unused(rng, total, &used, plan.per_quiz_size);
            used.extend(picked.iter().copied());

            let (title, topic_name) = self.quiz_title(&prefix, &metadata, quiz_number);
            if picked.len() < plan.per_quiz_size {
                warn!(
                    "Only {} unique questions left for '{}', expected {}",
                    picked.len(),
                    title,
                    plan.per_quiz_size
                );
            }

            let quiz_plan = QuizPlan {
                title,
                topic_name,
                system_category: metadata.system_category.clone(),
                chapter_id: chapter_id.clone(),
                quiz_number,
                questions: picked.iter().map(|&i| questions[i].clone()).collect(),
            };

            self.materialize(&quiz_plan, store, &mut result);
        }

        info!(
            "Finished chapter {}: used {} of {} questions",
            chapter_id,
            used.len(),
            total
        );
        result
    }

    fn materialize<M>(&self, plan: &QuizPlan, store: &mut M, result: &mut ImportResult)
    where
        M: QuizMaterializer + ?Sized,
    {
        let failed = |result: &mut ImportResult, message: String| {
            error!(
                "Error creating quiz '{}' (chapter {}, quiz {}): {}",
                plan.title, plan.chapter_id, plan.quiz_number, message
            );
            record_plan_skipped("failed");
            result.events.push(ImportEvent::MaterializationFailed {
                chapter_id: plan.chapter_id.clone(),
                quiz_number: plan.quiz_number,
                title: plan.title.clone(),
                error: message,
            });
        };

        match store.exists(&plan.title) {
            Ok(true) => {
                warn!("Quiz '{}' already exists, skipping", plan.title);
                record_plan_skipped("duplicate_title");
                result.events.push(ImportEvent::DuplicateTitleSkipped {
                    chapter_id: plan.chapter_id.clone(),
                    quiz_number: plan.quiz_number,
                    title: plan.title.clone(),
                });
                return;
            }
            Ok(false) => {}
            Err(e) => {
                failed(result, e.to_string());
                return;
            }
        }

        info!(
            "Creating quiz '{}' with {} questions (topic: {})",
            plan.title,
            plan.questions.len(),
            plan.topic_name
        );

        match store.create(plan) {
            Ok(quiz) => {
                let expected = plan.questions.len();
                if quiz.question_count != expected {
                    warn!(
                        "Question count mismatch for '{}': expected {}, got {}",
                        plan.title, expected, quiz.question_count
                    );
                    result.events.push(ImportEvent::CountMismatch {
                        title: plan.title.clone(),
                        expected,
                        actual: quiz.question_count,
                    });
                }
                record_quiz_created(quiz.question_count);
                result.quizzes_created += 1;
                result.questions_imported += quiz.question_count;
            }
            Err(e) => failed(result, e.to_string()),
        }
    }
}
