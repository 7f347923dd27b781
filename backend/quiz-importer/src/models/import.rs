use serde::Serialize;

use super::question::ChapterId;

/// Something worth reporting that happened while importing. None of these
/// abort the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportEvent {
    EmptyChapter {
        chapter_id: ChapterId,
    },
    PoolExhausted {
        chapter_id: ChapterId,
        quiz_number: usize,
    },
    DuplicateTitleSkipped {
        chapter_id: ChapterId,
        quiz_number: usize,
        title: String,
    },
    CountMismatch {
        title: String,
        expected: usize,
        actual: usize,
    },
    MaterializationFailed {
        chapter_id: ChapterId,
        quiz_number: usize,
        title: String,
        error: String,
    },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub quizzes_created: usize,
    pub questions_imported: usize,
    pub events: Vec<ImportEvent>,
}

impl ImportResult {
    /// `(quizzes_created, questions_imported)`
    pub fn counts(&self) -> (usize, usize) {
        (self.quizzes_created, self.questions_imported)
    }

    pub fn skipped_titles(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ImportEvent::DuplicateTitleSkipped { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ImportEvent::MaterializationFailed { .. }))
            .count()
    }

    pub fn merge(&mut self, other: ImportResult) {
        self.quizzes_created += other.quizzes_created;
        self.questions_imported += other.questions_imported;
        self.events.extend(other.events);
    }
}
