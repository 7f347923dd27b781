pub mod chapter_planner;
pub mod directory_import;
pub mod transform;

pub use chapter_planner::{ChapterQuizPlanner, PlannerError, PlannerSettings};
pub use directory_import::{import_directory, DirectoryImportSummary};
