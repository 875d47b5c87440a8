//! VisualMath Store
//!
//! Typed access to the lesson/task dataset.
//!
//! # Modules
//!
//! - [`memory`] - In-memory adapter, used by tests and one-shot imports
//! - [`sqlite`] - SQLite adapter backed by `sqlx`
//!
//! Every component receives the store as an explicit `&dyn LessonStore`
//! (or `&mut dyn LessonStore` for writers); there is no process-wide handle.

pub mod memory;
pub mod sqlite;

use thiserror::Error;
use visualmath_core::{CoreError, Lesson, LessonId, Task, TaskId, TaskOrder};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup of an absent record.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Insert of an identifier that already exists.
    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: i64 },

    /// Task whose owning lesson does not exist.
    #[error("task {task_id} references missing lesson {lesson_id}")]
    Orphan { task_id: TaskId, lesson_id: LessonId },

    /// Record failed model validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Database connection or migration failure.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// Query failure.
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn lesson_not_found(id: LessonId) -> Self {
        Self::NotFound {
            entity: "lesson",
            id,
        }
    }

    pub(crate) fn task_not_found(id: TaskId) -> Self {
        Self::NotFound { entity: "task", id }
    }

    pub(crate) fn duplicate_lesson(id: LessonId) -> Self {
        Self::Duplicate {
            entity: "lesson",
            id,
        }
    }

    pub(crate) fn duplicate_task(id: TaskId) -> Self {
        Self::Duplicate { entity: "task", id }
    }

    /// Whether this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Read/write contract of the lesson/task dataset.
///
/// Reads are what the exporter consumes; the writes exist for recovery and
/// import, which only ever insert records that are absent.
pub trait LessonStore {
    /// Distinct grade values present in the lesson collection, ascending.
    fn grades(&self) -> Result<Vec<i32>>;

    /// Lessons of one grade ordered by sort order (then id), without tasks.
    fn lessons_by_grade(&self, grade: i32) -> Result<Vec<Lesson>>;

    /// All lessons ordered by sort order (then id), tasks attached and sorted
    /// by `order`.
    fn lessons_with_tasks(&self, order: TaskOrder) -> Result<Vec<Lesson>>;

    /// All tasks, ascending id.
    fn tasks(&self) -> Result<Vec<Task>>;

    /// Single lesson without tasks; `NotFound` when absent.
    fn lesson(&self, id: LessonId) -> Result<Lesson>;

    /// Single task; `NotFound` when absent.
    fn task(&self, id: TaskId) -> Result<Task>;

    /// Insert a lesson and any tasks it carries.
    fn insert_lesson(&mut self, lesson: &Lesson) -> Result<()>;

    /// Insert a task under an existing lesson.
    fn insert_task(&mut self, task: &Task) -> Result<()>;

    /// Insert a lesson without model validation.
    ///
    /// Recovery stores partially extracted lessons this way so an operator
    /// can complete the empty fields later. Duplicate checks still apply.
    fn insert_lesson_unchecked(&mut self, lesson: &Lesson) -> Result<()>;

    /// Insert a task without model validation. Duplicate and orphan checks
    /// still apply.
    fn insert_task_unchecked(&mut self, task: &Task) -> Result<()>;

    /// Delete a lesson and, by cascade, its tasks.
    fn delete_lesson(&mut self, id: LessonId) -> Result<()>;

    /// Whether a lesson with this id exists.
    fn contains_lesson(&self, id: LessonId) -> Result<bool> {
        match self.lesson(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether a task with this id exists.
    fn contains_task(&self, id: TaskId) -> Result<bool> {
        match self.task(id) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
