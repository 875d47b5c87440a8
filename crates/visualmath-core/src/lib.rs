//! VisualMath Core Library
//!
//! Domain models, normalization rules, configuration, and error handling shared
//! by the export and recovery pipelines.

pub mod config;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{CoreError, Result};
pub use models::{Lesson, LessonId, Task, TaskId, TaskOrder};
