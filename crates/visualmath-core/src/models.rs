//! Lesson and task records.
//!
//! A [`Lesson`] owns an ordered list of [`Task`]s. Both are created through the
//! administration surface (or the JSON import) and are read-only from the
//! exporter's point of view.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Stable lesson identifier, used in `/lesson/<id>` URLs.
pub type LessonId = i64;

/// Stable task identifier, used in `/task/<id>` URLs.
pub type TaskId = i64;

/// Domain of the presentation provider whose share links get normalized.
pub const PRESENTATION_HOST: &str = "canva.com";

/// A lesson: one presentation plus its practice tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,

    /// Grade level; decides which grade listing shows the lesson.
    pub grade: i32,

    pub title: String,

    /// Embeddable presentation URL.
    pub embed_url: String,

    #[serde(default)]
    pub description: String,

    /// Ranking key within a grade (e.g. 101 = 1.1, 110 = 1.10, 201 = 2.1).
    #[serde(default)]
    pub sort_order: i32,

    /// Owned tasks. Empty unless the store was asked to attach them.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A practice task embedded in a lesson page and exported on its own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    /// Owning lesson. Filled in from the enclosing lesson on import.
    #[serde(default)]
    pub lesson_id: LessonId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Raw embeddable markup, or an iframe wrapping an external resource.
    pub code: String,

    /// Rank within the owning lesson.
    #[serde(default)]
    pub order: i32,
}

/// How tasks inside a lesson are ordered.
///
/// The historical exporter ordered by construction (id) while the editing
/// surface maintains an explicit `order` field. Which one is authoritative is
/// a deployment decision, so both are available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOrder {
    /// Ascending task id.
    #[default]
    Insertion,
    /// Ascending `order` field, ties broken by id.
    Explicit,
}

impl TaskOrder {
    /// Sort tasks in place according to this policy.
    pub fn sort(self, tasks: &mut [Task]) {
        match self {
            Self::Insertion => tasks.sort_by_key(|t| t.id),
            Self::Explicit => tasks.sort_by_key(|t| (t.order, t.id)),
        }
    }

    /// Name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insertion => "insertion",
            Self::Explicit => "explicit",
        }
    }
}

impl Lesson {
    /// Create a lesson, normalizing the embed URL.
    pub fn new(
        id: LessonId,
        grade: i32,
        title: impl Into<String>,
        embed_url: impl AsRef<str>,
    ) -> Self {
        Self {
            id,
            grade,
            title: title.into(),
            embed_url: normalize_embed_url(embed_url.as_ref()),
            description: String::new(),
            sort_order: 0,
            tasks: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Attach a task, taking ownership of it.
    #[must_use]
    pub fn with_task(mut self, mut task: Task) -> Self {
        task.lesson_id = self.id;
        self.tasks.push(task);
        self
    }

    /// Check the lesson invariants.
    pub fn validate(&self) -> Result<()> {
        if self.grade <= 0 {
            return Err(CoreError::invalid_lesson(
                self.id,
                format!("grade must be positive, got {}", self.grade),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::invalid_lesson(self.id, "title cannot be empty"));
        }
        if self.embed_url.trim().is_empty() {
            return Err(CoreError::invalid_lesson(
                self.id,
                "embed URL cannot be empty",
            ));
        }
        Ok(())
    }

    /// Apply the normalization rules to this lesson and its tasks.
    pub fn normalize(&mut self) {
        self.embed_url = normalize_embed_url(&self.embed_url);
        for task in &mut self.tasks {
            task.lesson_id = self.id;
            task.code = normalize_task_code(&task.code);
        }
    }

    /// Copy of this lesson without its tasks.
    #[must_use]
    pub fn without_tasks(&self) -> Self {
        Self {
            tasks: Vec::new(),
            ..self.clone()
        }
    }
}

impl Task {
    /// Create a task, wrapping bare URLs in an iframe.
    pub fn new(id: TaskId, lesson_id: LessonId, code: impl AsRef<str>) -> Self {
        Self {
            id,
            lesson_id,
            title: String::new(),
            description: String::new(),
            code: normalize_task_code(code.as_ref()),
            order: 0,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rank within the lesson.
    #[must_use]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Check the task invariants that do not need the store.
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(CoreError::invalid_task(self.id, "code cannot be empty"));
        }
        Ok(())
    }
}

/// Turn a presentation share link into its embeddable form.
///
/// `https://www.canva.com/design/X/view` and `.../view/` both become
/// `https://www.canva.com/design/X/view?embed`. Other URLs are returned as is.
pub fn normalize_embed_url(url: &str) -> String {
    let url = url.trim();
    if !url.contains(PRESENTATION_HOST) {
        return url.to_string();
    }
    if url.ends_with("view") {
        format!("{url}?embed")
    } else if let Some(stripped) = url.strip_suffix("view/") {
        format!("{stripped}view?embed")
    } else {
        url.to_string()
    }
}

/// Wrap a bare `http(s)://` reference in an iframe; leave markup untouched.
pub fn normalize_task_code(code: &str) -> String {
    let trimmed = code.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        format!(r#"<iframe src="{trimmed}" frameborder="0" allowfullscreen></iframe>"#)
    } else {
        code.to_string()
    }
}
