//! HTML generation for every page kind.
//!
//! Each page renders its body template and is wrapped in `base.html`, except
//! the AMP lesson which is a complete document on its own.

use thiserror::Error;
use tracing::debug;
use visualmath_core::{Config, Lesson, Task, config::SiteConfig};

use crate::{
    route::{BasePath, Route, StaticPage},
    template::{Helpers, TemplateContext, TemplateError, TemplateRegistry, escape_html},
};

/// HTML generation errors.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// Template error.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Result type for HTML generation.
pub type Result<T> = std::result::Result<T, HtmlError>;

/// HTML page generator.
#[derive(Debug)]
pub struct HtmlGenerator {
    templates: TemplateRegistry,
    helpers: Helpers,
    site: SiteConfig,
}

impl HtmlGenerator {
    /// Create a generator using the configured templates directory, if any.
    #[must_use]
    pub fn new(config: &Config, base: BasePath) -> Self {
        let templates = match &config.build.templates_dir {
            Some(dir) => TemplateRegistry::with_directory(dir),
            None => TemplateRegistry::new(),
        };
        Self::with_templates(config, base, templates)
    }

    /// Create a generator with custom templates.
    #[must_use]
    pub fn with_templates(config: &Config, base: BasePath, templates: TemplateRegistry) -> Self {
        Self {
            templates,
            helpers: Helpers::new(base),
            site: config.site.clone(),
        }
    }

    /// Generate the home page listing every grade.
    pub fn generate_home(&self, grades: &[i32]) -> Result<String> {
        let mut items = String::new();
        for grade in grades {
            let ctx = TemplateContext::new()
                .with_var("grade", grade.to_string())
                .with_var("url", Route::Grade(*grade).logical_path());
            items.push_str(&self.render("grade_item.html", &ctx)?);
        }

        let ctx = self.site_context().with_var("grades", items);
        let body = self.render("index.html", &ctx)?;
        let description = format!("{}: interactive math lessons by grade", self.site.name);
        self.wrap(&self.site.name, &description, &body, None)
    }

    /// Generate a grade page listing its lessons in the given order.
    pub fn generate_grade(&self, grade: i32, lessons: &[Lesson]) -> Result<String> {
        debug!(grade, lessons = lessons.len(), "generating grade page");

        let mut items = String::new();
        for lesson in lessons {
            let ctx = TemplateContext::new()
                .with_var("title", &lesson.title)
                .with_var("description", &lesson.description)
                .with_var("url", Route::Lesson(lesson.id).logical_path());
            items.push_str(&self.render("lesson_item.html", &ctx)?);
        }

        let ctx = self
            .site_context()
            .with_var("grade", grade.to_string())
            .with_var("lessons", items);
        let body = self.render("grade_list.html", &ctx)?;
        let title = format!("Grade {grade}");
        let description = format!("Grade {grade} lessons");
        self.wrap(&title, &description, &body, None)
    }

    /// Generate a lesson page with its presentation and tasks.
    pub fn generate_lesson(&self, lesson: &Lesson) -> Result<String> {
        debug!(id = lesson.id, tasks = lesson.tasks.len(), "generating lesson page");

        let mut tasks = String::new();
        for task in &lesson.tasks {
            tasks.push_str(&self.render("task_item.html", &task_context(task))?);
        }

        let ctx = self
            .lesson_context(lesson)
            .with_var("grade_url", Route::Grade(lesson.grade).logical_path())
            .with_var("tasks", tasks);
        let body = self.render("lesson.html", &ctx)?;

        let amp_url = self
            .helpers
            .path(&Route::LessonAmp(lesson.id).logical_path());
        let head = format!(r#"<link rel="amphtml" href="{}">"#, escape_html(&amp_url));
        self.wrap(&lesson.title, &lesson.description, &body, Some(head))
    }

    /// Generate the AMP variant of a lesson page.
    pub fn generate_amp_lesson(&self, lesson: &Lesson, canonical_url: &str) -> Result<String> {
        let mut tasks = String::new();
        for task in &lesson.tasks {
            tasks.push_str(&self.render("amp_task_item.html", &task_context(task))?);
        }

        let ctx = self
            .lesson_context(lesson)
            .with_var("canonical_url", canonical_url)
            .with_var("lesson_url", Route::Lesson(lesson.id).logical_path())
            .with_var("tasks", tasks);
        self.render("amp_lesson.html", &ctx)
    }

    /// Generate a task page.
    pub fn generate_task(&self, task: &Task) -> Result<String> {
        let ctx = self
            .site_context()
            .with_var("title", &task.title)
            .with_var("description", &task.description)
            .with_var("code", &task.code)
            .with_var("lesson_url", Route::Lesson(task.lesson_id).logical_path());
        let body = self.render("task.html", &ctx)?;
        self.wrap(&task.title, &task.description, &body, None)
    }

    /// Generate a static page.
    pub fn generate_static(&self, page: StaticPage) -> Result<String> {
        let body = self.render(page.template(), &self.site_context())?;
        self.wrap(page.title(), page.title(), &body, None)
    }

    fn render(&self, name: &str, ctx: &TemplateContext) -> Result<String> {
        Ok(self.templates.render(name, ctx, &self.helpers)?)
    }

    fn site_context(&self) -> TemplateContext {
        TemplateContext::new()
            .with_var("site_name", &self.site.name)
            .with_var("lang", &self.site.language)
    }

    fn lesson_context(&self, lesson: &Lesson) -> TemplateContext {
        self.site_context()
            .with_var("title", &lesson.title)
            .with_var("description", &lesson.description)
            .with_var("grade", lesson.grade.to_string())
            .with_var("embed_url", &lesson.embed_url)
    }

    fn wrap(
        &self,
        title: &str,
        description: &str,
        content: &str,
        head_extra: Option<String>,
    ) -> Result<String> {
        let mut ctx = self
            .site_context()
            .with_var("title", title)
            .with_var("description", description)
            .with_var("content", content);
        if let Some(head) = head_extra {
            ctx.insert("head_extra", head);
        }
        self.render("base.html", &ctx)
    }
}

fn task_context(task: &Task) -> TemplateContext {
    TemplateContext::new()
        .with_var("title", &task.title)
        .with_var("description", &task.description)
        .with_var("code", &task.code)
        .with_var("url", Route::Task(task.id).logical_path())
}
