//! Record extraction from generated pages.

use regex::Regex;
use visualmath_core::{Config, LessonId, TaskId};
use visualmath_generator::template::escape_html;

/// Lesson fields recovered from a lesson page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredLesson {
    pub id: LessonId,
    pub title: String,
    pub grade: i32,
    pub embed_url: String,
    pub description: String,
    /// Task ids linked from the page, in document order, duplicates kept.
    pub task_ids: Vec<TaskId>,
}

/// Task fields recovered from a task page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredTask {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub code: String,
}

/// Extracts lesson and task records from document text.
///
/// Extraction never fails: a field that cannot be found comes back empty.
pub trait DocumentExtractor {
    /// Extract a lesson from the text of `lesson/<id>/index.html`.
    fn extract_lesson(&self, id: LessonId, document: &str) -> RecoveredLesson;

    /// Extract a task from the text of `task/<id>/index.html`.
    fn extract_task(&self, id: TaskId, document: &str) -> RecoveredTask;
}

/// Regex-based extractor matching the markup of the built-in theme.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    title: Regex,
    grade: Regex,
    embed: Regex,
    description: Regex,
    task_link: Regex,
    srcdoc: Regex,
    default_grade: i32,
}

impl PatternExtractor {
    /// Build an extractor for a site name and presentation host.
    pub fn new(
        site_name: &str,
        presentation_host: &str,
        default_grade: i32,
    ) -> Result<Self, regex::Error> {
        let site_name = regex::escape(&escape_html(site_name));
        let host = regex::escape(presentation_host);

        Ok(Self {
            title: Regex::new(&format!(r"<title>(.+?) \| {site_name}</title>"))?,
            grade: Regex::new(r"/grade/(\d+)")?,
            embed: Regex::new(&format!(r#"<iframe[^>]+src="([^"]+{host}[^"]+)""#))?,
            description: Regex::new(r#"<meta name="description" content="([^"]+)""#)?,
            task_link: Regex::new(r"/task/(\d+)")?,
            srcdoc: Regex::new(r#"srcdoc="([^"]*)""#)?,
            default_grade,
        })
    }

    /// Build an extractor from the site and recovery settings.
    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        Self::new(
            &config.site.name,
            &config.recovery.presentation_host,
            config.recovery.default_grade,
        )
    }

    fn first(re: &Regex, document: &str) -> String {
        re.captures(document)
            .and_then(|caps| caps.get(1))
            .map(|m| unescape_html(m.as_str()))
            .unwrap_or_default()
    }
}

impl DocumentExtractor for PatternExtractor {
    fn extract_lesson(&self, id: LessonId, document: &str) -> RecoveredLesson {
        let grade = self
            .grade
            .captures(document)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(self.default_grade);

        let task_ids = self
            .task_link
            .captures_iter(document)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        RecoveredLesson {
            id,
            title: Self::first(&self.title, document),
            grade,
            embed_url: Self::first(&self.embed, document),
            description: Self::first(&self.description, document),
            task_ids,
        }
    }

    fn extract_task(&self, id: TaskId, document: &str) -> RecoveredTask {
        RecoveredTask {
            id,
            title: Self::first(&self.title, document),
            description: Self::first(&self.description, document),
            code: Self::first(&self.srcdoc, document),
        }
    }
}

/// Undo attribute escaping.
///
/// `&amp;` is replaced after the angle brackets so `&amp;lt;` comes back as
/// `&lt;` rather than `<`.
#[must_use]
pub fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LESSON_PAGE: &str = r#"<!DOCTYPE html>
<html lang="kk">
<head>
    <title>Fractions &amp; decimals | VisualMath</title>
    <meta name="description" content="Adding &quot;like&quot; fractions">
</head>
<body>
    <a href="/">VisualMath</a>
    <a class="back" href="/grade/6">Grade 6</a>
    <iframe src="https://www.youtube.com/embed/x"></iframe>
    <iframe src="https://www.canva.com/design/DAF1/view?embed" loading="lazy"></iframe>
    <a href="/task/12">One</a>
    <a href="/task/7">Two</a>
    <a href="/task/12">One again</a>
    <a href="/grade/9">Other</a>
</body>
</html>"#;

    fn extractor() -> PatternExtractor {
        PatternExtractor::new("VisualMath", "canva.com", 5).unwrap()
    }

    #[test]
    fn test_extract_lesson_fields() {
        let lesson = extractor().extract_lesson(3, LESSON_PAGE);

        assert_eq!(lesson.id, 3);
        assert_eq!(lesson.title, "Fractions & decimals");
        assert_eq!(lesson.grade, 6);
        assert_eq!(lesson.embed_url, "https://www.canva.com/design/DAF1/view?embed");
        assert_eq!(lesson.description, r#"Adding "like" fractions"#);
        assert_eq!(lesson.task_ids, vec![12, 7, 12]);
    }

    #[test]
    fn test_extract_lesson_defaults() {
        let lesson = extractor().extract_lesson(1, "<html><body>nothing</body></html>");

        assert_eq!(lesson.grade, 5);
        assert!(lesson.title.is_empty());
        assert!(lesson.embed_url.is_empty());
        assert!(lesson.description.is_empty());
        assert!(lesson.task_ids.is_empty());
    }

    #[test]
    fn test_title_requires_site_suffix() {
        let doc = "<title>Fractions | Other Site</title>";
        assert!(extractor().extract_lesson(1, doc).title.is_empty());
    }

    #[test]
    fn test_custom_site_name_and_host() {
        let extractor = PatternExtractor::new("Maths & Co", "slides.example.org", 7).unwrap();
        let doc = r#"<title>Angles | Maths &amp; Co</title>
<iframe src="https://www.canva.com/design/A/view?embed"></iframe>
<iframe class="p" src="https://slides.example.org/deck/4"></iframe>"#;

        let lesson = extractor.extract_lesson(2, doc);
        assert_eq!(lesson.title, "Angles");
        assert_eq!(lesson.embed_url, "https://slides.example.org/deck/4");
        assert_eq!(lesson.grade, 7);
    }

    #[test]
    fn test_extract_task_unescapes_srcdoc() {
        let doc = r#"<title>Compare | VisualMath</title>
<meta name="description" content="Which is larger?">
<iframe class="task-frame" srcdoc="<p>x &lt; y &amp; z</p>"></iframe>"#;

        let task = extractor().extract_task(9, doc);
        assert_eq!(task.id, 9);
        assert_eq!(task.title, "Compare");
        assert_eq!(task.description, "Which is larger?");
        assert_eq!(task.code, "<p>x < y & z</p>");
    }

    #[test]
    fn test_extract_task_first_srcdoc_wins() {
        let doc = r#"<iframe srcdoc="first"></iframe><iframe srcdoc="second"></iframe>"#;
        assert_eq!(extractor().extract_task(1, doc).code, "first");
    }

    #[test]
    fn test_unescape_order() {
        assert_eq!(unescape_html("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(unescape_html("&#34;a&#39; &quot;b&quot;"), "\"a' \"b\"");
    }
}
