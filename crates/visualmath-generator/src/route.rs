//! Route planning.
//!
//! Maps each page of the exported site to the file it is written to and the
//! public path links point at.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;
use visualmath_core::{LessonId, TaskId};

/// Route planning errors.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Two routes would be written to the same file.
    #[error("routes {first} and {second} both resolve to {}", path.display())]
    DuplicatePath {
        path: PathBuf,
        first: String,
        second: String,
    },
}

/// Result type for route planning.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Pages that carry no data of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticPage {
    Privacy,
    Terms,
}

impl StaticPage {
    /// All static pages, in export order.
    pub const ALL: [StaticPage; 2] = [StaticPage::Privacy, StaticPage::Terms];

    /// URL segment and directory name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::Terms => "terms",
        }
    }

    /// Template rendering the page body.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::Privacy => "privacy.html",
            Self::Terms => "terms.html",
        }
    }

    /// Document title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Privacy => "Privacy Policy",
            Self::Terms => "Terms of Use",
        }
    }
}

/// A page of the exported site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Grade(i32),
    Lesson(LessonId),
    LessonAmp(LessonId),
    Task(TaskId),
    Static(StaticPage),
}

impl Route {
    /// Site-relative path, before the base path is applied.
    #[must_use]
    pub fn logical_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Grade(grade) => format!("/grade/{grade}"),
            Self::Lesson(id) => format!("/lesson/{id}"),
            Self::LessonAmp(id) => format!("/lesson/{id}/amp.html"),
            Self::Task(id) => format!("/task/{id}"),
            Self::Static(page) => format!("/{}", page.name()),
        }
    }

    /// File path relative to the output root.
    #[must_use]
    pub fn relative_file(&self) -> PathBuf {
        match self {
            Self::Home => PathBuf::from("index.html"),
            Self::Grade(grade) => Path::new("grade").join(grade.to_string()).join("index.html"),
            Self::Lesson(id) => Path::new("lesson").join(id.to_string()).join("index.html"),
            Self::LessonAmp(id) => Path::new("lesson").join(id.to_string()).join("amp.html"),
            Self::Task(id) => Path::new("task").join(id.to_string()).join("index.html"),
            Self::Static(page) => Path::new(page.name()).join("index.html"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Grade(grade) => write!(f, "grade {grade}"),
            Self::Lesson(id) => write!(f, "lesson {id}"),
            Self::LessonAmp(id) => write!(f, "amp lesson {id}"),
            Self::Task(id) => write!(f, "task {id}"),
            Self::Static(page) => write!(f, "{} page", page.name()),
        }
    }
}

/// URL prefix the site is served under.
///
/// `/` is the root sentinel; any other value is kept without its trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePath(Option<String>);

impl BasePath {
    /// Parse a configured base path.
    #[must_use]
    pub fn new(base: &str) -> Self {
        let trimmed = base.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            Self(None)
        } else if trimmed.starts_with('/') {
            Self(Some(trimmed.to_string()))
        } else {
            Self(Some(format!("/{trimmed}")))
        }
    }

    /// The root base path.
    #[must_use]
    pub fn root() -> Self {
        Self(None)
    }

    /// Whether this is the root sentinel.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// Prefix a logical path with the base path.
    #[must_use]
    pub fn apply(&self, logical: &str) -> String {
        let logical = logical.trim();
        match &self.0 {
            None => logical.to_string(),
            Some(base) if logical.starts_with('/') => format!("{base}{logical}"),
            Some(base) => format!("{base}/{logical}"),
        }
    }
}

impl Default for BasePath {
    fn default() -> Self {
        Self::root()
    }
}

/// A route with its output file and public path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,

    /// Absolute file path under the output root.
    pub file: PathBuf,

    /// Site-relative path, used for the sitemap.
    pub logical_path: String,

    /// Path used in links, with the base path applied.
    pub url: String,
}

/// Resolves routes against an output root and a base path.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    base: BasePath,
}

impl PathResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base: BasePath) -> Self {
        Self {
            root: root.into(),
            base,
        }
    }

    /// Resolve a single route.
    #[must_use]
    pub fn resolve(&self, route: Route) -> ResolvedRoute {
        let logical_path = route.logical_path();
        ResolvedRoute {
            route,
            file: self.root.join(route.relative_file()),
            url: self.base.apply(&logical_path),
            logical_path,
        }
    }

    /// Resolve every route, rejecting any two that share a file.
    pub fn plan(&self, routes: &[Route]) -> Result<Vec<ResolvedRoute>> {
        let mut seen: HashMap<PathBuf, Route> = HashMap::with_capacity(routes.len());
        let mut planned = Vec::with_capacity(routes.len());

        for &route in routes {
            let resolved = self.resolve(route);
            if let Some(first) = seen.insert(resolved.file.clone(), route) {
                return Err(RouteError::DuplicatePath {
                    path: resolved.file,
                    first: first.to_string(),
                    second: route.to_string(),
                });
            }
            planned.push(resolved);
        }

        Ok(planned)
    }
}
