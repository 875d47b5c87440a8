//! Build orchestration.
//!
//! Reads a snapshot of the store, plans every route, renders the site into a
//! staging directory next to the output root and swaps it into place once
//! everything has been written. A failed export leaves the previous output
//! untouched.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, warn};
use visualmath_core::{Config, Lesson, LessonId, Task, TaskId};
use visualmath_store::{LessonStore, StoreError};

use crate::{
    html::{HtmlError, HtmlGenerator},
    robots::{RobotsError, RobotsGenerator},
    route::{BasePath, PathResolver, ResolvedRoute, Route, RouteError, StaticPage},
    sitemap::{SitemapError, SitemapGenerator},
    template::TemplateRegistry,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The staging directory could not be prepared.
    #[error("failed to prepare output next to {}: {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Two routes resolve to the same file.
    #[error("duplicate route: {0}")]
    DuplicateRoute(#[from] RouteError),

    /// Rendering a page failed.
    #[error("failed to render {route}: {source}")]
    Render {
        route: String,
        #[source]
        source: HtmlError,
    },

    /// Writing a page failed.
    #[error("failed to write {route} to {}: {source}", path.display())]
    Write {
        route: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// Robots generation error.
    #[error("robots error: {0}")]
    Robots(#[from] RobotsError),

    /// Moving the finished tree into place failed.
    #[error("failed to replace {}: {source}", path.display())]
    Swap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of grade pages.
    pub grades: usize,

    /// Number of lesson pages.
    pub lessons: usize,

    /// Number of AMP lesson pages.
    pub amp_pages: usize,

    /// Number of task pages.
    pub tasks: usize,

    /// Number of static pages.
    pub static_pages: usize,

    /// Total pages written, home included.
    pub pages: usize,

    /// Number of sitemap entries.
    pub sitemap_entries: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Everything the export reads from the store, fetched up front.
#[derive(Debug, Default)]
struct SiteData {
    grades: Vec<i32>,
    grade_lessons: HashMap<i32, Vec<Lesson>>,
    lessons: Vec<Lesson>,
    tasks: Vec<Task>,
}

impl SiteData {
    fn load(store: &dyn LessonStore, config: &Config) -> Result<Self> {
        let grades = store.grades()?;
        let mut grade_lessons = HashMap::with_capacity(grades.len());
        for &grade in &grades {
            grade_lessons.insert(grade, store.lessons_by_grade(grade)?);
        }

        let lessons = store.lessons_with_tasks(config.build.task_order)?;
        let tasks = store.tasks()?;

        debug!(
            grades = grades.len(),
            lessons = lessons.len(),
            tasks = tasks.len(),
            task_order = config.build.task_order.as_str(),
            "loaded site data"
        );

        Ok(Self {
            grades,
            grade_lessons,
            lessons,
            tasks,
        })
    }

    /// Routes in sitemap order.
    fn routes(&self) -> Vec<Route> {
        let mut routes = Vec::with_capacity(
            1 + self.grades.len() + 2 * self.lessons.len() + self.tasks.len() + 2,
        );
        routes.push(Route::Home);
        routes.extend(self.grades.iter().map(|&g| Route::Grade(g)));
        routes.extend(self.lessons.iter().map(|l| Route::Lesson(l.id)));
        routes.extend(self.lessons.iter().map(|l| Route::LessonAmp(l.id)));
        routes.extend(self.tasks.iter().map(|t| Route::Task(t.id)));
        routes.extend(StaticPage::ALL.map(Route::Static));
        routes
    }
}

/// Site builder that orchestrates the export.
pub struct Builder<'a> {
    config: Config,
    store: &'a dyn LessonStore,
    templates: Option<TemplateRegistry>,
}

impl fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> Builder<'a> {
    /// Create a new builder reading from a store.
    #[must_use]
    pub fn new(config: Config, store: &'a dyn LessonStore) -> Self {
        Self {
            config,
            store,
            templates: None,
        }
    }

    /// Use a specific template registry instead of the configured one.
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Export the whole site into `output_root`, with links under `base_path`.
    pub fn build(&self, output_root: &Path, base_path: &str) -> Result<BuildStats> {
        let start = Instant::now();
        let base = BasePath::new(base_path);

        info!(
            output = %output_root.display(),
            base_path = %base_path,
            "starting export"
        );

        let parent = staging_parent(output_root);
        let staging = create_staging(&parent)?;

        let data = SiteData::load(self.store, &self.config)?;
        let resolver = PathResolver::new(staging.path(), base.clone());
        let planned = resolver.plan(&data.routes())?;

        let generator = match &self.templates {
            Some(templates) => {
                HtmlGenerator::with_templates(&self.config, base, templates.clone())
            }
            None => HtmlGenerator::new(&self.config, base),
        };

        let mut stats = self.render_all(&generator, &data, &planned)?;

        let paths: Vec<&str> = planned.iter().map(|r| r.logical_path.as_str()).collect();
        stats.sitemap_entries =
            SitemapGenerator::new(self.config.domain()).write(staging.path(), &paths)?;
        RobotsGenerator::new(self.config.domain()).generate(staging.path())?;

        swap_into_place(staging, output_root, &parent)?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            grades = stats.grades,
            lessons = stats.lessons,
            amp_pages = stats.amp_pages,
            tasks = stats.tasks,
            pages = stats.pages,
            sitemap_entries = stats.sitemap_entries,
            duration_ms = stats.duration_ms,
            "export complete"
        );

        Ok(stats)
    }

    fn render_all(
        &self,
        generator: &HtmlGenerator,
        data: &SiteData,
        planned: &[ResolvedRoute],
    ) -> Result<BuildStats> {
        let lessons: HashMap<LessonId, &Lesson> =
            data.lessons.iter().map(|l| (l.id, l)).collect();
        let tasks: HashMap<TaskId, &Task> = data.tasks.iter().map(|t| (t.id, t)).collect();

        info!(
            grades = data.grades.len(),
            lessons = data.lessons.len(),
            tasks = data.tasks.len(),
            "rendering pages"
        );

        let mut stats = BuildStats::default();
        for resolved in planned {
            let route = resolved.route;
            let html = match route {
                Route::Home => generator.generate_home(&data.grades),
                Route::Grade(grade) => {
                    stats.grades += 1;
                    let listed = data
                        .grade_lessons
                        .get(&grade)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    generator.generate_grade(grade, listed)
                }
                Route::Lesson(id) => {
                    stats.lessons += 1;
                    generator.generate_lesson(lessons[&id])
                }
                Route::LessonAmp(id) => {
                    stats.amp_pages += 1;
                    let canonical = self.config.url_for(&Route::Lesson(id).logical_path());
                    generator.generate_amp_lesson(lessons[&id], &canonical)
                }
                Route::Task(id) => {
                    stats.tasks += 1;
                    generator.generate_task(tasks[&id])
                }
                Route::Static(page) => {
                    stats.static_pages += 1;
                    generator.generate_static(page)
                }
            }
            .map_err(|source| BuildError::Render {
                route: route.to_string(),
                source,
            })?;

            write_page(resolved, &html)?;
            stats.pages += 1;
        }

        Ok(stats)
    }
}

/// Export the site with the configured output directory and base path.
pub fn export(config: &Config, store: &dyn LessonStore) -> Result<BuildStats> {
    Builder::new(config.clone(), store).build(&config.build.output_dir, &config.site.base_path)
}

fn write_page(resolved: &ResolvedRoute, html: &str) -> Result<()> {
    let write_err = |source| BuildError::Write {
        route: resolved.route.to_string(),
        path: resolved.file.clone(),
        source,
    };

    if let Some(parent) = resolved.file.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&resolved.file, html).map_err(write_err)?;

    debug!(path = %resolved.file.display(), "wrote page");
    Ok(())
}

fn staging_parent(output_root: &Path) -> PathBuf {
    output_root
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn create_staging(parent: &Path) -> Result<TempDir> {
    let setup_err = |source| BuildError::Setup {
        path: parent.to_path_buf(),
        source,
    };

    fs::create_dir_all(parent).map_err(setup_err)?;
    let staging = tempfile::Builder::new()
        .prefix(".visualmath-staging-")
        .tempdir_in(parent)
        .map_err(setup_err)?;

    // Temp dirs are created owner-only; the published tree must be readable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
            .map_err(setup_err)?;
    }

    debug!(path = %staging.path().display(), "created staging directory");
    Ok(staging)
}

/// Replace `output_root` with the staged tree.
///
/// The previous tree is moved aside first and only deleted once the new one
/// is in place; if the final rename fails it is moved back.
fn swap_into_place(staging: TempDir, output_root: &Path, parent: &Path) -> Result<()> {
    let swap_err = |source| BuildError::Swap {
        path: output_root.to_path_buf(),
        source,
    };

    if !output_root.exists() {
        fs::rename(staging.path(), output_root).map_err(swap_err)?;
        return Ok(());
    }

    let aside = parent.join(format!(".visualmath-previous-{}", std::process::id()));
    if aside.exists() {
        fs::remove_dir_all(&aside).map_err(swap_err)?;
    }

    fs::rename(output_root, &aside).map_err(swap_err)?;
    if let Err(source) = fs::rename(staging.path(), output_root) {
        if let Err(e) = fs::rename(&aside, output_root) {
            warn!(error = %e, path = %aside.display(), "failed to restore previous output");
        }
        return Err(swap_err(source));
    }

    if let Err(e) = fs::remove_dir_all(&aside) {
        warn!(error = %e, path = %aside.display(), "failed to remove previous output");
    }
    debug!(path = %output_root.display(), "replaced previous output");
    Ok(())
}
