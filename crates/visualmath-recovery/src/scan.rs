//! Generated-site scanning.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::extract::{DocumentExtractor, RecoveredLesson, RecoveredTask};

/// Records recovered from a generated site, each list in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedSite {
    pub lessons: Vec<RecoveredLesson>,
    pub tasks: Vec<RecoveredTask>,
}

/// Scan `<source>/lesson/<id>/index.html` and `<source>/task/<id>/index.html`.
///
/// Missing directories and unreadable pages are logged and skipped.
pub fn scan_site(source: &Path, extractor: &dyn DocumentExtractor) -> ScannedSite {
    info!(source = %source.display(), "scanning generated site");

    let lessons: Vec<_> = numbered_pages(&source.join("lesson"))
        .into_iter()
        .filter_map(|(id, path)| read_page(&path).map(|doc| extractor.extract_lesson(id, &doc)))
        .inspect(|lesson| {
            if lesson.title.is_empty() {
                warn!(id = lesson.id, "lesson page has no title");
            }
            if lesson.embed_url.is_empty() {
                warn!(id = lesson.id, "lesson page has no presentation");
            }
        })
        .collect();

    let tasks: Vec<_> = numbered_pages(&source.join("task"))
        .into_iter()
        .filter_map(|(id, path)| read_page(&path).map(|doc| extractor.extract_task(id, &doc)))
        .inspect(|task| {
            if task.code.is_empty() {
                warn!(id = task.id, "task page has no embedded code");
            }
        })
        .collect();

    info!(
        lessons = lessons.len(),
        tasks = tasks.len(),
        "scanned generated site"
    );

    ScannedSite { lessons, tasks }
}

/// `index.html` of every positive, numerically named subdirectory, by id.
fn numbered_pages(dir: &Path) -> Vec<(i64, PathBuf)> {
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "directory not found, nothing to recover");
        return Vec::new();
    }

    let mut pages: Vec<_> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "failed to read directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let id = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<i64>().ok())
                .filter(|&id| id > 0);
            if id.is_none() {
                debug!(path = %entry.path().display(), "skipping non-numeric directory");
            }
            id.map(|id| (id, entry.path().join("index.html")))
        })
        .collect();

    pages.sort_by_key(|(id, _)| *id);
    pages
}

fn read_page(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable page");
            None
        }
    }
}
