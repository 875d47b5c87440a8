//! Import command - loads lessons and tasks from JSON

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use visualmath_core::Lesson;
use visualmath_store::LessonStore;

use super::{load_config, open_store};

/// Records written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub lessons_inserted: usize,
    pub lessons_existing: usize,
    pub tasks_inserted: usize,
    pub tasks_existing: usize,
}

/// Run the import command.
///
/// The file holds a JSON array of lessons, each with an optional `tasks`
/// array. Records already in the database are left alone.
pub fn run(config_path: &Path, database: Option<&Path>, file: &Path) -> Result<ImportReport> {
    tracing::info!(?file, "Starting import");

    let config = load_config(config_path, database)?;
    let content = fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let lessons =
        parse_lessons(&content).wrap_err_with(|| format!("Failed to parse {}", file.display()))?;

    let mut store = open_store(&config)?;
    let report = import_lessons(&mut store, &lessons)?;

    println!();
    println!("  Import finished");
    println!();
    println!(
        "  Lessons:    {} inserted, {} already present",
        report.lessons_inserted, report.lessons_existing
    );
    println!(
        "  Tasks:      {} inserted, {} already present",
        report.tasks_inserted, report.tasks_existing
    );
    println!();

    tracing::info!(?report, "Import completed");

    Ok(report)
}

/// Parse and normalize a JSON array of lessons.
pub fn parse_lessons(json: &str) -> Result<Vec<Lesson>> {
    let mut lessons: Vec<Lesson> = serde_json::from_str(json)?;
    for lesson in &mut lessons {
        lesson.normalize();
    }
    Ok(lessons)
}

/// Insert every lesson and task the store does not have yet.
pub fn import_lessons(store: &mut dyn LessonStore, lessons: &[Lesson]) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for lesson in lessons {
        if store.contains_lesson(lesson.id)? {
            report.lessons_existing += 1;
        } else {
            store
                .insert_lesson(&lesson.without_tasks())
                .wrap_err_with(|| format!("Failed to import lesson {}", lesson.id))?;
            report.lessons_inserted += 1;
        }

        for task in &lesson.tasks {
            if store.contains_task(task.id)? {
                report.tasks_existing += 1;
                continue;
            }
            store
                .insert_task(task)
                .wrap_err_with(|| format!("Failed to import task {}", task.id))?;
            report.tasks_inserted += 1;
        }
    }

    Ok(report)
}
