//! Check command - validate configuration and lesson data

use std::{collections::HashSet, path::Path};

use color_eyre::eyre::{Result, bail};
use visualmath_core::{Config, TaskOrder};
use visualmath_store::LessonStore;

use super::{load_config, open_store};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Errors found.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings found.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration and every record in the database.
pub fn run(config_path: &Path, database: Option<&Path>, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and data");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match load_config(config_path, database) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e:#}"));
            println!("  ✗ Configuration invalid: {e:#}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking configuration values...");
        for warning in quick_validate(cfg) {
            result.add_warning(warning);
        }
        println!("  ✓ Configuration values checked");

        println!("\nChecking lesson data...");
        if cfg.database.path.exists() {
            let store = open_store(cfg)?;
            check_dataset(&store, &mut result)?;
        } else {
            result.add_warning(format!(
                "Database does not exist: {}",
                cfg.database.path.display()
            ));
            println!("  ⚠ {} missing", cfg.database.path.display());
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Quick validation of configuration values, used before an export.
///
/// Returns warnings; none of them stop an export.
pub fn quick_validate(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.site.domain.starts_with("http://") && !config.site.domain.starts_with("https://") {
        warnings.push("site.domain should start with http:// or https://".to_string());
    }

    if let Some(dir) = &config.build.templates_dir {
        if !dir.is_dir() {
            warnings.push(format!(
                "build.templates_dir does not exist: {} (built-in templates will be used)",
                dir.display()
            ));
        }
    }

    let output = &config.build.output_dir;
    if output.exists() && !output.is_dir() {
        warnings.push(format!(
            "Output path exists but is not a directory: {}",
            output.display()
        ));
    }

    warnings
}

/// Check every lesson and task in the store.
pub fn check_dataset(store: &dyn LessonStore, result: &mut ValidationResult) -> Result<()> {
    let lessons = store.lessons_with_tasks(TaskOrder::Insertion)?;
    let tasks = store.tasks()?;
    let lesson_ids: HashSet<_> = lessons.iter().map(|l| l.id).collect();

    let mut invalid = 0;
    for lesson in &lessons {
        if let Err(e) = lesson.validate() {
            result.add_error(e.to_string());
            invalid += 1;
        }
        if lesson.tasks.is_empty() {
            result.add_warning(format!("Lesson {} ({}) has no tasks", lesson.id, lesson.title));
        }
        if lesson.description.trim().is_empty() {
            result.add_warning(format!(
                "Lesson {} ({}) has an empty description",
                lesson.id, lesson.title
            ));
        }
    }

    let mut orphans = 0;
    for task in &tasks {
        if let Err(e) = task.validate() {
            result.add_error(e.to_string());
            invalid += 1;
        }
        if !lesson_ids.contains(&task.lesson_id) {
            result.add_warning(format!(
                "Task {} references missing lesson {}",
                task.id, task.lesson_id
            ));
            orphans += 1;
        }
    }

    if invalid == 0 {
        println!(
            "  ✓ {} lessons and {} tasks valid",
            lessons.len(),
            tasks.len()
        );
    } else {
        println!("  ✗ {invalid} invalid record(s)");
    }
    if orphans > 0 {
        println!("  ⚠ {orphans} orphan task(s)");
    }

    Ok(())
}
