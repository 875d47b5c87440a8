//! Recover command - rebuilds the database from an exported site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use visualmath_recovery::RecoveryReport;

use super::{load_config, open_store};

/// Run the recover command.
///
/// Scans the exported lesson and task pages and inserts every record the
/// database does not already have.
pub fn run(
    config_path: &Path,
    database: Option<&Path>,
    source: Option<&Path>,
) -> Result<RecoveryReport> {
    let start = Instant::now();
    let config = load_config(config_path, database)?;
    let source = source.unwrap_or(config.recovery.source_dir.as_path());
    tracing::info!(?source, database = ?config.database.path, "Starting recovery");

    if !source.is_dir() {
        tracing::warn!(?source, "source directory does not exist");
    }

    let mut store = open_store(&config)?;
    let report = visualmath_recovery::recover(&config, &mut store, source)
        .wrap_err("Recovery failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Recovery finished: {} records reconciled", report.reconciled());
    println!();
    println!(
        "  Lessons:    {} inserted ({} incomplete), {} already present",
        report.lessons_inserted, report.lessons_incomplete, report.lessons_existing
    );
    println!(
        "  Tasks:      {} inserted ({} incomplete), {} already present",
        report.tasks_inserted, report.tasks_incomplete, report.tasks_existing
    );
    println!("  Orphans:    {}", report.orphans);
    println!("  Conflicts:  {}", report.conflicts);
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Database:   {}", config.database.path.display());
    println!();

    tracing::info!(%report, ?duration, "Recovery completed");

    Ok(report)
}
