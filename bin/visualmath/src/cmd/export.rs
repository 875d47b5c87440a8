//! Export command - renders the static site

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use visualmath_generator::{BuildStats, Builder};

use super::{check::quick_validate, load_config, open_store};

/// Run the export command.
///
/// Renders every page from the database into the output directory.
pub fn run(
    config_path: &Path,
    database: Option<&Path>,
    output: Option<&Path>,
    base_path: Option<&str>,
) -> Result<BuildStats> {
    let start = Instant::now();
    tracing::info!(?config_path, ?output, ?base_path, "Starting export");

    let mut config = load_config(config_path, database)?;

    if let Some(dir) = output {
        config.build.output_dir = dir.to_path_buf();
    }

    if let Some(bp) = base_path {
        tracing::info!(base_path = bp, "Overriding site base_path from CLI");
        config.site.base_path = bp.to_string();
        config.validate().wrap_err("Invalid base path")?;
    }

    let warnings = quick_validate(&config);
    if !warnings.is_empty() {
        println!();
        println!("  Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
        println!();
    }

    let store = open_store(&config)?;
    let output_dir = config.build.output_dir.clone();
    let base = config.site.base_path.clone();

    let stats = Builder::new(config, &store)
        .build(&output_dir, &base)
        .wrap_err("Export failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Export completed successfully!");
    println!();
    println!("  Grades:     {}", stats.grades);
    println!("  Lessons:    {}", stats.lessons);
    println!("  AMP pages:  {}", stats.amp_pages);
    println!("  Tasks:      {}", stats.tasks);
    println!("  Static:     {}", stats.static_pages);
    println!("  Sitemap:    {} URLs", stats.sitemap_entries);
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output_dir.display());
    println!();

    tracing::info!(?stats, ?duration, "Export completed successfully");

    Ok(stats)
}
