//! VisualMath CLI
//!
//! Exports the lesson site to static HTML and rebuilds the lesson database
//! from a previously exported site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for VisualMath.
#[derive(Parser)]
#[command(
    name = "visualmath",
    version,
    about = "Static export and recovery for the VisualMath lesson site"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "visualmath.toml", global = true)]
    config: PathBuf,

    /// Override the database file from the configuration
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Export the static site
    Export {
        /// Output directory (defaults to build.output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override site base path (e.g., /visualmath)
        #[arg(long)]
        base_path: Option<String>,
    },
    /// Rebuild lessons and tasks from a previously exported site
    Recover {
        /// Root of the exported site (defaults to recovery.source_dir)
        #[arg(short, long)]
        source: Option<PathBuf>,
    },
    /// Import lessons with their tasks from a JSON file
    Import {
        /// JSON file holding an array of lessons
        file: PathBuf,
    },
    /// Validate configuration and the lesson data
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    visualmath::init_tracing(cli.verbose);

    let database = cli.database.as_deref();
    match cli.command {
        Commands::Export { output, base_path } => {
            visualmath::cmd::export::run(
                &cli.config,
                database,
                output.as_deref(),
                base_path.as_deref(),
            )?;
        }
        Commands::Recover { source } => {
            visualmath::cmd::recover::run(&cli.config, database, source.as_deref())?;
        }
        Commands::Import { file } => {
            visualmath::cmd::import::run(&cli.config, database, &file)?;
        }
        Commands::Check { strict } => {
            visualmath::cmd::check::run(&cli.config, database, strict)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_export_command_parsing() {
        let args = ["visualmath", "export", "--output", "dist"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, PathBuf::from("visualmath.toml"));
        assert!(cli.database.is_none());
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Export { output, base_path } => {
                assert_eq!(output, Some(PathBuf::from("dist")));
                assert!(base_path.is_none());
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_export_with_base_path() {
        let args = ["visualmath", "export", "--base-path", "/visualmath"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Export { output, base_path } => {
                assert!(output.is_none());
                assert_eq!(base_path.as_deref(), Some("/visualmath"));
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_recover_command_parsing() {
        let args = ["visualmath", "recover", "--source", "old-docs"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Recover { source } => {
                assert_eq!(source, Some(PathBuf::from("old-docs")));
            }
            _ => panic!("Expected Recover command"),
        }
    }

    #[test]
    fn test_cli_import_command_parsing() {
        let args = ["visualmath", "import", "lessons.json"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Import { file } => {
                assert_eq!(file, PathBuf::from("lessons.json"));
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let args = ["visualmath", "check", "--strict"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Check { strict } => {
                assert!(strict);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let args = ["visualmath", "-vvv", "export"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let args = [
            "visualmath",
            "recover",
            "--config",
            "site.toml",
            "--database",
            "data/math_app.db",
        ];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert_eq!(cli.database, Some(PathBuf::from("data/math_app.db")));
    }
}
