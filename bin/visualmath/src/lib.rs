//! VisualMath CLI Library
//!
//! Command implementations for the `visualmath` binary, exposed as a library
//! so they can be driven from tests.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (export, recover, import, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use visualmath::cmd;
//!
//! // Export the site with the settings from visualmath.toml
//! cmd::export::run(Path::new("visualmath.toml"), None, None, None).unwrap();
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use visualmath_core::{Config, Lesson, Task};
pub use visualmath_generator::{BuildStats, Builder};
pub use visualmath_recovery::RecoveryReport;

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// visualmath::init_tracing(2); // Enable DEBUG level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
