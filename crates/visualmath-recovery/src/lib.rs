//! VisualMath Recovery Library
//!
//! Rebuilds lesson and task records from the pages of a previously exported
//! site, for when the database is lost but the published tree survives.
//!
//! # Modules
//!
//! - [`extract`] - Field extraction from page markup
//! - [`scan`] - Walking the exported tree
//! - [`reconcile`] - Insert-if-absent reconciliation with the store

pub mod extract;
pub mod reconcile;
pub mod scan;

use std::path::Path;

use thiserror::Error;
use tracing::info;
use visualmath_core::Config;
use visualmath_store::{LessonStore, StoreError};

pub use extract::{
    DocumentExtractor, PatternExtractor, RecoveredLesson, RecoveredTask, unescape_html,
};
pub use reconcile::{RecoveryReport, reconcile};
pub use scan::{ScannedSite, scan_site};

/// Recovery errors.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// An extraction pattern could not be compiled from the configuration.
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for recovery operations.
pub type Result<T> = std::result::Result<T, RecoveryError>;

/// Recover records from the exported site at `source` into `store`.
pub fn recover(
    config: &Config,
    store: &mut dyn LessonStore,
    source: &Path,
) -> Result<RecoveryReport> {
    let extractor = PatternExtractor::from_config(config)?;
    recover_with(&extractor, store, source)
}

/// Recover using a specific extractor.
pub fn recover_with(
    extractor: &dyn DocumentExtractor,
    store: &mut dyn LessonStore,
    source: &Path,
) -> Result<RecoveryReport> {
    let site = scan_site(source, extractor);
    let report = reconcile(&site, store)?;

    info!(
        source = %source.display(),
        reconciled = report.reconciled(),
        "recovery complete"
    );
    Ok(report)
}
