//! Errors that can abort an inventory run.
//!
//! Per-dataset failures live in [`crate::metadata::MetadataError`] and
//! [`crate::listobs::ListingError`]; those are logged and swallowed by the
//! batch operations, and never surface here.

use std::path::PathBuf;

use thiserror::Error;

use crate::{enumerate::EnumerateError, inventory::InventoryContextBuilderError, report::ReportError};

#[derive(Error, Debug)]
/// All the errors that terminate a run
pub enum InventoryError {
    /// The root directory (or a subdirectory) could not be enumerated.
    #[error(transparent)]
    Enumerate(#[from] EnumerateError),

    /// Writing or archiving a report failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The observation listing directory could not be prepared.
    #[error("Couldn't prepare listing directory {path}: {source}")]
    ListobsDir {
        /// The directory being (re)created
        path: PathBuf,
        /// The underlying io error
        source: std::io::Error,
    },

    /// The context was missing a required field.
    #[error(transparent)]
    Builder(#[from] InventoryContextBuilderError),

    #[cfg(feature = "cli")]
    /// Error derived from [`clap::Error`], including `--help` and `--version`
    #[error(transparent)]
    ClapError(#[from] clap::Error),

    /// `--dry-run` was requested; nothing was written.
    #[error("Dry run")]
    DryRun {},
}
