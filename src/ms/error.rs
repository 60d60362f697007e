//! Errors associated with reading CASA measurement set tables.

use std::path::PathBuf;

use thiserror::Error;

use crate::marlu::rubbl_casatables;

#[derive(Error, Debug)]
/// Errors when opening or reading a measurement set table
pub enum MsError {
    /// The path is not a directory, so it can't hold casacore tables.
    #[error("Supplied file path {0} does not exist or is not a directory!")]
    BadFile(PathBuf),

    /// A table could not be opened.
    #[error("Couldn't open table {table} of {ms}: {message}")]
    TableOpen {
        /// The measurement set path
        ms: PathBuf,
        /// The table name; "MAIN" for the main table
        table: String,
        /// casacore's message
        message: String,
    },

    /// Error from [`rubbl_casatables::TableError`]
    #[error("Error when trying to interface with measurement set: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    /// Error from [`rubbl_casatables::CasacoreError`]
    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),
}
