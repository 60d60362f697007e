//! Errors when extracting dataset metadata

use std::path::PathBuf;

use thiserror::Error;

use crate::ms::MsError;

#[derive(Error, Debug)]
/// Why a dataset summary couldn't be produced
pub enum MetadataError {
    /// The path could not be opened or interpreted as a dataset.
    #[error("{path} is not a valid measurement set: {reason}")]
    NotAValidDataset {
        /// The offending path
        path: PathBuf,
        /// What went wrong when opening
        reason: String,
    },

    /// The dataset opened, but reading it failed.
    #[error("Couldn't read {path}: {source}")]
    Toolkit {
        /// The dataset being read
        path: PathBuf,
        /// The underlying table error
        source: MsError,
    },

    /// A query was made with no dataset open.
    #[error("No dataset is open")]
    NotOpen,

    /// A spectral window index past the end of the table.
    #[error("Spectral window {spw} requested, but there are only {num_spws}")]
    SpwOutOfRange {
        /// The requested index
        spw: usize,
        /// The number of spectral windows
        num_spws: usize,
    },

    /// A spectral window with an empty `CHAN_FREQ`.
    #[error("Spectral window {spw} has no channel frequencies")]
    NoChannelFreqs {
        /// The spectral window index
        spw: usize,
    },

    /// The observation table has no rows.
    #[error("The dataset has no observatory names")]
    NoObservatoryNames,
}
