//! Read-only access to CASA measurement set tables.
//!
//! More info: https://casa.nrao.edu/Memos/229.html#SECTION00060000000000000000

mod error;

pub use error::MsError;

use std::path::Path;

use log::trace;

use crate::marlu::{
    hifitime::Epoch,
    rubbl_casatables::{Table, TableOpenMode},
};

/// Seconds in a day, for casacore MJD seconds.
const SECONDS_PER_DAY: f64 = 86400.0;

/// Open a measurement set table read only. If `table` is `None`, then open the
/// main table.
///
/// # Errors
///
/// Can throw [`MsError::TableOpen`] if casacore can't open the table.
pub fn read_table(ms: &Path, table: Option<&str>) -> Result<Table, MsError> {
    let path = match table {
        Some(name) => ms.join(name),
        None => ms.to_path_buf(),
    };
    trace!("opening table {}", path.display());
    Table::open(&path, TableOpenMode::Read).map_err(|e| MsError::TableOpen {
        ms: ms.to_path_buf(),
        table: table.unwrap_or("MAIN").to_string(),
        message: e.to_string(),
    })
}

/// The tables every reader in this crate needs.
pub struct MsTables {
    /// The main (visibility) table
    pub main: Table,
    /// `SPECTRAL_WINDOW`
    pub spectral_window: Table,
    /// `OBSERVATION`
    pub observation: Table,
    /// `FIELD`
    pub field: Table,
    /// `ANTENNA`
    pub antenna: Table,
}

impl MsTables {
    /// Open the main table and the `SPECTRAL_WINDOW`, `OBSERVATION`, `FIELD`
    /// and `ANTENNA` subtables.
    ///
    /// # Errors
    ///
    /// Can throw [`MsError::BadFile`] if `ms` is not a directory, or
    /// [`MsError::TableOpen`] if any table can't be opened.
    pub fn open(ms: &Path) -> Result<Self, MsError> {
        if !ms.is_dir() {
            return Err(MsError::BadFile(ms.to_path_buf()));
        }
        Ok(Self {
            main: read_table(ms, None)?,
            spectral_window: read_table(ms, Some("SPECTRAL_WINDOW"))?,
            observation: read_table(ms, Some("OBSERVATION"))?,
            field: read_table(ms, Some("FIELD"))?,
            antenna: read_table(ms, Some("ANTENNA"))?,
        })
    }
}

/// Convert a casacore time (UTC seconds since the MJD epoch) to an [`Epoch`].
pub fn casacore_utc_to_epoch(utc_seconds: f64) -> Epoch {
    Epoch::from_mjd_utc(utc_seconds / SECONDS_PER_DAY)
}
