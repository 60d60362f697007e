//! A [`MetadataService`] which reads casacore tables directly.

use std::path::{Path, PathBuf};

use log::debug;

use super::{FreqUnit, MetadataError, MetadataService, SummaryRecord};
use crate::ms::{MsError, MsTables};

struct OpenMs {
    path: PathBuf,
    tables: MsTables,
}

impl OpenMs {
    fn toolkit_error<E: Into<MsError>>(&self, e: E) -> MetadataError {
        MetadataError::Toolkit {
            path: self.path.clone(),
            source: e.into(),
        }
    }

    fn check_spw(&self, spw: usize) -> Result<(), MetadataError> {
        let num_spws = self.tables.spectral_window.n_rows() as usize;
        if spw >= num_spws {
            return Err(MetadataError::SpwOutOfRange { spw, num_spws });
        }
        Ok(())
    }
}

/// Reads the `SPECTRAL_WINDOW`, `OBSERVATION`, `FIELD` and `ANTENNA`
/// subtables and the main table of a measurement set.
#[derive(Default)]
pub struct CasaTablesMetadata {
    open: Option<OpenMs>,
}

impl CasaTablesMetadata {
    /// A service with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> Result<&mut OpenMs, MetadataError> {
        self.open.as_mut().ok_or(MetadataError::NotOpen)
    }
}

impl MetadataService for CasaTablesMetadata {
    fn open(&mut self, path: &Path) -> Result<(), MetadataError> {
        self.close();
        let tables = MsTables::open(path).map_err(|e| MetadataError::NotAValidDataset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("opened measurement set {}", path.display());
        self.open = Some(OpenMs {
            path: path.to_path_buf(),
            tables,
        });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(ms) = self.open.take() {
            debug!("closed measurement set {}", ms.path.display());
        }
    }

    fn nspw(&mut self) -> Result<usize, MetadataError> {
        let ms = self.current()?;
        Ok(ms.tables.spectral_window.n_rows() as usize)
    }

    fn nchan(&mut self, spw: usize) -> Result<usize, MetadataError> {
        let ms = self.current()?;
        ms.check_spw(spw)?;
        let num_chan = match ms
            .tables
            .spectral_window
            .get_cell::<i32>("NUM_CHAN", spw as u64)
        {
            Ok(n) => n,
            Err(e) => return Err(ms.toolkit_error(e)),
        };
        Ok(num_chan.max(0) as usize)
    }

    fn chanfreqs(&mut self, spw: usize, unit: FreqUnit) -> Result<Vec<f64>, MetadataError> {
        let ms = self.current()?;
        ms.check_spw(spw)?;
        let freqs_hz: Vec<f64> = match ms
            .tables
            .spectral_window
            .get_cell_as_vec("CHAN_FREQ", spw as u64)
        {
            Ok(freqs) => freqs,
            Err(e) => return Err(ms.toolkit_error(e)),
        };
        let scale = unit.hz();
        Ok(freqs_hz.into_iter().map(|f| f / scale).collect())
    }

    fn observatorynames(&mut self) -> Result<Vec<String>, MetadataError> {
        let ms = self.current()?;
        match ms.tables.observation.get_col_as_vec("TELESCOPE_NAME") {
            Ok(names) => Ok(names),
            Err(e) => Err(ms.toolkit_error(e)),
        }
    }

    fn nantennas(&mut self) -> Result<usize, MetadataError> {
        let ms = self.current()?;
        Ok(ms.tables.antenna.n_rows() as usize)
    }

    fn summary(&mut self) -> Result<SummaryRecord, MetadataError> {
        let ms = self.current()?;
        let fields: Vec<String> = match ms.tables.field.get_col_as_vec("NAME") {
            Ok(fields) => fields,
            Err(e) => return Err(ms.toolkit_error(e)),
        };
        Ok(SummaryRecord {
            fields,
            nrows: ms.tables.main.n_rows(),
        })
    }
}
