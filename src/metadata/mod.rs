//! Extract summary metadata from a dataset through a [`MetadataService`].

mod casa;
mod error;

pub use casa::CasaTablesMetadata;
pub use error::MetadataError;

use std::{
    ops::{Deref, DerefMut},
    path::Path,
};

use log::trace;

use crate::dataset::DatasetSummary;

/// Units for channel frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreqUnit {
    /// Hertz, as stored in the `CHAN_FREQ` column
    Hz,
    /// Kilohertz
    KHz,
    /// Megahertz
    MHz,
    /// Gigahertz
    GHz,
}

impl FreqUnit {
    /// Number of Hz in one of this unit.
    pub fn hz(self) -> f64 {
        match self {
            FreqUnit::Hz => 1.0,
            FreqUnit::KHz => 1e3,
            FreqUnit::MHz => 1e6,
            FreqUnit::GHz => 1e9,
        }
    }
}

/// The parts of a dataset summary record that we use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRecord {
    /// Field names
    pub fields: Vec<String>,
    /// Rows in the main table
    pub nrows: u64,
}

/// Something which can open a dataset and answer questions about it.
///
/// At most one dataset is open at a time. Every query other than `open`
/// fails with [`MetadataError::NotOpen`] when nothing is open.
pub trait MetadataService {
    /// Open a dataset, closing any previously opened one.
    ///
    /// # Errors
    ///
    /// Should return [`MetadataError::NotAValidDataset`] if `path` can't be
    /// interpreted as a dataset.
    fn open(&mut self, path: &Path) -> Result<(), MetadataError>;

    /// Release the open dataset. Closing when nothing is open is a no-op.
    fn close(&mut self);

    /// Number of spectral windows.
    ///
    /// # Errors
    ///
    /// Can throw [`MetadataError`] if the dataset can't be read.
    fn nspw(&mut self) -> Result<usize, MetadataError>;

    /// Number of channels in spectral window `spw`.
    ///
    /// # Errors
    ///
    /// Can throw [`MetadataError::SpwOutOfRange`] or a read error.
    fn nchan(&mut self, spw: usize) -> Result<usize, MetadataError>;

    /// Channel frequencies of spectral window `spw` in `unit`.
    ///
    /// # Errors
    ///
    /// Can throw [`MetadataError::SpwOutOfRange`] or a read error.
    fn chanfreqs(&mut self, spw: usize, unit: FreqUnit) -> Result<Vec<f64>, MetadataError>;

    /// Names of the observatories, one per observation.
    ///
    /// # Errors
    ///
    /// Can throw [`MetadataError`] if the dataset can't be read.
    fn observatorynames(&mut self) -> Result<Vec<String>, MetadataError>;

    /// Number of antennas.
    ///
    /// # Errors
    ///
    /// Can throw [`MetadataError`] if the dataset can't be read.
    fn nantennas(&mut self) -> Result<usize, MetadataError>;

    /// Field names and row count.
    ///
    /// # Errors
    ///
    /// Can throw [`MetadataError`] if the dataset can't be read.
    fn summary(&mut self) -> Result<SummaryRecord, MetadataError>;
}

/// A dataset held open on a [`MetadataService`]. The service is closed when
/// the session is dropped, whichever way the caller leaves.
pub struct MetadataSession<'a, M: MetadataService + ?Sized> {
    service: &'a mut M,
}

impl<'a, M: MetadataService + ?Sized> MetadataSession<'a, M> {
    /// Open `path` on `service`.
    ///
    /// # Errors
    ///
    /// Propagates the error from [`MetadataService::open`]. The service is
    /// closed before returning it.
    pub fn open(service: &'a mut M, path: &Path) -> Result<Self, MetadataError> {
        if let Err(e) = service.open(path) {
            service.close();
            return Err(e);
        }
        Ok(Self { service })
    }
}

impl<M: MetadataService + ?Sized> Deref for MetadataSession<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        &*self.service
    }
}

impl<M: MetadataService + ?Sized> DerefMut for MetadataSession<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut *self.service
    }
}

impl<M: MetadataService + ?Sized> Drop for MetadataSession<'_, M> {
    fn drop(&mut self) {
        self.service.close();
    }
}

/// Read a [`DatasetSummary`] from the dataset at `path`.
///
/// Either every field is read, or an error is returned; there are no partial
/// summaries.
///
/// # Errors
///
/// [`MetadataError::NotAValidDataset`] if the service couldn't open `path`,
/// otherwise whatever error the service raised while reading.
pub fn extract<M: MetadataService + ?Sized>(
    service: &mut M,
    path: &Path,
) -> Result<DatasetSummary, MetadataError> {
    trace!("extracting metadata from {}", path.display());
    let mut session = MetadataSession::open(service, path)?;

    let summary_record = session.summary()?;
    let num_spws = session.nspw()?;
    let mut num_chans = Vec::with_capacity(num_spws);
    let mut first_chan_freqs_ghz = Vec::with_capacity(num_spws);
    for spw in 0..num_spws {
        num_chans.push(session.nchan(spw)?);
        let freqs = session.chanfreqs(spw, FreqUnit::GHz)?;
        match freqs.first() {
            Some(&freq) => first_chan_freqs_ghz.push(freq),
            None => return Err(MetadataError::NoChannelFreqs { spw }),
        }
    }
    let observatory = session
        .observatorynames()?
        .into_iter()
        .next()
        .ok_or(MetadataError::NoObservatoryNames)?;
    let num_antennas = session.nantennas()?;
    drop(session);

    Ok(DatasetSummary {
        observatory,
        num_rows: summary_record.nrows,
        num_spws,
        num_chans,
        first_chan_freqs_ghz,
        field_names: summary_record.fields,
        num_antennas,
    })
}
