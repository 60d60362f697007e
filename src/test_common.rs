use std::{
    collections::{HashMap, HashSet},
    fs::{self, File},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use tar::Archive;

use crate::{
    dataset::DatasetRef,
    listobs::{ListingError, ObservationLister},
    marlu::rubbl_casatables::{
        GlueDataType, Table, TableCreateMode, TableDesc, TableDescCreateMode,
    },
    metadata::{FreqUnit, MetadataError, MetadataService, SummaryRecord},
    ms::MsError,
};

/// Channel spacing of fake and synthetic spectral windows.
pub const CHAN_WIDTH_HZ: f64 = 1e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeStep {
    Summary,
    Nspw,
    Nchan,
    Chanfreqs,
    Observatory,
    Nantennas,
}

#[derive(Debug, Clone)]
pub struct FakeDataset {
    pub observatories: Vec<String>,
    /// `(num_chans, chan_freqs_hz)` per spectral window
    pub spws: Vec<(usize, Vec<f64>)>,
    pub fields: Vec<String>,
    pub num_rows: u64,
    pub num_antennas: usize,
    pub fail_at: Option<FakeStep>,
}

impl FakeDataset {
    pub fn new(observatory: &str, spws: &[(usize, f64)]) -> Self {
        Self {
            observatories: vec![observatory.to_string()],
            spws: spws
                .iter()
                .map(|&(num_chans, chan0_hz)| {
                    let freqs = (0..num_chans)
                        .map(|c| chan0_hz + c as f64 * CHAN_WIDTH_HZ)
                        .collect();
                    (num_chans, freqs)
                })
                .collect(),
            fields: vec!["3C286".to_string()],
            num_rows: 1000,
            num_antennas: 27,
            fail_at: None,
        }
    }

    pub fn failing_at(mut self, step: FakeStep) -> Self {
        self.fail_at = Some(step);
        self
    }
}

/// A [`MetadataService`] over in-memory datasets, counting opens and closes.
#[derive(Debug, Default)]
pub struct FakeMetadata {
    datasets: HashMap<PathBuf, FakeDataset>,
    current: Option<PathBuf>,
    pub opens: usize,
    pub closes: usize,
    pub opened: Vec<PathBuf>,
}

impl FakeMetadata {
    pub fn with<P: AsRef<Path>>(mut self, path: P, dataset: FakeDataset) -> Self {
        self.datasets.insert(path.as_ref().to_path_buf(), dataset);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.current.is_none()
    }

    fn dataset(&self, step: FakeStep) -> Result<&FakeDataset, MetadataError> {
        let path = self.current.as_ref().ok_or(MetadataError::NotOpen)?;
        let dataset = &self.datasets[path];
        if dataset.fail_at == Some(step) {
            return Err(MetadataError::Toolkit {
                path: path.clone(),
                source: MsError::TableOpen {
                    ms: path.clone(),
                    table: format!("{step:?}"),
                    message: "fake failure".to_string(),
                },
            });
        }
        Ok(dataset)
    }

    fn spw(&self, step: FakeStep, spw: usize) -> Result<&(usize, Vec<f64>), MetadataError> {
        let dataset = self.dataset(step)?;
        dataset.spws.get(spw).ok_or(MetadataError::SpwOutOfRange {
            spw,
            num_spws: dataset.spws.len(),
        })
    }
}

impl MetadataService for FakeMetadata {
    fn open(&mut self, path: &Path) -> Result<(), MetadataError> {
        self.opens += 1;
        self.opened.push(path.to_path_buf());
        self.current = None;
        if !self.datasets.contains_key(path) {
            return Err(MetadataError::NotAValidDataset {
                path: path.to_path_buf(),
                reason: "no such fake dataset".to_string(),
            });
        }
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
        self.current = None;
    }

    fn nspw(&mut self) -> Result<usize, MetadataError> {
        Ok(self.dataset(FakeStep::Nspw)?.spws.len())
    }

    fn nchan(&mut self, spw: usize) -> Result<usize, MetadataError> {
        Ok(self.spw(FakeStep::Nchan, spw)?.0)
    }

    fn chanfreqs(&mut self, spw: usize, unit: FreqUnit) -> Result<Vec<f64>, MetadataError> {
        let scale = unit.hz();
        Ok(self
            .spw(FakeStep::Chanfreqs, spw)?
            .1
            .iter()
            .map(|f| f / scale)
            .collect())
    }

    fn observatorynames(&mut self) -> Result<Vec<String>, MetadataError> {
        Ok(self.dataset(FakeStep::Observatory)?.observatories.clone())
    }

    fn nantennas(&mut self) -> Result<usize, MetadataError> {
        Ok(self.dataset(FakeStep::Nantennas)?.num_antennas)
    }

    fn summary(&mut self) -> Result<SummaryRecord, MetadataError> {
        let dataset = self.dataset(FakeStep::Summary)?;
        Ok(SummaryRecord {
            fields: dataset.fields.clone(),
            nrows: dataset.num_rows,
        })
    }
}

/// An [`ObservationLister`] which fails for the given base names and writes a
/// one-line listing for everything else.
#[derive(Debug, Default)]
pub struct FakeLister {
    failing: HashSet<String>,
    pub calls: Vec<PathBuf>,
}

impl FakeLister {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            calls: vec![],
        }
    }
}

impl ObservationLister for FakeLister {
    fn list_observation(&mut self, dataset: &Path, output: &Path) -> Result<(), ListingError> {
        self.calls.push(dataset.to_path_buf());
        if self.failing.contains(&DatasetRef::new(dataset).base_name()) {
            return Err(MsError::BadFile(dataset.to_path_buf()).into());
        }
        fs::write(output, format!("listing of {}\n", dataset.display())).map_err(|source| {
            ListingError::Write {
                path: output.to_path_buf(),
                source,
            }
        })
    }
}

/// The contents of a minimal measurement set.
#[derive(Debug, Clone)]
pub struct SyntheticMs {
    pub telescope: String,
    /// `(num_chans, chan0_hz)` per spectral window
    pub spws: Vec<(usize, f64)>,
    pub fields: Vec<String>,
    pub antennas: Vec<String>,
    pub num_rows: u64,
}

impl Default for SyntheticMs {
    fn default() -> Self {
        Self {
            telescope: "VLA".to_string(),
            spws: vec![(64, 1.4e9), (128, 1.5e9)],
            fields: vec!["3C286".to_string()],
            antennas: vec!["ea01".to_string(), "ea02".to_string(), "ea03".to_string()],
            num_rows: 12,
        }
    }
}

fn new_table(
    path: &Path,
    name: &str,
    columns: &[(GlueDataType, &str, bool)],
    n_rows: u64,
) -> Table {
    let mut desc = TableDesc::new(name, TableDescCreateMode::TDM_SCRATCH).unwrap();
    for &(data_type, col_name, is_array) in columns {
        if is_array {
            desc.add_array_column(data_type, col_name, None, None, false, false)
                .unwrap();
        } else {
            desc.add_scalar_column(data_type, col_name, None, false, false)
                .unwrap();
        }
    }
    Table::new(path, desc, n_rows as usize, TableCreateMode::New).unwrap()
}

/// Write the main table and the subtables the readers need to `ms_path`.
pub fn write_synthetic_ms(ms_path: &Path, ms: &SyntheticMs) {
    // 2019-10-09 12:00:00 UTC in casacore seconds
    let t0 = 58765.5 * 86400.0;
    let mut main = new_table(
        ms_path,
        "MAIN",
        &[(GlueDataType::TpDouble, "TIME", false)],
        ms.num_rows,
    );
    for row in 0..ms.num_rows {
        main.put_cell("TIME", row, &(t0 + row as f64 * 2.0)).unwrap();
    }

    let mut spw_table = new_table(
        &ms_path.join("SPECTRAL_WINDOW"),
        "SPECTRAL_WINDOW",
        &[
            (GlueDataType::TpInt, "NUM_CHAN", false),
            (GlueDataType::TpDouble, "CHAN_FREQ", true),
            (GlueDataType::TpDouble, "CHAN_WIDTH", true),
            (GlueDataType::TpString, "NAME", false),
            (GlueDataType::TpDouble, "TOTAL_BANDWIDTH", false),
            (GlueDataType::TpDouble, "REF_FREQUENCY", false),
        ],
        ms.spws.len() as u64,
    );
    for (spw_idx, &(num_chans, chan0_hz)) in ms.spws.iter().enumerate() {
        let row = spw_idx as u64;
        let freqs: Vec<f64> = (0..num_chans)
            .map(|c| chan0_hz + c as f64 * CHAN_WIDTH_HZ)
            .collect();
        spw_table
            .put_cell("NUM_CHAN", row, &(num_chans as i32))
            .unwrap();
        spw_table.put_cell("CHAN_FREQ", row, &freqs).unwrap();
        spw_table
            .put_cell("CHAN_WIDTH", row, &vec![CHAN_WIDTH_HZ; num_chans])
            .unwrap();
        spw_table
            .put_cell("NAME", row, &format!("SPW{spw_idx}"))
            .unwrap();
        spw_table
            .put_cell("TOTAL_BANDWIDTH", row, &(num_chans as f64 * CHAN_WIDTH_HZ))
            .unwrap();
        spw_table.put_cell("REF_FREQUENCY", row, &chan0_hz).unwrap();
    }

    let mut obs_table = new_table(
        &ms_path.join("OBSERVATION"),
        "OBSERVATION",
        &[
            (GlueDataType::TpString, "TELESCOPE_NAME", false),
            (GlueDataType::TpString, "OBSERVER", false),
            (GlueDataType::TpString, "PROJECT", false),
        ],
        1,
    );
    obs_table
        .put_cell("TELESCOPE_NAME", 0, &ms.telescope)
        .unwrap();
    obs_table
        .put_cell("OBSERVER", 0, &"casa".to_string())
        .unwrap();
    obs_table
        .put_cell("PROJECT", 0, &"synthetic".to_string())
        .unwrap();

    let mut field_table = new_table(
        &ms_path.join("FIELD"),
        "FIELD",
        &[
            (GlueDataType::TpString, "NAME", false),
            (GlueDataType::TpString, "CODE", false),
            (GlueDataType::TpDouble, "PHASE_DIR", true),
        ],
        ms.fields.len() as u64,
    );
    for (field_idx, name) in ms.fields.iter().enumerate() {
        let row = field_idx as u64;
        field_table.put_cell("NAME", row, name).unwrap();
        field_table.put_cell("CODE", row, &"T".to_string()).unwrap();
        field_table
            .put_cell("PHASE_DIR", row, &vec![3.539_257_5, 0.532_504_6])
            .unwrap();
    }

    let mut ant_table = new_table(
        &ms_path.join("ANTENNA"),
        "ANTENNA",
        &[
            (GlueDataType::TpString, "NAME", false),
            (GlueDataType::TpString, "STATION", false),
            (GlueDataType::TpDouble, "DISH_DIAMETER", false),
        ],
        ms.antennas.len() as u64,
    );
    for (ant_idx, name) in ms.antennas.iter().enumerate() {
        let row = ant_idx as u64;
        ant_table.put_cell("NAME", row, name).unwrap();
        ant_table
            .put_cell("STATION", row, &format!("N{:02}", ant_idx + 1))
            .unwrap();
        ant_table.put_cell("DISH_DIAMETER", row, &25.0).unwrap();
    }
}

/// Paths of the regular files in a `.tgz` archive.
pub fn archive_entries(archive_path: &Path) -> Vec<String> {
    let mut archive = Archive::new(GzDecoder::new(File::open(archive_path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.header().entry_type().is_file())
        .map(|entry| entry.path().unwrap().to_string_lossy().into_owned())
        .collect()
}
