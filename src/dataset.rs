//! Dataset references, summaries and the exclusion set.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use itertools::Itertools;

/// Dataset names in the casatestdata tree which crash the casacore readers
/// outright instead of raising an error.
pub const DEFAULT_EXCLUDED_DATASETS: [&str; 5] = [
    "uid___A002_X8ca70c_X5_shortened.ms",
    "expected.bl.ms",
    "expected.ms",
    "expected.sdsmooth.ms",
    "crosspoltest.ms",
];

/// The final component of `path`, or the whole path if it has none.
pub fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

/// A path to one candidate measurement set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetRef {
    path: PathBuf,
}

impl DatasetRef {
    /// Wrap a candidate path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The full path to the candidate.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final path component, e.g. `good1.ms`. This is the key used in
    /// tables, listing file names and the exclusion set.
    pub fn base_name(&self) -> String {
        entry_name(&self.path)
    }
}

impl Display for DatasetRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Metadata for a measurement set which was read successfully.
///
/// `num_chans` and `first_chan_freqs_ghz` always have `num_spws` elements;
/// [`crate::metadata::extract`] is the only producer and fills them per
/// spectral window.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    /// The first entry of the observatory (telescope) names
    pub observatory: String,
    /// Number of rows in the main table
    pub num_rows: u64,
    /// Number of spectral windows
    pub num_spws: usize,
    /// Number of channels in each spectral window
    pub num_chans: Vec<usize>,
    /// Frequency of the first channel in each spectral window \[GHz\]
    pub first_chan_freqs_ghz: Vec<f64>,
    /// Names of all fields
    pub field_names: Vec<String>,
    /// Number of antennas
    pub num_antennas: usize,
}

/// Dataset base names which are never listed or read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// An exclusion set containing [`DEFAULT_EXCLUDED_DATASETS`].
    pub fn casatestdata() -> Self {
        Self::from_names(DEFAULT_EXCLUDED_DATASETS)
    }

    /// Build an exclusion set from base names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Add more base names.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    /// Exact match against the dataset's base name.
    pub fn contains(&self, dataset: &DatasetRef) -> bool {
        self.names.contains(&dataset.base_name())
    }

    /// The excluded names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of excluded names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Display for ExclusionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.names.iter().join(", "))
    }
}
