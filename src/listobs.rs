//! Observation listings: one human-readable text report per dataset.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};
use prettytable::{cell, format as prettyformat, row, Table as PrettyTable};
use thiserror::Error;

use crate::{
    dataset::{DatasetRef, ExclusionSet},
    marlu::rubbl_casatables::Table,
    ms::{casacore_utc_to_epoch, MsError, MsTables},
};

/// Errors when listing a single dataset
#[derive(Error, Debug)]
pub enum ListingError {
    /// The dataset's tables couldn't be read.
    #[error(transparent)]
    Ms(#[from] MsError),

    /// The report couldn't be written.
    #[error("Couldn't write listing {path}: {source}")]
    Write {
        /// The listing file
        path: PathBuf,
        /// The underlying io error
        source: std::io::Error,
    },

    /// Formatting the report failed.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

/// Something which can write an observation listing for a dataset.
pub trait ObservationLister {
    /// Write a text listing of `dataset` to `output`.
    ///
    /// # Errors
    ///
    /// Can throw [`ListingError`] if `dataset` can't be read or `output`
    /// can't be written.
    fn list_observation(&mut self, dataset: &Path, output: &Path) -> Result<(), ListingError>;
}

/// The result of listing every candidate of a subdirectory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOutcome {
    /// Candidates which were listed, in input order
    pub valid: Vec<DatasetRef>,
    /// Every other candidate, in input order, including exclusion set skips
    pub excluded: Vec<DatasetRef>,
}

/// The listing file name for a dataset, e.g. `good1.ms.listobs.txt`.
pub fn listobs_filename(dataset: &DatasetRef) -> String {
    format!("{}.listobs.txt", dataset.base_name())
}

/// Remove `dir` and everything in it, then create it empty.
///
/// # Errors
///
/// Propagates io errors from removing or creating the directory.
pub fn prepare_listobs_dir(dir: &Path) -> Result<(), std::io::Error> {
    if dir.exists() {
        debug!("removing existing listing directory {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    info!("Created listobs output directory, {}", dir.display());
    Ok(())
}

/// List every candidate not in `exclusions` into `listobs_dir`.
///
/// Failures are logged and the dataset is left out of
/// [`ListingOutcome::valid`]; nothing is retried.
pub fn list_observations<L: ObservationLister + ?Sized>(
    lister: &mut L,
    candidates: &[DatasetRef],
    exclusions: &ExclusionSet,
    listobs_dir: &Path,
    draw_progress: bool,
) -> ListingOutcome {
    let draw_target = if draw_progress {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    };
    let listing_progress =
        ProgressBar::with_draw_target(Some(candidates.len() as u64), draw_target);
    listing_progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg:16}: [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos:>4}/{len:4}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    listing_progress.set_message("listobs");

    let mut outcome = ListingOutcome::default();
    for dataset in candidates {
        listing_progress.inc(1);
        if exclusions.contains(dataset) {
            warn!("Skipping {}, as this causes segv", dataset.base_name());
            outcome.excluded.push(dataset.clone());
            continue;
        }
        let output = listobs_dir.join(listobs_filename(dataset));
        match lister.list_observation(dataset.path(), &output) {
            Ok(()) => {
                debug!("listed {} to {}", dataset, output.display());
                outcome.valid.push(dataset.clone());
            }
            Err(e) => {
                warn!("{} is not valid MS: {}", dataset, e);
                outcome.excluded.push(dataset.clone());
            }
        }
    }
    listing_progress.finish();
    outcome
}

/// Writes listings by reading the casacore tables of each measurement set.
#[derive(Debug, Default, Clone, Copy)]
pub struct CasaTablesLister;

impl ObservationLister for CasaTablesLister {
    fn list_observation(&mut self, dataset: &Path, output: &Path) -> Result<(), ListingError> {
        let report = listobs_report(dataset)?;
        fs::write(output, report).map_err(|source| ListingError::Write {
            path: output.to_path_buf(),
            source,
        })
    }
}

fn optional_string(table: &mut Table, column: &str, row: u64) -> String {
    table.get_cell::<String>(column, row).unwrap_or_default()
}

fn optional_f64(table: &mut Table, column: &str, row: u64) -> Option<f64> {
    table.get_cell::<f64>(column, row).ok()
}

fn fmt_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => String::new(),
    }
}

/// Build the text listing of the measurement set at `ms`.
///
/// # Errors
///
/// Can throw [`ListingError::Ms`] if a required table or column can't be read.
pub fn listobs_report(ms: &Path) -> Result<String, ListingError> {
    let mut tables = MsTables::open(ms)?;
    let mut out = String::new();
    let rule = "=".repeat(80);

    writeln!(out, "{rule}")?;
    writeln!(out, "           MeasurementSet Name:  {}", ms.display())?;
    writeln!(out, "{rule}")?;

    let telescopes: Vec<String> = tables
        .observation
        .get_col_as_vec("TELESCOPE_NAME")
        .map_err(MsError::from)?;
    for (obs_idx, telescope) in telescopes.iter().enumerate() {
        let observer = optional_string(&mut tables.observation, "OBSERVER", obs_idx as u64);
        let project = optional_string(&mut tables.observation, "PROJECT", obs_idx as u64);
        writeln!(
            out,
            "   Observer: {observer:<24} Project: {project}\nObservation: {telescope}"
        )?;
    }

    let num_rows = tables.main.n_rows();
    writeln!(out, "Data records: {num_rows}")?;
    if let Ok(times) = tables.main.get_col_as_vec::<f64>("TIME") {
        let (first, last) = times
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
                (lo.min(t), hi.max(t))
            });
        if first.is_finite() && last.is_finite() {
            writeln!(
                out,
                "   Observed from   {}   to   {}\n   Total elapsed time = {:.3} seconds",
                casacore_utc_to_epoch(first),
                casacore_utc_to_epoch(last),
                last - first
            )?;
        }
    }
    writeln!(out)?;

    let field_names: Vec<String> = tables
        .field
        .get_col_as_vec("NAME")
        .map_err(MsError::from)?;
    let mut field_table = PrettyTable::new();
    field_table.set_format(*prettyformat::consts::FORMAT_CLEAN);
    field_table.set_titles(row!["ID", "Code", "Name", "RA [deg]", "Decl [deg]"]);
    for (field_idx, name) in field_names.iter().enumerate() {
        let code = optional_string(&mut tables.field, "CODE", field_idx as u64);
        let phase_dir: Vec<f64> = tables
            .field
            .get_cell_as_vec("PHASE_DIR", field_idx as u64)
            .unwrap_or_default();
        let (ra, dec) = match phase_dir.as_slice() {
            [ra, dec, ..] => (Some(ra.to_degrees()), Some(dec.to_degrees())),
            _ => (None, None),
        };
        field_table.add_row(row![r =>
            field_idx,
            code,
            name,
            fmt_optional(ra, 6),
            fmt_optional(dec, 6)
        ]);
    }
    writeln!(out, "Fields: {}\n{}", field_names.len(), field_table)?;

    let num_spws = tables.spectral_window.n_rows();
    let mut spw_table = PrettyTable::new();
    spw_table.set_format(*prettyformat::consts::FORMAT_CLEAN);
    spw_table.set_titles(row![
        "SpwID",
        "Name",
        "#Chans",
        "Ch0 [MHz]",
        "ChanWid [kHz]",
        "TotBW [kHz]",
        "RefFreq [MHz]"
    ]);
    for spw_idx in 0..num_spws {
        let num_chans: i32 = tables
            .spectral_window
            .get_cell("NUM_CHAN", spw_idx)
            .map_err(MsError::from)?;
        let chan_freqs: Vec<f64> = tables
            .spectral_window
            .get_cell_as_vec("CHAN_FREQ", spw_idx)
            .map_err(MsError::from)?;
        let chan_widths: Vec<f64> = tables
            .spectral_window
            .get_cell_as_vec("CHAN_WIDTH", spw_idx)
            .unwrap_or_default();
        let name = optional_string(&mut tables.spectral_window, "NAME", spw_idx);
        let total_bw = optional_f64(&mut tables.spectral_window, "TOTAL_BANDWIDTH", spw_idx);
        let ref_freq = optional_f64(&mut tables.spectral_window, "REF_FREQUENCY", spw_idx);
        spw_table.add_row(row![r =>
            spw_idx,
            name,
            num_chans,
            fmt_optional(chan_freqs.first().map(|f| f / 1e6), 4),
            fmt_optional(chan_widths.first().map(|w| w / 1e3), 3),
            fmt_optional(total_bw.map(|bw| bw / 1e3), 1),
            fmt_optional(ref_freq.map(|f| f / 1e6), 4)
        ]);
    }
    writeln!(out, "Spectral Windows: {num_spws}\n{spw_table}")?;

    let antenna_names: Vec<String> = tables
        .antenna
        .get_col_as_vec("NAME")
        .map_err(MsError::from)?;
    let mut antenna_table = PrettyTable::new();
    antenna_table.set_format(*prettyformat::consts::FORMAT_CLEAN);
    antenna_table.set_titles(row!["ID", "Name", "Station", "Diam. [m]"]);
    for (ant_idx, name) in antenna_names.iter().enumerate() {
        let station = optional_string(&mut tables.antenna, "STATION", ant_idx as u64);
        let diameter = optional_f64(&mut tables.antenna, "DISH_DIAMETER", ant_idx as u64);
        antenna_table.add_row(row![r => ant_idx, name, station, fmt_optional(diameter, 1)]);
    }
    writeln!(out, "Antennas: {}\n{}", antenna_names.len(), antenna_table)?;

    Ok(out)
}
