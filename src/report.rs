//! Render an [`AggregationTable`] to HTML and archive it with the listings.

use std::{
    fmt::Write as _,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use flate2::{write::GzEncoder, Compression};
use itertools::Itertools;
use log::{debug, info};
use thiserror::Error;

use crate::{
    aggregate::{aggregate, AggregationTable},
    dataset::DatasetRef,
    metadata::MetadataService,
};

/// Column headings of the summary table, after the row index.
pub const COLUMNS: [&str; 7] = [
    "msname",
    "nrows",
    "nspw",
    "nchan",
    "chan0 (GHz)",
    "fields",
    "nant",
];

/// Errors when writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// An old report or archive couldn't be removed.
    #[error("Couldn't remove existing {path}: {source}")]
    Remove {
        /// The file being removed
        path: PathBuf,
        /// The underlying io error
        source: std::io::Error,
    },

    /// The HTML file couldn't be written.
    #[error("Couldn't write {path}: {source}")]
    Write {
        /// The HTML file
        path: PathBuf,
        /// The underlying io error
        source: std::io::Error,
    },

    /// The archive couldn't be created or filled.
    #[error("Couldn't create archive {path}: {source}")]
    Archive {
        /// The archive file
        path: PathBuf,
        /// The underlying io error
        source: std::io::Error,
    },

    /// Rendering failed.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

/// Name of the listing directory for a top-level subdirectory.
pub fn listobs_dirname(subdir_name: &str) -> String {
    format!("{subdir_name}_listobs")
}

/// Name of the HTML report for a top-level subdirectory.
pub fn html_filename(subdir_name: &str) -> String {
    format!("testmsdata_list_{subdir_name}.html")
}

/// Where the artifacts for one top-level subdirectory go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// `<out>/<S>_listobs`
    pub listobs_dir: PathBuf,
    /// `<out>/testmsdata_list_<S>.html`
    pub html: PathBuf,
    /// `<out>/testmsdata_list_<S>.html.tgz`
    pub archive: PathBuf,
}

impl ReportPaths {
    /// The artifact paths for `subdir_name` under `out_dir`.
    pub fn new(out_dir: &Path, subdir_name: &str) -> Self {
        let html_name = html_filename(subdir_name);
        Self {
            listobs_dir: out_dir.join(listobs_dirname(subdir_name)),
            archive: out_dir.join(format!("{html_name}.tgz")),
            html: out_dir.join(html_name),
        }
    }
}

/// Format a float the way Python's `repr` does.
fn py_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{value:e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => sci,
        };
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Quote a string the way Python's `repr` does.
fn py_str(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\");
    if value.contains('\'') && !value.contains('"') {
        format!("\"{escaped}\"")
    } else {
        format!("'{}'", escaped.replace('\'', "\\'"))
    }
}

/// Render a sequence in Python list notation.
fn py_list<I: IntoIterator<Item = String>>(items: I) -> String {
    format!("[{}]", items.into_iter().join(", "))
}

/// Sequences in table cells are cut to this many items, as pandas does with
/// `display.max_seq_items`.
pub const MAX_SEQ_ITEMS: usize = 100;

/// Render a sequence the way pandas prints a list inside a table cell: items
/// unquoted, and `, ...` after the first [`MAX_SEQ_ITEMS`].
fn cell_list<I: IntoIterator<Item = String>>(items: I) -> String {
    let mut items = items.into_iter();
    let mut body = items.by_ref().take(MAX_SEQ_ITEMS).join(", ");
    if items.next().is_some() {
        body.push_str(", ...");
    }
    format!("[{body}]")
}

/// The link to a dataset's listing, relative to the HTML file.
///
/// The anchor is well-formed: `target` and `href` are separated by a space,
/// not the `target="_blank", href=...` that earlier reports carried.
pub fn listobs_link(subdir_name: &str, name: &str) -> String {
    format!(
        r#"<a target="_blank" href="{}/{name}.listobs.txt">{name}</a>"#,
        listobs_dirname(subdir_name)
    )
}

/// Render the table in the layout of a pandas `DataFrame.to_html`. Values
/// are not escaped.
///
/// # Errors
///
/// Propagates formatting errors.
pub fn render_html_table(
    subdir_name: &str,
    table: &AggregationTable,
) -> Result<String, std::fmt::Error> {
    let mut html = String::new();
    writeln!(html, r#"<table border="1" class="dataframe">"#)?;
    writeln!(html, "  <thead>")?;
    writeln!(html, r#"    <tr style="text-align: right;">"#)?;
    writeln!(html, "      <th></th>")?;
    for column in COLUMNS {
        writeln!(html, "      <th>{column}</th>")?;
    }
    writeln!(html, "    </tr>")?;
    writeln!(html, "  </thead>")?;
    writeln!(html, "  <tbody>")?;
    for (row_idx, row) in table.rows().iter().enumerate() {
        let summary = &row.summary;
        let cells = [
            listobs_link(subdir_name, &row.name),
            summary.num_rows.to_string(),
            summary.num_spws.to_string(),
            cell_list(summary.num_chans.iter().map(ToString::to_string)),
            cell_list(summary.first_chan_freqs_ghz.iter().copied().map(py_float)),
            cell_list(summary.field_names.iter().cloned()),
            summary.num_antennas.to_string(),
        ];
        writeln!(html, "    <tr>")?;
        writeln!(html, "      <th>{row_idx}</th>")?;
        for cell in cells {
            writeln!(html, "      <td>{cell}</td>")?;
        }
        writeln!(html, "    </tr>")?;
    }
    writeln!(html, "  </tbody>")?;
    write!(html, "</table>")?;
    Ok(html)
}

/// The full HTML document: a header naming the subdirectory, the table, and
/// the excluded paths.
///
/// # Errors
///
/// Propagates formatting errors.
pub fn render_report(
    subdir_name: &str,
    table: &AggregationTable,
    excluded: &[DatasetRef],
) -> Result<String, std::fmt::Error> {
    Ok(format!(
        "ms data in /{subdir_name}{}Excluded:{}",
        render_html_table(subdir_name, table)?,
        py_list(excluded.iter().map(|d| py_str(&d.to_string())))
    ))
}

fn remove_existing(path: &Path) -> Result<(), ReportError> {
    if path.exists() {
        debug!("removing existing {}", path.display());
        fs::remove_file(path).map_err(|source| ReportError::Remove {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn write_archive(paths: &ReportPaths) -> Result<(), std::io::Error> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&paths.archive)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    if let Some(html_name) = paths.html.file_name() {
        builder.append_path_with_name(&paths.html, html_name)?;
    }
    if let Some(listobs_name) = paths.listobs_dir.file_name() {
        builder.append_dir_all(listobs_name, &paths.listobs_dir)?;
    }
    let encoder: GzEncoder<File> = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}

/// Replace the HTML file and archive in `paths` with `html`.
///
/// # Errors
///
/// Can throw [`ReportError`] if an old file can't be removed or a new one
/// can't be written. Nothing is cleaned up on failure.
pub fn write_report(paths: &ReportPaths, html: &str) -> Result<(), ReportError> {
    remove_existing(&paths.archive)?;
    remove_existing(&paths.html)?;

    info!("Write to a html file and create a tar file");
    fs::write(&paths.html, html).map_err(|source| ReportError::Write {
        path: paths.html.clone(),
        source,
    })?;
    write_archive(paths).map_err(|source| ReportError::Archive {
        path: paths.archive.clone(),
        source,
    })?;
    info!("tar file {} created", paths.archive.display());
    Ok(())
}

/// Summarise `valid`, then write and archive the report for `subdir_name`.
///
/// The listings are expected in [`ReportPaths::listobs_dir`] already.
///
/// # Errors
///
/// see [`write_report`]
pub fn build_report<M: MetadataService + ?Sized>(
    service: &mut M,
    subdir_name: &str,
    out_dir: &Path,
    valid: &[DatasetRef],
    excluded: &[DatasetRef],
) -> Result<ReportPaths, ReportError> {
    let table = aggregate(service, valid);
    debug!("{} of {} listed datasets summarised", table.len(), valid.len());
    let html = render_report(subdir_name, &table, excluded)?;
    let paths = ReportPaths::new(out_dir, subdir_name);
    write_report(&paths, &html)?;
    Ok(paths)
}
