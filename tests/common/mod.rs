use std::{
    fs::{create_dir_all, File},
    path::Path,
};

use flate2::read::GzDecoder;
use msinventory::marlu::rubbl_casatables::{
    GlueDataType, Table, TableCreateMode, TableDesc, TableDescCreateMode,
};
use tar::Archive;

fn new_table(
    path: &Path,
    name: &str,
    scalars: &[(GlueDataType, &str)],
    arrays: &[&str],
    n_rows: usize,
) -> Table {
    let mut desc = TableDesc::new(name, TableDescCreateMode::TDM_SCRATCH).unwrap();
    for &(data_type, col_name) in scalars {
        desc.add_scalar_column(data_type, col_name, None, false, false)
            .unwrap();
    }
    for &col_name in arrays {
        desc.add_array_column(GlueDataType::TpDouble, col_name, None, None, false, false)
            .unwrap();
    }
    Table::new(path, desc, n_rows, TableCreateMode::New).unwrap()
}

/// Write a measurement set with one observation, one field, three antennas
/// and a spectral window per `(num_chans, chan0_hz)`.
pub fn write_ms(ms_path: &Path, telescope: &str, spws: &[(usize, f64)]) {
    if let Some(parent) = ms_path.parent() {
        create_dir_all(parent).unwrap();
    }
    new_table(ms_path, "MAIN", &[(GlueDataType::TpDouble, "TIME")], &[], 4);

    let mut spw_table = new_table(
        &ms_path.join("SPECTRAL_WINDOW"),
        "SPECTRAL_WINDOW",
        &[(GlueDataType::TpInt, "NUM_CHAN")],
        &["CHAN_FREQ"],
        spws.len(),
    );
    for (row, &(num_chans, chan0_hz)) in spws.iter().enumerate() {
        let freqs: Vec<f64> = (0..num_chans).map(|c| chan0_hz + c as f64 * 1e6).collect();
        spw_table
            .put_cell("NUM_CHAN", row as u64, &(num_chans as i32))
            .unwrap();
        spw_table.put_cell("CHAN_FREQ", row as u64, &freqs).unwrap();
    }

    let mut obs_table = new_table(
        &ms_path.join("OBSERVATION"),
        "OBSERVATION",
        &[(GlueDataType::TpString, "TELESCOPE_NAME")],
        &[],
        1,
    );
    obs_table
        .put_cell("TELESCOPE_NAME", 0, &telescope.to_string())
        .unwrap();

    let mut field_table = new_table(
        &ms_path.join("FIELD"),
        "FIELD",
        &[(GlueDataType::TpString, "NAME")],
        &[],
        1,
    );
    field_table.put_cell("NAME", 0, &"3C286".to_string()).unwrap();

    let mut ant_table = new_table(
        &ms_path.join("ANTENNA"),
        "ANTENNA",
        &[(GlueDataType::TpString, "NAME")],
        &[],
        3,
    );
    for row in 0..3_u64 {
        ant_table
            .put_cell("NAME", row, &format!("ea{:02}", row + 1))
            .unwrap();
    }
}

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
