//! Options for an inventory run, and the run itself.
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use derive_builder::Builder;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    dataset::{entry_name, ExclusionSet},
    enumerate::{list_candidates, list_subdirs},
    error::InventoryError,
    listobs::{list_observations, prepare_listobs_dir, CasaTablesLister, ObservationLister},
    metadata::{CasaTablesMetadata, MetadataService},
    report::{build_report, ReportPaths},
};

/// Where casatestdata keeps its measurement sets.
pub const DEFAULT_ROOT: &str = "/home/casa/data/casatestdata/measurementset/";

/// Options for inventorying a data tree
#[derive(Builder, Debug, Clone)]
pub struct InventoryContext {
    /// The root of the tree; its children are the top-level subdirectories
    #[builder(default = "PathBuf::from(DEFAULT_ROOT)")]
    pub root: PathBuf,
    /// Where listings, reports and archives are written
    #[builder(default = "PathBuf::from(\".\")")]
    pub out_dir: PathBuf,
    /// Dataset base names which are never listed or read
    #[builder(default = "ExclusionSet::casatestdata()")]
    pub exclusions: ExclusionSet,
    /// Only process top-level subdirectories with these names
    #[builder(default)]
    pub subdir_names: Option<Vec<String>>,
    /// Whether to draw progress bars
    #[builder(default = "true")]
    pub draw_progress: bool,
}

impl Display for InventoryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Data root:            {}", self.root.display())?;
        writeln!(f, "Output directory:     {}", self.out_dir.display())?;
        match &self.subdir_names {
            Some(names) => writeln!(f, "Subdirectories:       {}", names.iter().join(", "))?,
            None => writeln!(f, "Subdirectories:       all")?,
        }
        writeln!(
            f,
            "Excluded datasets ({}): {}",
            self.exclusions.len(),
            self.exclusions
        )?;
        writeln!(
            f,
            "{} draw progress bars.",
            if self.draw_progress {
                "Will"
            } else {
                "Will not"
            }
        )?;
        Ok(())
    }
}

impl InventoryContext {
    /// The top-level subdirectories to process, in order.
    ///
    /// # Errors
    ///
    /// Can throw [`InventoryError::Enumerate`] if the root can't be listed.
    pub fn selected_subdirs(&self) -> Result<Vec<PathBuf>, InventoryError> {
        let subdirs = list_subdirs(&self.root)?;
        let names = match &self.subdir_names {
            None => return Ok(subdirs),
            Some(names) => names,
        };
        for name in names {
            if !subdirs.iter().any(|s| entry_name(s) == *name) {
                warn!("no subdirectory {} in {}", name, self.root.display());
            }
        }
        Ok(subdirs
            .into_iter()
            .filter(|s| names.contains(&entry_name(s)))
            .collect())
    }

    /// List every dataset in `subdir`, then report on the listed ones.
    ///
    /// Returns `None` when nothing could be listed, in which case no report is
    /// written.
    ///
    /// # Errors
    ///
    /// Can throw [`InventoryError`] if the listing directory can't be
    /// prepared, `subdir` can't be enumerated, or the report can't be written.
    pub fn process_subdir<M, L>(
        &self,
        service: &mut M,
        lister: &mut L,
        subdir: &Path,
    ) -> Result<Option<ReportPaths>, InventoryError>
    where
        M: MetadataService + ?Sized,
        L: ObservationLister + ?Sized,
    {
        let subdir_name = entry_name(subdir);
        let paths = ReportPaths::new(&self.out_dir, &subdir_name);
        prepare_listobs_dir(&paths.listobs_dir).map_err(|source| InventoryError::ListobsDir {
            path: paths.listobs_dir.clone(),
            source,
        })?;

        info!("Run listobs for {}", subdir.display());
        let candidates = list_candidates(subdir)?;
        let outcome = list_observations(
            lister,
            &candidates,
            &self.exclusions,
            &paths.listobs_dir,
            self.draw_progress,
        );
        debug!(
            "{}: {} listed, {} excluded",
            subdir_name,
            outcome.valid.len(),
            outcome.excluded.len()
        );
        if outcome.valid.is_empty() {
            info!("no valid measurement sets in {}, no report written", subdir.display());
            return Ok(None);
        }

        let paths = build_report(
            service,
            &subdir_name,
            &self.out_dir,
            &outcome.valid,
            &outcome.excluded,
        )?;
        Ok(Some(paths))
    }

    /// Process every selected subdirectory with the given collaborators.
    ///
    /// # Errors
    ///
    /// Stops at the first [`InventoryError`].
    pub fn run_with<M, L>(
        &self,
        service: &mut M,
        lister: &mut L,
    ) -> Result<Vec<ReportPaths>, InventoryError>
    where
        M: MetadataService + ?Sized,
        L: ObservationLister + ?Sized,
    {
        let mut reports = vec![];
        for subdir in self.selected_subdirs()? {
            if let Some(paths) = self.process_subdir(service, lister, &subdir)? {
                reports.push(paths);
            }
        }
        Ok(reports)
    }

    /// Process every selected subdirectory, reading measurement sets with
    /// casacore.
    ///
    /// # Errors
    ///
    /// see [`InventoryContext::run_with`]
    pub fn run(&self) -> Result<Vec<ReportPaths>, InventoryError> {
        self.run_with(&mut CasaTablesMetadata::new(), &mut CasaTablesLister)
    }
}
