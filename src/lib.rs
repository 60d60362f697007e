#![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::missing_errors_doc)]

//! msinventory takes stock of the CASA measurement sets in a test data tree.
//!
//! For each top-level subdirectory of the tree it writes an observation
//! listing per dataset, a summary table of dataset metadata as HTML, and a
//! `.tgz` archive holding both.
//!
//! # Examples
//!
//! ```rust,no_run
//! use msinventory::{ExclusionSet, InventoryContextBuilder};
//!
//! let mut exclusions = ExclusionSet::casatestdata();
//! exclusions.extend(["broken.ms"]);
//!
//! let inventory_ctx = InventoryContextBuilder::default()
//!     .root("/home/casa/data/casatestdata/measurementset/".into())
//!     .out_dir("/tmp/inventory".into())
//!     .exclusions(exclusions)
//!     .subdir_names(Some(vec!["vla".to_string()]))
//!     .build()
//!     .unwrap();
//!
//! for report in inventory_ctx.run().unwrap() {
//!     println!("{}", report.html.display());
//! }
//! ```
//!
//! # Details
//!
//! Measurement sets are read directly from their casacore tables with
//! [`rubbl_casatables`](marlu::rubbl_casatables), through the
//! [`MetadataService`] and [`ObservationLister`] traits. Alternative readers
//! can be plugged in with [`InventoryContext::run_with`].

pub mod aggregate;
pub mod dataset;
pub mod enumerate;
pub mod error;
pub mod inventory;
pub mod listobs;
pub mod metadata;
pub mod ms;
pub mod report;

#[cfg(feature = "cli")]
pub mod cli;

pub use aggregate::{aggregate, AggregationRow, AggregationTable};
pub use dataset::{DatasetRef, DatasetSummary, ExclusionSet, DEFAULT_EXCLUDED_DATASETS};
pub use error::InventoryError;
pub use inventory::{InventoryContext, InventoryContextBuilder};
pub use listobs::{list_observations, CasaTablesLister, ListingOutcome, ObservationLister};
pub use metadata::{extract, CasaTablesMetadata, MetadataError, MetadataService};
pub use report::{build_report, ReportPaths};

pub use marlu;

#[cfg(test)]
pub(crate) mod test_common;
