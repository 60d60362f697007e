//! Collect summaries for a batch of datasets.

use log::{trace, warn};

use crate::{
    dataset::{DatasetRef, DatasetSummary},
    metadata::{extract, MetadataService},
};

/// One successfully summarised dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRow {
    /// The dataset's base name
    pub name: String,
    /// Its metadata
    pub summary: DatasetSummary,
}

/// Summaries in the order they were read. Nothing is deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationTable {
    rows: Vec<AggregationRow>,
}

impl AggregationTable {
    /// Append a row.
    pub fn push(&mut self, name: String, summary: DatasetSummary) {
        self.rows.push(AggregationRow { name, summary });
    }

    /// The rows, in insertion order.
    pub fn rows(&self) -> &[AggregationRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Extract a summary from each dataset in turn.
///
/// Failed extractions are logged and dropped. So are summaries with an empty
/// observatory name, which are treated the same as a failed read.
pub fn aggregate<M: MetadataService + ?Sized>(
    service: &mut M,
    datasets: &[DatasetRef],
) -> AggregationTable {
    let mut table = AggregationTable::default();
    for dataset in datasets {
        match extract(service, dataset.path()) {
            Ok(summary) if summary.observatory.is_empty() => {
                warn!("{} has no observatory name. Skip this file", dataset);
            }
            Ok(summary) => {
                trace!("{}: {:?}", dataset, summary);
                table.push(dataset.base_name(), summary);
            }
            Err(e) => {
                warn!("{} is not MS. Skip this file ({})", dataset, e);
            }
        }
    }
    table
}
