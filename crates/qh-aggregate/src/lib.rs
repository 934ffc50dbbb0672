pub mod capture;
pub mod merge;

pub use capture::{load_capture, load_captures, parse_capture};
pub use merge::{aggregate, HeaderAggregator};

use qh_core::{AggregateConfig, CurationSheet, Result};
use std::path::Path;

/// Loads every capture file and ranks the merged records.
/// Nothing is returned unless every file parsed cleanly.
pub fn aggregate_files<P: AsRef<Path>>(paths: &[P], config: &AggregateConfig) -> Result<CurationSheet> {
    let observations = load_captures(paths, &config.anonymized_marker)?;
    let mut aggregator = HeaderAggregator::new();
    aggregator.extend(&observations)?;
    tracing::debug!("Aggregated {} records", aggregator.observed());
    let sheet = aggregator.finish()?;

    let summary = sheet.summary.unwrap_or_default();
    for (label, bucket) in [
        ("Request Complete Pairs", summary.request_complete),
        ("Request Name Only", summary.request_names),
        ("Response Complete Pairs", summary.response_complete),
        ("Response Name Only", summary.response_names),
    ] {
        tracing::info!("{}: {} unique ({} total)", label, bucket.unique, bucket.total);
    }
    Ok(sheet)
}
