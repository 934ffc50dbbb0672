//! Pure projections of a built [`StaticTable`]. None of them assign IDs.

pub mod interchange;
pub mod markdown;
pub mod source;

pub use interchange::{render_interchange, InterchangeDoc};
pub use markdown::render_markdown;
pub use source::render_source;

use crate::table::StaticTable;
use qh_core::{Artifact, OutputConfig, Result};

/// Renders every artifact in memory. Nothing touches the filesystem here,
/// so a failure leaves no partial output behind.
pub fn render_all(table: &StaticTable, output: &OutputConfig) -> Result<Vec<Artifact>> {
    Ok(vec![
        Artifact {
            path: output.source_path(),
            contents: render_source(table, output.source_lang),
        },
        Artifact {
            path: output.markdown_path(),
            contents: render_markdown(table),
        },
        Artifact {
            path: output.interchange_path(),
            contents: render_interchange(table)?,
        },
    ])
}
