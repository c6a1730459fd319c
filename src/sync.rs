use std::path::Path;

use tracing::{info, instrument};

use crate::config::ReconcileConfig;
use crate::error::Result;
use crate::io::{table_read, table_write};
use crate::model::{ReconciliationResult, Table};
use crate::reconcile::Reconciler;

/// Loads both input files using the header names in `config.read`.
pub fn load_inputs(
    markup: &Path,
    descriptions: &Path,
    config: &ReconcileConfig,
) -> Result<(Table, Table)> {
    let read = &config.read;
    let markup_table =
        table_read::read_table(markup, &read.markup_headers, read.header_scan_depth)?;
    info!(rows = markup_table.rows.len(), "markup file read");
    let description_table = table_read::read_table(
        descriptions,
        &read.description_headers,
        read.header_scan_depth,
    )?;
    info!(rows = description_table.rows.len(), "description file read");
    Ok((markup_table, description_table))
}

/// Reconciles a markup file against a description file and writes the
/// comparison table to `output`.
#[instrument(
    level = "info",
    skip_all,
    fields(
        markup = %markup.display(),
        descriptions = %descriptions.display(),
        output = %output.display()
    )
)]
pub fn reconcile_files(
    reconciler: &Reconciler,
    markup: &Path,
    descriptions: &Path,
    output: &Path,
) -> Result<ReconciliationResult> {
    let (markup_table, description_table) =
        load_inputs(markup, descriptions, reconciler.config())?;
    let result = reconciler.run(&markup_table, &description_table)?;
    table_write::write_table(output, &result.to_table())?;
    info!(
        processed = result.matched,
        errors = result.dropped(),
        "results saved"
    );
    Ok(result)
}
