use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};
use tracing::{debug, info, warn};

use crate::error::{Result, ToolError};
use crate::io::extension_of;
use crate::model::Table;

/// Reads the first worksheet of a spreadsheet, or a delimited text file, into
/// a [`Table`].
///
/// The header row is the first non-blank row, at index `scan_depth + 1` or
/// earlier, that contains every name in `required_headers`. When no
/// such row exists the first row is used. Rows below the header become the
/// data rows; fully blank rows are skipped.
pub fn read_table(path: &Path, required_headers: &[String], scan_depth: usize) -> Result<Table> {
    let rows: Vec<Vec<String>> = read_rows(path)?
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    let header_index = if required_headers.is_empty() {
        0
    } else {
        find_header_row(&rows, required_headers, scan_depth).unwrap_or_else(|| {
            warn!(
                path = %path.display(),
                "header row not found, defaulting to first row"
            );
            0
        })
    };

    let mut rows = rows.into_iter().skip(header_index);
    let mut columns = rows.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = rows.collect();

    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    if widest > columns.len() {
        columns.resize(widest, String::new());
    }

    info!(
        path = %path.display(),
        header_row = header_index,
        columns = columns.len(),
        rows = rows.len(),
        "table loaded"
    );
    Ok(Table::new(columns, rows))
}

/// Index of the first row that holds every required header as an exact cell
/// value. Rows are checked up to and including index `scan_depth + 1`.
pub fn find_header_row(
    rows: &[Vec<String>],
    required_headers: &[String],
    scan_depth: usize,
) -> Option<usize> {
    rows.iter()
        .take(scan_depth + 2)
        .position(|row| {
            required_headers
                .iter()
                .all(|required| row.contains(required))
        })
        .inspect(|index| debug!(header_row = *index, "detected header row"))
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    match extension_of(path).as_str() {
        "csv" => read_csv_rows(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_sheet_rows(path),
        other => Err(ToolError::UnsupportedFormat(other.to_string())),
    }
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_sheet_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::UnsupportedFormat("workbook has no worksheets".into()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect())
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
