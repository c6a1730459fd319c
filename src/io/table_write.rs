use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::{Result, ToolError};
use crate::io::extension_of;
use crate::model::OutputTable;

/// Writes the comparison table to `path`, choosing CSV or XLSX from the file
/// extension.
pub fn write_table(path: &Path, table: &OutputTable) -> Result<()> {
    match extension_of(path).as_str() {
        "csv" => write_csv(path, table),
        "xlsx" => write_workbook(path, table),
        other => Err(ToolError::UnsupportedFormat(other.to_string())),
    }
}

/// Writes the table as delimited text with a header line.
pub fn write_csv(path: &Path, table: &OutputTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the table as a single-sheet workbook with an autofilter table.
pub fn write_workbook(path: &Path, table: &OutputTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, header)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
        }
    }

    let mut excel_table = rust_xlsxwriter::Table::new();
    excel_table.set_autofilter(true);
    let col_end = (table.columns.len() as u16).saturating_sub(1);
    let row_end = table.rows.len() as u32;
    worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;

    workbook.save(path)?;
    Ok(())
}
