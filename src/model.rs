use serde::{Deserialize, Serialize};

use crate::error::RowError;

/// Identifier shared by both datasets. Compared by exact string equality.
pub type ProductId = String;

/// Column holding the product identifier in the markup dataset.
pub const MARKUP_ID_COLUMN: usize = 0;
/// Column holding the markup content in the markup dataset.
pub const MARKUP_CONTENT_COLUMN: usize = 1;
/// Column holding the product identifier in the description dataset.
pub const DESCRIPTION_ID_COLUMN: usize = 1;
/// Column holding the plain-text description in the description dataset.
pub const DESCRIPTION_TEXT_COLUMN: usize = 3;

/// Minimum column count accepted for the markup dataset.
pub const MARKUP_MIN_COLUMNS: usize = 2;
/// Minimum column count accepted for the description dataset.
pub const DESCRIPTION_MIN_COLUMNS: usize = 4;

pub const PRODUCT_NUMBER_HEADER: &str = "Product Number";
pub const NATURAL_LANGUAGE_HEADER: &str = "Natural Language Output";
pub const PRODUCT_DESCRIPTION_HEADER: &str = "Product Description";
pub const DIFFERENCES_HEADER: &str = "Differences";
pub const MARKUP_PRICES_HEADER: &str = "LAZADA PRICES";
pub const DESCRIPTION_PRICES_HEADER: &str = "SHOPEE PRICES";

/// A loaded tabular dataset with its header row already located.
///
/// Rows may be ragged; the column count of the dataset is the width of the
/// header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Number of columns declared by the header row.
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// One row from the markup-bearing source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub product_id: ProductId,
    pub markup_content: String,
}

impl RawRecord {
    /// Resolves the fixed column positions of a markup row.
    pub fn from_row(index: usize, row: &[String]) -> std::result::Result<Self, RowError> {
        let field = |column: usize| {
            row.get(column)
                .cloned()
                .ok_or(RowError::MissingField { row: index, column })
        };
        Ok(Self {
            product_id: field(MARKUP_ID_COLUMN)?,
            markup_content: field(MARKUP_CONTENT_COLUMN)?,
        })
    }
}

/// One row from the plain-text description source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionRecord {
    pub product_id: ProductId,
    pub description: String,
}

impl DescriptionRecord {
    /// Resolves the fixed column positions of a description row. Rows without
    /// an identifier cell yield `None`; a missing description cell reads as
    /// empty text.
    pub fn from_row(row: &[String]) -> Option<Self> {
        let product_id = row.get(DESCRIPTION_ID_COLUMN)?.clone();
        let description = row
            .get(DESCRIPTION_TEXT_COLUMN)
            .cloned()
            .unwrap_or_default();
        Some(Self {
            product_id,
            description,
        })
    }
}

/// The unit of output: one product present in both datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub product_id: ProductId,
    pub normalized_text: String,
    pub description: String,
    pub prices_from_markup: String,
    pub prices_from_description: String,
    pub diff: Option<String>,
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Matched rows in the order of the markup dataset.
    pub pairs: Vec<MatchedPair>,
    /// Markup rows that were processed (all rows unless cancelled).
    pub attempted: usize,
    /// Rows that produced a pair.
    pub matched: usize,
    /// Rows whose identifier had no counterpart in the description dataset.
    pub unmatched: usize,
    /// Rows that failed while being processed.
    pub failed: usize,
    /// Whether the run stopped early at a batch boundary.
    pub cancelled: bool,
    /// Whether pairs carry a word-level diff column.
    pub include_diff: bool,
}

impl ReconciliationResult {
    /// Rows that did not make it into the output.
    pub fn dropped(&self) -> usize {
        self.unmatched + self.failed
    }

    /// Lays the pairs out in the fixed output column order.
    pub fn to_table(&self) -> OutputTable {
        let mut columns = vec![
            PRODUCT_NUMBER_HEADER.to_string(),
            NATURAL_LANGUAGE_HEADER.to_string(),
            PRODUCT_DESCRIPTION_HEADER.to_string(),
        ];
        if self.include_diff {
            columns.push(DIFFERENCES_HEADER.to_string());
        }
        columns.push(MARKUP_PRICES_HEADER.to_string());
        columns.push(DESCRIPTION_PRICES_HEADER.to_string());

        let rows = self
            .pairs
            .iter()
            .map(|pair| {
                let mut cells = Vec::with_capacity(columns.len());
                cells.push(pair.product_id.clone());
                cells.push(pair.normalized_text.clone());
                cells.push(pair.description.clone());
                if self.include_diff {
                    cells.push(pair.diff.clone().unwrap_or_default());
                }
                cells.push(pair.prices_from_markup.clone());
                cells.push(pair.prices_from_description.clone());
                cells
            })
            .collect();

        OutputTable {
            sheet_name: OUTPUT_SHEET.to_string(),
            columns,
            rows,
        }
    }
}

/// Sheet name used when the comparison table is written to a workbook.
pub const OUTPUT_SHEET: &str = "Comparison";

/// A table that will be materialised as the comparison file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
