use std::fs;

use price_audit::io::{table_read, table_write};
use price_audit::{ReconcileConfig, Reconciler, ToolError, sync};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

const MARKUP_CSV: &str = "\
Catalog export,,
Generated for audit,,
Product ID,Body HTML
P1,\"<p>Red Shirt <b>$10</b></p>\"
,
P2,<p>Blue Hat</p>
P4,\"<div>Socks<script>track()</script> ₱99.50</div>\"
";

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn write_description_workbook(path: &std::path::Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .write_string(0, 0, "Marketplace listing")
        .expect("title written");
    for (col, header) in ["SKU", "Product ID", "Title", "Product Description"]
        .iter()
        .enumerate()
    {
        worksheet
            .write_string(1, col as u16, *header)
            .expect("header written");
    }
    let rows = [
        ("S-1", "P1", "Shirt", "Red shirt, priced at 10 USD"),
        ("S-3", "P3", "Hat", "irrelevant"),
        ("S-4", "P4", "Socks", "Socks for PHP 99.50"),
    ];
    for (offset, (sku, id, title, description)) in rows.iter().enumerate() {
        let row = (offset + 2) as u32;
        worksheet.write_string(row, 0, *sku).expect("sku written");
        worksheet.write_string(row, 1, *id).expect("id written");
        worksheet.write_string(row, 2, *title).expect("title written");
        worksheet
            .write_string(row, 3, *description)
            .expect("description written");
    }
    workbook.save(path).expect("workbook saved");
}

#[test]
fn csv_header_row_is_detected_below_preamble() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("markup.csv");
    fs::write(&path, MARKUP_CSV).expect("fixture written");

    let table = table_read::read_table(&path, &headers(&["Product ID"]), 20).expect("table read");

    assert_eq!(table.columns, vec!["Product ID", "Body HTML"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0][0], "P1");
    assert_eq!(table.rows[0][1], "<p>Red Shirt <b>$10</b></p>");
    assert_eq!(table.rows[1][0], "P2");
}

#[test]
fn missing_header_falls_back_to_first_row() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("plain.csv");
    fs::write(&path, "id,html\nP1,<p>x</p>\n").expect("fixture written");

    let table =
        table_read::read_table(&path, &headers(&["Product ID"]), 20).expect("table read");

    assert_eq!(table.columns, vec!["id", "html"]);
    assert_eq!(table.rows, vec![vec!["P1".to_string(), "<p>x</p>".to_string()]]);
}

#[test]
fn header_search_is_limited_to_scan_depth() {
    let rows: Vec<Vec<String>> = (0..5)
        .map(|index| vec![format!("preamble {index}")])
        .chain(std::iter::once(headers(&["Product ID", "Body"])))
        .collect();

    assert_eq!(
        table_read::find_header_row(&rows, &headers(&["Product ID"]), 4),
        Some(5)
    );
    assert_eq!(
        table_read::find_header_row(&rows, &headers(&["Product ID"]), 3),
        None
    );
}

#[test]
fn default_scan_depth_reaches_row_twenty_one() {
    let preamble = |count: usize| -> Vec<Vec<String>> {
        (0..count)
            .map(|index| vec![format!("note {index}")])
            .chain(std::iter::once(headers(&["Product ID", "Body"])))
            .collect()
    };

    assert_eq!(
        table_read::find_header_row(&preamble(21), &headers(&["Product ID"]), 20),
        Some(21)
    );
    assert_eq!(
        table_read::find_header_row(&preamble(22), &headers(&["Product ID"]), 20),
        None
    );
}

#[test]
fn header_names_must_match_cells_exactly() {
    let rows = vec![
        headers(&[" Product ID", "Body"]),
        headers(&["Product ID", "Body"]),
    ];

    assert_eq!(
        table_read::find_header_row(&rows, &headers(&["Product ID"]), 20),
        Some(1)
    );
    assert_eq!(
        table_read::find_header_row(&rows[..1], &headers(&["Product ID"]), 20),
        None
    );
}

#[test]
fn csv_header_after_long_preamble_aligns_columns() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("markup.csv");
    let mut content: String = (0..21).map(|index| format!("preamble {index},\n")).collect();
    content.push_str("Product ID,Body HTML\nP1,<p>$5</p>\n");
    fs::write(&path, content).expect("fixture written");

    let table = table_read::read_table(&path, &headers(&["Product ID"]), 20).expect("table read");

    assert_eq!(table.columns, vec!["Product ID", "Body HTML"]);
    assert_eq!(table.rows, vec![headers(&["P1", "<p>$5</p>"])]);
}

#[test]
fn workbook_header_row_and_numeric_cells_are_read() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("descriptions.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Export").expect("title");
    worksheet.write_string(1, 0, "SKU").expect("header");
    worksheet.write_string(1, 1, "Product ID").expect("header");
    worksheet.write_string(1, 2, "Title").expect("header");
    worksheet
        .write_string(1, 3, "Product Description")
        .expect("header");
    worksheet.write_string(2, 0, "S-1").expect("cell");
    worksheet.write_number(2, 1, 1001.0).expect("cell");
    worksheet.write_string(2, 2, "Lamp").expect("cell");
    worksheet.write_string(2, 3, "Desk lamp $25").expect("cell");
    workbook.save(&path).expect("workbook saved");

    let table = table_read::read_table(
        &path,
        &headers(&["Product ID", "Product Description"]),
        20,
    )
    .expect("table read");

    assert_eq!(table.width(), 4);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][1], "1001");
    assert_eq!(table.rows[0][3], "Desk lamp $25");
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("data.txt");
    fs::write(&path, "Product ID\n").expect("fixture written");

    let error = table_read::read_table(&path, &headers(&["Product ID"]), 20)
        .expect_err("unsupported format");
    assert!(matches!(error, ToolError::UnsupportedFormat(ext) if ext == "txt"));
}

#[test]
fn files_reconcile_into_csv_comparison() {
    let temp_dir = tempdir().expect("temporary directory");
    let markup_path = temp_dir.path().join("markup.csv");
    let descriptions_path = temp_dir.path().join("descriptions.xlsx");
    let output_path = temp_dir.path().join("comparison_results.csv");
    fs::write(&markup_path, MARKUP_CSV).expect("markup written");
    write_description_workbook(&descriptions_path);

    let reconciler = Reconciler::new(ReconcileConfig::default()).expect("reconciler built");
    let result = sync::reconcile_files(&reconciler, &markup_path, &descriptions_path, &output_path)
        .expect("files reconciled");

    assert_eq!(result.matched, 2);
    assert_eq!(result.unmatched, 1);

    let mut reader = csv::Reader::from_path(&output_path).expect("output opened");
    let header: Vec<String> = reader
        .headers()
        .expect("output header")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(
        header,
        vec![
            "Product Number",
            "Natural Language Output",
            "Product Description",
            "Differences",
            "LAZADA PRICES",
            "SHOPEE PRICES",
        ]
    );

    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record
                .expect("output record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "P1");
    assert_eq!(rows[0][1], "Red Shirt $10");
    assert_eq!(rows[0][4], "$10");
    assert_eq!(rows[0][5], "10 USD");
    assert_eq!(rows[1][0], "P4");
    assert_eq!(rows[1][1], "Socks ₱99.50");
    assert_eq!(rows[1][4], "₱99.50");
    assert_eq!(rows[1][5], "PHP 99.50");
}

#[test]
fn comparison_workbook_reads_back() {
    let temp_dir = tempdir().expect("temporary directory");
    let output_path = temp_dir.path().join("comparison.xlsx");

    let markup = price_audit::Table::new(
        headers(&["Product ID", "Body HTML"]),
        vec![headers(&["P1", "<p>Kettle £30</p>"])],
    );
    let descriptions = price_audit::Table::new(
        headers(&["SKU", "Product ID", "Title", "Product Description"]),
        vec![headers(&["S-1", "P1", "Kettle", "Kettle 30 GBP"])],
    );
    let reconciler = Reconciler::new(ReconcileConfig {
        include_diff: false,
        ..ReconcileConfig::default()
    })
    .expect("reconciler built");
    let result = reconciler
        .run(&markup, &descriptions)
        .expect("run succeeded");
    table_write::write_table(&output_path, &result.to_table()).expect("workbook written");

    let table = table_read::read_table(&output_path, &headers(&["Product Number"]), 20)
        .expect("workbook read");
    assert_eq!(
        table.columns,
        vec![
            "Product Number",
            "Natural Language Output",
            "Product Description",
            "LAZADA PRICES",
            "SHOPEE PRICES",
        ]
    );
    assert_eq!(
        table.rows,
        vec![headers(&["P1", "Kettle £30", "Kettle 30 GBP", "£30", "30 GBP"])]
    );
}

#[test]
fn config_file_overrides_only_given_keys() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("config.json");
    let json = serde_json::json!({
        "batch_size": 10,
        "include_diff": false,
        "read": { "markup_headers": ["SKU"] }
    });
    fs::write(&path, serde_json::to_string_pretty(&json).expect("json encoded"))
        .expect("config written");

    let config = ReconcileConfig::from_json_file(&path).expect("config loaded");

    assert_eq!(config.batch_size, 10);
    assert!(!config.include_diff);
    assert_eq!(config.workers, 4);
    assert_eq!(config.cache_capacity, 1000);
    assert_eq!(config.read.markup_headers, vec!["SKU"]);
    assert_eq!(config.read.header_scan_depth, 20);
}

#[test]
fn config_file_with_zero_batch_size_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"batch_size": 0}"#).expect("config written");

    let error = ReconcileConfig::from_json_file(&path).expect_err("invalid config");
    assert!(matches!(error, ToolError::InvalidConfig(_)));
}
