#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::LedgerError;
use std::io::Write;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_preview_small_file() {
    let file = write_csv("date,description,amount\n2024-01-15,Groceries,-85.50\n");
    let result = CsvPreview::preview(file.path()).unwrap();
    assert_eq!(result.rows_processed, 1);
    assert_eq!(result.columns, ["date", "description", "amount"]);
    assert_eq!(result.data[0]["description"], "Groceries");
    assert_eq!(result.data[0]["amount"], "-85.50");
}

#[test]
fn test_preview_caps_at_ten_rows() {
    let mut contents = String::from("date,description,amount\n");
    for day in 1..=25 {
        contents.push_str(&format!("2024-01-{day:02},Row {day},-1.00\n"));
    }
    let file = write_csv(&contents);
    let result = CsvPreview::preview(file.path()).unwrap();
    assert_eq!(result.rows_processed, PREVIEW_ROW_LIMIT);
    assert_eq!(result.data.len(), PREVIEW_ROW_LIMIT);
}

#[test]
fn test_preview_header_only() {
    let file = write_csv("date,description,amount\n");
    let result = CsvPreview::preview(file.path()).unwrap();
    assert_eq!(result.rows_processed, 0);
    assert_eq!(result.columns.len(), 3);
    assert!(result.data.is_empty());
}

#[test]
fn test_preview_missing_file() {
    let err = CsvPreview::preview(std::path::Path::new("/no/such/file.csv")).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_preview_ragged_row_is_validation_error() {
    let file = write_csv("date,description,amount\n2024-01-15,too,many,fields,here\n");
    let err = CsvPreview::preview(file.path()).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[test]
fn test_preview_serializes_with_status_shape() {
    let file = write_csv("a,b\n1,2\n");
    let result = CsvPreview::preview(file.path()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["rows_processed"], 1);
    assert!(json["columns"].is_array());
    assert!(json["data"].is_array());
}
