//! File-preview collaborator. The core never parses raw file bytes; this
//! adapter turns a tabular file into a bounded sample of structured rows
//! that a caller can feed to individual `record_transaction` calls.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{LedgerError, Result};

/// At most this many rows are sampled, whatever the file size.
pub(crate) const PREVIEW_ROW_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub(crate) struct PreviewResult {
    pub rows_processed: usize,
    pub columns: Vec<String>,
    pub data: Vec<BTreeMap<String, String>>,
}

pub(crate) struct CsvPreview;

impl CsvPreview {
    /// Read the header and up to `PREVIEW_ROW_LIMIT` records. Malformed
    /// input is a validation error, reported with the underlying parse
    /// detail so the caller can correct the file.
    pub(crate) fn preview(path: &Path) -> Result<PreviewResult> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| LedgerError::validation(format!("could not read file: {e}")))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| LedgerError::validation(format!("could not read header row: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut data = Vec::new();
        for record in reader.records().take(PREVIEW_ROW_LIMIT) {
            let record =
                record.map_err(|e| LedgerError::validation(format!("malformed row: {e}")))?;
            let row: BTreeMap<String, String> = columns
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            data.push(row);
        }

        Ok(PreviewResult {
            rows_processed: data.len(),
            columns,
            data,
        })
    }
}

#[cfg(test)]
mod tests;
