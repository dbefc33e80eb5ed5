//! CSV ingestion pipeline.
//!
//! Streams data rows through the field mapper one at a time, so a large
//! export never has to exist as parsed objects before reporting begins.
//! Row-level failures are recorded and skipped; only a structural failure
//! reading the header short-circuits the whole file.

use csv::ReaderBuilder;
use serde::Serialize;

use crate::mapper::{map_row, HeaderIndex};
use crate::record::CallRecord;

#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub success: bool,
    pub calls: Vec<CallRecord>,
    pub errors: Vec<RowError>,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
}

impl ParseReport {
    fn structural_failure(message: String) -> Self {
        Self {
            success: false,
            calls: Vec::new(),
            errors: vec![RowError { row: 0, message }],
            total_rows: 0,
            valid_rows: 0,
            invalid_rows: 0,
        }
    }
}

/// Parse a full CSV export.
///
/// Partial success is a valid terminal state: `success` is true when there
/// were no errors OR at least one valid record came out.
pub fn parse_csv(text: &str) -> ParseReport {
    // The vendor export pads rows unevenly; flexible record lengths keep a
    // short row from becoming a hard error.
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => return ParseReport::structural_failure(e.to_string()),
    };
    let index = HeaderIndex::new(&headers);

    let mut calls: Vec<CallRecord> = Vec::new();
    let mut errors: Vec<RowError> = Vec::new();
    let mut row_number = 0usize;

    for result in reader.records() {
        row_number += 1;
        match result {
            Ok(record) => match map_row(&index, &record) {
                Some(call) => calls.push(call),
                None => errors.push(RowError {
                    row: row_number,
                    message: "Missing required field: CallId".into(),
                }),
            },
            Err(e) => errors.push(RowError {
                row: row_number,
                message: e.to_string(),
            }),
        }
    }

    let success = errors.is_empty() || !calls.is_empty();
    let valid_rows = calls.len();
    let invalid_rows = errors.len();

    ParseReport {
        success,
        calls,
        errors,
        total_rows: row_number,
        valid_rows,
        invalid_rows,
    }
}
