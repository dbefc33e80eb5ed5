//! Batched bulk persistence of parsed call records.
//!
//! One synchronous pass per uploaded file: resolve (or lazily provision)
//! the tenant, then upsert in fixed-size batches. A failed batch is
//! tallied and logged; the remaining batches still run.

use log::{info, warn};
use serde::Serialize;
use std::time::Instant;

use crate::config::UploadConfig;
use crate::error::{DashError, DashResult};
use crate::ingest::ParseReport;
use crate::record::CallRecord;
use crate::store::CallStore;

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub total_rows: usize,
    pub inserted: usize,
    /// Rows dropped by the duplicate-skip policy: total − inserted − errors.
    pub skipped: usize,
    pub errors: usize,
    pub rows_per_sec: f64,
}

/// The JSON summary the upload boundary returns to callers.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSummary {
    pub success: bool,
    pub message: String,
    pub total_rows: usize,
    pub rows_processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub parse_errors: usize,
}

/// Boundary validation: extension and size ceiling.
pub fn check_upload(file_name: &str, byte_len: u64, config: &UploadConfig) -> DashResult<()> {
    let expected = format!(".{}", config.allowed_extension);
    if !file_name.to_ascii_lowercase().ends_with(&expected) {
        return Err(DashError::InvalidUpload {
            reason: format!("file must be a {}", expected),
        });
    }
    if byte_len > config.max_file_bytes {
        return Err(DashError::InvalidUpload {
            reason: format!(
                "file is {byte_len} bytes; the limit is {} bytes",
                config.max_file_bytes
            ),
        });
    }
    Ok(())
}

/// Upsert parsed records for the tenant registered under `external_id`,
/// provisioning the tenant on first upload.
///
/// Duplicate call ids (against rows already stored for the tenant, or
/// repeated inside the upload) are skipped, never doubled. Each batch is
/// isolated: a batch-level failure counts its rows as errors and the run
/// continues.
pub fn ingest_records(
    store: &CallStore,
    external_id: &str,
    records: &[CallRecord],
    config: &UploadConfig,
) -> DashResult<UploadReport> {
    store.ping()?;
    let tenant = store.find_or_create_tenant(external_id)?;

    let total = records.len();
    let batch_size = config.batch_size.max(1);
    let batch_count = total.div_ceil(batch_size);
    info!(
        "uploading {total} calls for tenant {} in {batch_count} batch(es) of up to {batch_size}",
        tenant.id
    );

    let started = Instant::now();
    let mut inserted = 0usize;
    let mut errors = 0usize;

    for (i, batch) in records.chunks(batch_size).enumerate() {
        match store.insert_calls_batch(&tenant.id, batch) {
            Ok(n) => {
                inserted += n;
                info!(
                    "batch {}/{batch_count}: {n} new, {} duplicates skipped",
                    i + 1,
                    batch.len() - n
                );
            }
            Err(e) => {
                warn!("batch {}/{batch_count} failed: {e}", i + 1);
                errors += batch.len();
            }
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    let rows_per_sec = if elapsed > 0.0 {
        total as f64 / elapsed
    } else {
        0.0
    };
    let skipped = total - inserted - errors;
    info!(
        "upload complete: {inserted} inserted, {skipped} skipped, {errors} errors \
         ({rows_per_sec:.0} rows/sec)"
    );

    Ok(UploadReport {
        total_rows: total,
        inserted,
        skipped,
        errors,
        rows_per_sec,
    })
}

/// Combine a parse report and an upload report into the boundary summary.
pub fn summarize(parse: &ParseReport, upload: &UploadReport) -> UploadSummary {
    let mut message = format!(
        "Successfully processed {} calls: {} new, {} duplicates skipped",
        upload.total_rows, upload.inserted, upload.skipped
    );
    if upload.errors > 0 {
        message.push_str(&format!(", {} errors", upload.errors));
    }
    UploadSummary {
        success: true,
        message,
        total_rows: parse.total_rows,
        rows_processed: upload.inserted,
        skipped: upload.skipped,
        errors: upload.errors,
        parse_errors: parse.errors.len(),
    }
}
