//! Full pipeline: CSV text → parse → bulk upsert → filtered fetch →
//! aggregates.

use calltrack_core::config::UploadConfig;
use calltrack_core::filter::{DashboardFilter, DateRange};
use calltrack_core::ingest::parse_csv;
use calltrack_core::marketing_metrics::marketing_metrics;
use calltrack_core::overview_metrics::overview_metrics;
use calltrack_core::store::CallStore;
use calltrack_core::upload::{ingest_records, summarize};
use chrono::NaiveDate;

const UPLOAD: &str = "\
CallId,Call Status,CSR Conversion,CSR Value,Date,DateTime
A1,answered,true,100,2025-01-15,2025-01-15T10:00:00
A2,answered,false,,2025-01-16,2025-01-16T11:30:00
,missed,false,,2025-01-16,2025-01-16T12:00:00
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn csv_to_dashboard_numbers() {
    let store = CallStore::in_memory().unwrap();
    store.migrate().unwrap();
    let config = UploadConfig::default();

    // Parse: three rows, one missing its identifier.
    let parse = parse_csv(UPLOAD);
    assert!(parse.success);
    assert_eq!(parse.total_rows, 3);
    assert_eq!(parse.valid_rows, 2);
    assert_eq!(parse.invalid_rows, 1);

    // Persist for a lazily provisioned tenant.
    let report = ingest_records(&store, "org_e2e", &parse.calls, &config).unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.errors, 0);

    let summary = summarize(&parse, &report);
    assert!(summary.success);
    assert_eq!(summary.rows_processed, 2);
    assert_eq!(summary.parse_errors, 1);

    // Fetch and aggregate.
    let tenant = store.find_tenant("org_e2e").unwrap().unwrap();
    let filter = DashboardFilter::for_range(DateRange::new(date(2025, 1, 1), date(2025, 1, 31)));
    let (current, previous) = store.fetch_calls_with_comparison(&tenant.id, &filter).unwrap();
    assert_eq!(current.len(), 2);
    assert!(previous.is_empty());

    // Total-based conversion rate: 1 of 2 calls converted, $100 attributed.
    let marketing = marketing_metrics(&current, &previous);
    assert_eq!(marketing.total_calls, 2);
    assert_eq!(marketing.conversion_rate, 50.0);
    assert_eq!(marketing.total_value, 100.0);

    // Answered-based overview rate agrees here since both calls answered.
    let overview = overview_metrics(&current, &previous);
    assert_eq!(overview.answered_calls, 2);
    assert_eq!(overview.conversion_rate, 50.0);
    assert_eq!(overview.trends.calls_trend, 100.0);

    // Re-uploading the same file must not double anything.
    let again = ingest_records(&store, "org_e2e", &parse.calls, &config).unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.skipped, 2);
    assert_eq!(store.call_count(&tenant.id).unwrap(), 2);
}
