use calltrack_core::config::UploadConfig;
use calltrack_core::filter::{DashboardFilter, DateRange};
use calltrack_core::record::CallRecord;
use calltrack_core::store::{CallStore, DEFAULT_TENANT_NAME};
use calltrack_core::upload::{check_upload, ingest_records};
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_store() -> CallStore {
    let store = CallStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn make_call(call_id: &str) -> CallRecord {
    CallRecord {
        call_id: call_id.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 15),
        call_status: Some("answered".to_string()),
        ..CallRecord::default()
    }
}

fn jan_2025() -> DashboardFilter {
    DashboardFilter::for_range(DateRange::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
    ))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn tenant_is_provisioned_lazily_on_first_upload() {
    let store = make_store();
    let calls = vec![make_call("A1")];

    assert_eq!(store.tenant_count().unwrap(), 0);
    ingest_records(&store, "org_1", &calls, &UploadConfig::default()).unwrap();

    assert_eq!(store.tenant_count().unwrap(), 1);
    let tenant = store.find_tenant("org_1").unwrap().unwrap();
    assert_eq!(tenant.name, DEFAULT_TENANT_NAME);
}

#[test]
fn reingesting_the_same_upload_is_idempotent() {
    let store = make_store();
    let calls: Vec<CallRecord> = (0..50).map(|i| make_call(&format!("C{i}"))).collect();
    let config = UploadConfig::default();
    let external = "org_1".to_string();

    let first = ingest_records(&store, &external, &calls, &config).unwrap();
    assert_eq!(first.inserted, 50);
    assert_eq!(first.skipped, 0);

    let second = ingest_records(&store, &external, &calls, &config).unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 50);

    let tenant = store.find_tenant("org_1").unwrap().unwrap();
    assert_eq!(store.call_count(&tenant.id).unwrap(), 50);
}

#[test]
fn duplicate_call_ids_inside_one_upload_are_skipped() {
    let store = make_store();
    let calls = vec![
        make_call("A1"),
        make_call("A2"),
        make_call("A1"),
        make_call("A1"),
    ];

    let report =
        ingest_records(&store, "org_1", &calls, &UploadConfig::default()).unwrap();
    assert_eq!(report.total_rows, 4);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.errors, 0);
}

#[test]
fn small_batches_cover_every_record_across_boundaries() {
    let store = make_store();
    let calls: Vec<CallRecord> = (0..12).map(|i| make_call(&format!("B{i}"))).collect();
    let config = UploadConfig {
        batch_size: 5,
        ..UploadConfig::default()
    };

    // 12 records at batch size 5 → batches of 5/5/2, all inserted.
    let report = ingest_records(&store, "org_1", &calls, &config).unwrap();
    assert_eq!(report.total_rows, 12);
    assert_eq!(report.inserted, 12);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.errors, 0);

    let tenant = store.find_tenant("org_1").unwrap().unwrap();
    assert_eq!(store.call_count(&tenant.id).unwrap(), 12);
}

#[test]
fn tenants_do_not_see_each_others_records() {
    let store = make_store();
    let config = UploadConfig::default();
    ingest_records(&store, "org_a", &[make_call("A1")], &config).unwrap();
    ingest_records(&store, "org_b", &[make_call("A1")], &config).unwrap();

    let a = store.find_tenant("org_a").unwrap().unwrap();
    let b = store.find_tenant("org_b").unwrap().unwrap();
    assert_eq!(store.call_count(&a.id).unwrap(), 1);
    assert_eq!(store.call_count(&b.id).unwrap(), 1);

    let calls_a = store.fetch_calls(&a.id, &jan_2025()).unwrap();
    assert_eq!(calls_a.len(), 1);
}

#[test]
fn stored_records_round_trip_their_fields() {
    let store = make_store();
    let mut call = make_call("R1");
    call.csr_call_score = Some(4.5);
    call.csr_conversion = true;
    call.csr_value = Some(250.75);
    call.tags = vec!["vip".to_string(), "priority".to_string()];
    call.datetime = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(10, 30, 0);
    call.tracking_source = Some("Google Ads".to_string());

    ingest_records(
        &store,
        "org_1",
        std::slice::from_ref(&call),
        &UploadConfig::default(),
    )
    .unwrap();

    let tenant = store.find_tenant("org_1").unwrap().unwrap();
    let fetched = store.fetch_calls(&tenant.id, &jan_2025()).unwrap();
    assert_eq!(fetched.len(), 1);
    let row = &fetched[0];
    assert!(row.id.is_some());
    assert_eq!(row.call_id, "R1");
    assert_eq!(row.csr_call_score, Some(4.5));
    assert!(row.csr_conversion);
    assert_eq!(row.csr_value, Some(250.75));
    assert_eq!(row.tags, vec!["vip", "priority"]);
    assert_eq!(row.datetime, call.datetime);
    assert_eq!(row.date, call.date);
    assert_eq!(row.tracking_source.as_deref(), Some("Google Ads"));
}

#[test]
fn upload_checks_enforce_extension_and_size() {
    let config = UploadConfig::default();
    assert!(check_upload("calls.csv", 1024, &config).is_ok());
    assert!(check_upload("calls.CSV", 1024, &config).is_ok());
    assert!(check_upload("calls.xlsx", 1024, &config).is_err());
    assert!(check_upload("calls.csv", config.max_file_bytes + 1, &config).is_err());
}
