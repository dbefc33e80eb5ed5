use calltrack_core::quality_metrics::{field_completeness, quality_metrics, FieldPriority};
use calltrack_core::record::CallRecord;
use chrono::NaiveDate;

fn full_call() -> CallRecord {
    CallRecord {
        call_id: "Q1".to_string(),
        customer_number: Some("C-100".to_string()),
        call_status: Some("answered".to_string()),
        duration: Some(120),
        talk_time: Some(90),
        datetime: NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0),
        date: NaiveDate::from_ymd_opt(2025, 1, 5),
        tracking_number: Some("+15550100".to_string()),
        tracking_source: Some("Google Ads".to_string()),
        campaign: Some("Spring".to_string()),
        source: Some("google".to_string()),
        medium: Some("cpc".to_string()),
        keyword: Some("enroll".to_string()),
        csr_name: Some("Dana".to_string()),
        csr_call_score: Some(4.0),
        csr_value: Some(100.0),
        city: Some("Austin".to_string()),
        state: Some("TX".to_string()),
        postal_code: Some("78701".to_string()),
        device: Some("mobile".to_string()),
        browser: Some("Safari".to_string()),
        transcription: Some("hello".to_string()),
        ..CallRecord::default()
    }
}

#[test]
fn fully_populated_records_score_one_hundred() {
    let m = quality_metrics(&[full_call(), full_call()]);
    assert_eq!(m.total_calls, 2);
    assert_eq!(m.completeness_score, 100.0);
    assert_eq!(m.validation_score, 100.0);
    assert_eq!(m.enrichment_score, 100.0);
    assert_eq!(m.overall_score, 100.0);
}

#[test]
fn empty_input_scores_zero_without_dividing_by_zero() {
    let m = quality_metrics(&[]);
    assert_eq!(m.total_calls, 0);
    assert_eq!(m.overall_score, 0.0);
}

#[test]
fn validation_requires_duration_status_and_a_date() {
    let valid = full_call();
    let mut invalid = full_call();
    invalid.duration = None;

    let m = quality_metrics(&[valid, invalid]);
    assert_eq!(m.validation_score, 50.0);
}

#[test]
fn completeness_table_reports_per_field_presence() {
    let populated = full_call();
    let bare = CallRecord {
        call_id: "Q2".to_string(),
        ..CallRecord::default()
    };

    let fields = field_completeness(&[populated, bare]);
    let status = fields.iter().find(|f| f.field == "call_status").unwrap();
    assert_eq!(status.total, 2);
    assert_eq!(status.complete, 1);
    assert_eq!(status.completeness, 50.0);
    assert_eq!(status.priority, FieldPriority::High);
    assert_eq!(status.category, "Call Info");
}
