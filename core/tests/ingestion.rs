use calltrack_core::ingest::parse_csv;
use calltrack_core::mapper::{
    parse_bool, parse_date, parse_datetime, parse_duration, parse_json, parse_list, parse_number,
};

// ── Coercions ────────────────────────────────────────────────────────────────

#[test]
fn duration_accepts_all_three_shapes() {
    assert_eq!(parse_duration("00:05:23"), Some(323));
    assert_eq!(parse_duration("05:23"), Some(323));
    assert_eq!(parse_duration("323"), Some(323));
}

#[test]
fn duration_rejects_garbage_as_absent() {
    assert_eq!(parse_duration("abc"), None);
    assert_eq!(parse_duration("1:2:3:4"), None);
    assert_eq!(parse_duration("-5"), None);
    assert_eq!(parse_duration(""), None);
}

#[test]
fn booleans_default_false_and_match_case_insensitively() {
    assert!(parse_bool("true"));
    assert!(parse_bool("TRUE"));
    assert!(parse_bool("Yes"));
    assert!(parse_bool("1"));
    assert!(!parse_bool("no"));
    assert!(!parse_bool("0"));
    assert!(!parse_bool("anything else"));
}

#[test]
fn numbers_reject_unparseable_as_absent() {
    assert_eq!(parse_number("3.5"), Some(3.5));
    assert_eq!(parse_number(" 100 "), Some(100.0));
    assert_eq!(parse_number("n/a"), None);
}

#[test]
fn lists_split_trim_and_drop_empties() {
    assert_eq!(parse_list("a, b ,,c"), vec!["a", "b", "c"]);
    assert!(parse_list("  ,  , ").is_empty());
}

#[test]
fn embedded_json_is_best_effort() {
    assert!(parse_json(r#"{"key": "value"}"#).is_some());
    assert_eq!(parse_json("{not json"), None);
}

#[test]
fn timestamps_parse_common_vendor_shapes() {
    assert!(parse_datetime("2025-01-15T10:30:00").is_some());
    assert!(parse_datetime("2025-01-15 10:30:00").is_some());
    assert!(parse_datetime("01/15/2025 10:30").is_some());
    assert!(parse_datetime("not a date").is_none());

    assert!(parse_date("2025-01-15").is_some());
    assert!(parse_date("01/15/2025").is_some());
    assert!(parse_date("15th of January").is_none());
}

// ── Pipeline ─────────────────────────────────────────────────────────────────

#[test]
fn malformed_row_does_not_abort_the_rest() {
    let csv = "CallId,Call Status,CSR Conversion\n\
               A1,answered,true\n\
               ,missed,false\n\
               A3,answered,false\n";

    let report = parse_csv(csv);
    assert!(report.success);
    assert_eq!(report.total_rows, 3);
    assert_eq!(report.valid_rows, 2);
    assert_eq!(report.invalid_rows, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);
    assert_eq!(report.errors[0].message, "Missing required field: CallId");
    assert_eq!(report.calls[0].call_id, "A1");
    assert_eq!(report.calls[1].call_id, "A3");
}

#[test]
fn alternate_id_header_spelling_is_accepted() {
    let report = parse_csv("Call Id,Name\nB7,Jo\n");
    assert_eq!(report.valid_rows, 1);
    assert_eq!(report.calls[0].call_id, "B7");
}

#[test]
fn short_rows_map_missing_cells_as_absent() {
    let csv = "CallId,Name,City,CSR Call Score\nA1,Jo\n";
    let report = parse_csv(csv);
    assert_eq!(report.valid_rows, 1);
    let call = &report.calls[0];
    assert_eq!(call.name.as_deref(), Some("Jo"));
    assert_eq!(call.city, None);
    assert_eq!(call.csr_call_score, None);
}

#[test]
fn typed_fields_map_through_their_coercions() {
    let csv = "CallId,Duration,Talk Time,DateTime,Date,CSR Conversion,CSR Call Score,CSR Value,Tags,CustomFields,Mobile\n\
               A1,00:05:23,120,2025-01-15T10:30:00,2025-01-15,yes,4.5,250.75,\"vip, priority\",\"{\"\"plan\"\": \"\"gold\"\"}\",1\n";
    let report = parse_csv(csv);
    assert_eq!(report.valid_rows, 1);
    let call = &report.calls[0];
    assert_eq!(call.duration, Some(323));
    assert_eq!(call.talk_time, Some(120));
    assert!(call.datetime.is_some());
    assert!(call.date.is_some());
    assert!(call.csr_conversion);
    assert_eq!(call.csr_call_score, Some(4.5));
    assert_eq!(call.csr_value, Some(250.75));
    assert_eq!(call.tags, vec!["vip", "priority"]);
    assert_eq!(call.custom_fields.as_ref().unwrap()["plan"], "gold");
    assert!(call.mobile);
}

#[test]
fn bad_cells_fall_back_to_absent_without_rejecting_the_row() {
    let csv = "CallId,Duration,DateTime,CSR Call Score,CustomFields\n\
               A1,later,someday,high,{broken\n";
    let report = parse_csv(csv);
    assert_eq!(report.valid_rows, 1);
    let call = &report.calls[0];
    assert_eq!(call.duration, None);
    assert_eq!(call.datetime, None);
    assert_eq!(call.csr_call_score, None);
    assert_eq!(call.custom_fields, None);
}

#[test]
fn empty_file_reports_zero_rows_without_errors() {
    let report = parse_csv("");
    assert!(report.success);
    assert_eq!(report.total_rows, 0);
    assert_eq!(report.valid_rows, 0);
    assert_eq!(report.invalid_rows, 0);
}

#[test]
fn file_with_only_headers_yields_no_records() {
    let report = parse_csv("CallId,Name,Call Status\n");
    assert!(report.success);
    assert_eq!(report.total_rows, 0);
    assert!(report.calls.is_empty());
}
