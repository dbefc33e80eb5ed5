use calltrack_core::marketing_metrics::{
    campaign_performance, campaign_trends, keyword_performance, marketing_metrics,
    medium_breakdown, source_performance,
};
use calltrack_core::record::CallRecord;
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn call(conversion: bool, value: Option<f64>) -> CallRecord {
    CallRecord {
        call_id: "X".to_string(),
        csr_conversion: conversion,
        csr_value: value,
        ..CallRecord::default()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn conversion_rate_divides_by_total_calls() {
    let current = vec![
        call(true, Some(100.0)),
        call(false, None),
        call(false, None),
        call(false, None),
    ];
    let m = marketing_metrics(&current, &[]);
    assert_eq!(m.total_calls, 4);
    assert_eq!(m.total_conversions, 1);
    // 1 over 4 total — this view never divides by answered.
    assert_eq!(m.conversion_rate, 25.0);
    assert_eq!(m.total_value, 100.0);
    assert_eq!(m.avg_value_per_call, 25.0);
}

#[test]
fn value_trend_follows_the_zero_rule() {
    let current = vec![call(true, Some(50.0))];
    let m = marketing_metrics(&current, &[]);
    assert_eq!(m.trends.value_trend, 100.0);
    assert_eq!(m.trends.calls_trend, 100.0);

    let previous = vec![call(false, Some(25.0))];
    let m = marketing_metrics(&current, &previous);
    assert_eq!(m.trends.value_trend, 100.0); // 25 → 50
    assert_eq!(m.trends.calls_trend, 0.0); // 1 → 1
}

#[test]
fn campaigns_group_under_explicit_fallback_label() {
    let mut branded = call(true, Some(80.0));
    branded.campaign = Some("Spring Promo".to_string());
    let unbranded = call(false, Some(20.0));

    let rows = campaign_performance(&[branded, unbranded], 10);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.campaign == "(No campaign)"));
    let promo = rows.iter().find(|r| r.campaign == "Spring Promo").unwrap();
    assert_eq!(promo.conversion_rate, 100.0);
    assert_eq!(promo.total_value, 80.0);
    assert_eq!(promo.avg_value, 80.0);
}

#[test]
fn sources_sort_by_call_volume_and_truncate() {
    let mut calls = Vec::new();
    for i in 0..5 {
        for _ in 0..=i {
            let mut c = call(false, None);
            c.tracking_source = Some(format!("S{i}"));
            calls.push(c);
        }
    }
    let rows = source_performance(&calls, 3);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].source, "S4");
    assert_eq!(rows[0].calls, 5);
    assert_eq!(rows[2].source, "S2");
}

#[test]
fn medium_breakdown_is_unlimited_with_not_set_fallback() {
    let mut cpc = call(true, None);
    cpc.medium = Some("cpc".to_string());
    let bare = call(false, None);

    let rows = medium_breakdown(&[cpc, bare]);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.medium == "(Not set)"));
    assert!(rows.iter().any(|r| r.medium == "cpc" && r.conversion_rate == 100.0));
}

#[test]
fn keywordless_calls_are_excluded_from_keyword_performance() {
    let mut kw = call(true, Some(40.0));
    kw.keyword = Some("enroll now".to_string());
    let bare = call(false, None);

    let rows = keyword_performance(&[kw, bare], 20);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].keyword, "enroll now");
    assert_eq!(rows[0].total_value, 40.0);
}

#[test]
fn campaign_trends_bucket_by_day_ascending() {
    let mut jan9 = call(true, None);
    jan9.datetime = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap().and_hms_opt(14, 0, 0);
    let mut jan3a = call(false, None);
    jan3a.datetime = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap().and_hms_opt(9, 0, 0);
    let mut jan3b = call(true, None);
    jan3b.datetime = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap().and_hms_opt(16, 0, 0);
    let undated = call(true, None);

    let trends = campaign_trends(&[jan9, jan3a, jan3b, undated]);
    assert_eq!(trends.len(), 2);
    assert_eq!(trends[0].date, "2025-01-03");
    assert_eq!(trends[0].calls, 2);
    assert_eq!(trends[0].conversions, 1);
    assert_eq!(trends[0].conversion_rate, 50.0);
    assert_eq!(trends[1].date, "2025-01-09");
}
