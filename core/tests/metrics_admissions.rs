use calltrack_core::admissions_metrics::{
    admissions_metrics, agent_performance, conversion_funnel, hourly_performance,
    score_breakdown, top_performing_states,
};
use calltrack_core::record::CallRecord;
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn call(score: Option<f64>, conversion: bool) -> CallRecord {
    CallRecord {
        call_id: "X".to_string(),
        csr_call_score: score,
        csr_conversion: conversion,
        ..CallRecord::default()
    }
}

// ── Headline metrics ─────────────────────────────────────────────────────────

#[test]
fn qualified_leads_are_scored_three_or_better() {
    let current = vec![
        call(Some(4.5), true),
        call(Some(3.0), false),
        call(Some(2.9), false),
        call(None, false),
    ];
    let m = admissions_metrics(&current, &[]);
    assert_eq!(m.total_inquiries, 4);
    assert_eq!(m.qualified_leads, 2);
    assert_eq!(m.qualification_rate, 50.0);
    // 1 conversion over 2 QUALIFIED leads, not over 4 inquiries.
    assert_eq!(m.conversion_rate, 50.0);
}

#[test]
fn average_score_excludes_absent_values() {
    let current = vec![call(Some(4.0), false), call(None, false), call(Some(2.0), false)];
    let m = admissions_metrics(&current, &[]);
    // (4 + 2) / 2, never / 3.
    assert_eq!(m.avg_call_score, 3.0);
}

#[test]
fn average_talk_time_counts_only_calls_that_talked() {
    let mut talked = call(None, false);
    talked.talk_time = Some(120);
    let mut zero = call(None, false);
    zero.talk_time = Some(0);
    let silent = call(None, false);

    let m = admissions_metrics(&[talked, zero, silent], &[]);
    assert_eq!(m.avg_talk_time, 120.0);
}

#[test]
fn qualified_trend_follows_the_zero_rule() {
    let current = vec![call(Some(4.0), false)];
    let previous = vec![call(Some(1.0), false)];
    let m = admissions_metrics(&current, &previous);
    // Previous period had zero qualified leads, current has one: +100%.
    assert_eq!(m.trends.qualified_trend, 100.0);
    assert_eq!(m.trends.inquiries_trend, 0.0);
}

// ── Agent performance ────────────────────────────────────────────────────────

#[test]
fn agents_group_under_alias_fields_with_sentinel_fallback() {
    let mut by_agent = call(Some(4.0), true);
    by_agent.agent = Some("Dana".to_string());
    let mut by_csr_name = call(Some(3.0), true);
    by_csr_name.csr_name = Some("Dana".to_string());
    let anonymous = call(None, false);

    let rows = agent_performance(&[by_agent, by_csr_name, anonymous], 10);
    assert_eq!(rows.len(), 2);
    // Both name fields roll up to the same agent.
    let dana = rows.iter().find(|r| r.agent == "Dana").unwrap();
    assert_eq!(dana.calls, 2);
    assert_eq!(dana.conversions, 2);
    assert_eq!(dana.avg_score, 3.5);
    assert!(rows.iter().any(|r| r.agent == "(No agent)"));
}

#[test]
fn agents_rank_by_conversions_not_volume() {
    let mut quiet = call(None, true);
    quiet.agent = Some("Quiet".to_string());
    let mut busy_a = call(None, false);
    busy_a.agent = Some("Busy".to_string());
    let busy_b = busy_a.clone();
    let busy_c = busy_a.clone();

    let rows = agent_performance(&[quiet, busy_a, busy_b, busy_c], 10);
    assert_eq!(rows[0].agent, "Quiet");
    assert_eq!(rows[1].agent, "Busy");
    assert_eq!(rows[1].calls, 3);
}

// ── Score breakdown ──────────────────────────────────────────────────────────

#[test]
fn score_breakdown_omits_empty_buckets() {
    let calls = vec![
        call(Some(4.8), true),
        call(Some(4.7), false),
        call(Some(1.0), false),
        call(None, false),
    ];
    let breakdown = score_breakdown(&calls);
    // Only the Excellent and Poor buckets have calls.
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].score_range, "4.5 - 5.0 (Excellent)");
    assert_eq!(breakdown[0].calls, 2);
    assert_eq!(breakdown[0].conversion_rate, 50.0);
    // Percentages are over the 3 scored calls, not all 4.
    assert!((breakdown[0].percentage - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(breakdown[1].score_range, "0.0 - 1.9 (Poor)");
}

#[test]
fn score_breakdown_is_empty_without_scored_calls() {
    assert!(score_breakdown(&[call(None, true)]).is_empty());
    assert!(score_breakdown(&[]).is_empty());
}

// ── Funnel ───────────────────────────────────────────────────────────────────

#[test]
fn funnel_percentages_are_relative_to_the_first_stage() {
    let mut calls = Vec::new();
    for i in 0..100 {
        // 40 qualified, 10 of them converted.
        let score = if i < 40 { Some(4.0) } else { Some(1.0) };
        calls.push(call(score, i < 10));
    }
    let funnel = conversion_funnel(&calls);
    assert_eq!(funnel.len(), 3);
    assert_eq!(funnel[0].stage, "Total Inquiries");
    assert_eq!(funnel[0].count, 100);
    assert_eq!(funnel[0].percentage, 100.0);
    assert_eq!(funnel[1].count, 40);
    assert_eq!(funnel[1].percentage, 40.0);
    assert_eq!(funnel[2].count, 10);
    // 10 / 100 first-stage inquiries, NOT 10 / 40 qualified.
    assert_eq!(funnel[2].percentage, 10.0);
}

#[test]
fn funnel_is_empty_without_calls() {
    assert!(conversion_funnel(&[]).is_empty());
}

// ── Hourly ───────────────────────────────────────────────────────────────────

#[test]
fn hourly_covers_business_hours_even_when_empty() {
    let mut morning = call(Some(4.0), true);
    morning.datetime = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(9, 30, 0);
    let mut afternoon = call(None, false);
    afternoon.datetime = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(13, 5, 0);
    let mut late_night = call(None, false);
    late_night.datetime = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap().and_hms_opt(23, 0, 0);

    let hourly = hourly_performance(&[morning, afternoon, late_night]);
    assert_eq!(hourly.len(), 9);
    assert_eq!(hourly[0].hour, "9AM");
    assert_eq!(hourly[0].calls, 1);
    assert_eq!(hourly[0].avg_score, 4.0);
    assert_eq!(hourly[3].hour, "12PM");
    assert_eq!(hourly[4].hour, "1PM");
    assert_eq!(hourly[4].calls, 1);
    assert_eq!(hourly[8].hour, "5PM");
    // 11PM falls outside the displayed window.
    let total: usize = hourly.iter().map(|h| h.calls).sum();
    assert_eq!(total, 2);
}

// ── States ───────────────────────────────────────────────────────────────────

#[test]
fn states_rank_by_conversion_rate() {
    let mut tx_win = call(None, true);
    tx_win.state = Some("TX".to_string());
    let mut ca_a = call(None, true);
    ca_a.state = Some("CA".to_string());
    let mut ca_b = call(None, false);
    ca_b.state = Some("CA".to_string());
    let stateless = call(None, true);

    let rows = top_performing_states(&[tx_win, ca_a, ca_b, stateless], 10);
    // Stateless calls are excluded here, not bucketed.
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].state, "TX");
    assert_eq!(rows[0].conversion_rate, 100.0);
    assert_eq!(rows[1].state, "CA");
    assert_eq!(rows[1].conversion_rate, 50.0);
}
