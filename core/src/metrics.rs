//! Shared aggregation helpers used by every dashboard view.
//!
//! Everything in this module (and the per-view modules) is a pure function
//! over already-fetched records: no I/O, no locking, no failure modes.
//! Absent optional fields follow one rule set — excluded from averages,
//! zero in sums, false in flags.

use crate::record::CallRecord;

/// Percentage change between a current and an immediately preceding period
/// of equal length. A period going from zero to nonzero reports +100, not
/// an undefined or infinite value.
pub fn trend(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Status contains "answered", case-insensitive.
pub fn is_answered(call: &CallRecord) -> bool {
    call.call_status
        .as_deref()
        .map(|s| s.to_ascii_lowercase().contains("answered"))
        .unwrap_or(false)
}

pub fn conversions(calls: &[CallRecord]) -> usize {
    calls.iter().filter(|c| c.csr_conversion).count()
}

pub fn call_value(call: &CallRecord) -> f64 {
    call.csr_value.unwrap_or(0.0)
}

pub fn total_value(calls: &[CallRecord]) -> f64 {
    calls.iter().map(call_value).sum()
}

/// ISO day key for time-bucketed series. Records lacking both timestamps
/// are excluded from series output.
pub fn day_key(call: &CallRecord) -> Option<String> {
    call.datetime
        .map(|dt| dt.date())
        .or(call.date)
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// The two historical agent-name fields are aliases when grouping.
pub fn agent_label(call: &CallRecord) -> String {
    call.agent
        .clone()
        .or_else(|| call.csr_name.clone())
        .unwrap_or_else(|| "(No agent)".to_string())
}

/// Coarse marketing channel from source/medium substring heuristics.
/// First matching rule wins; the order is load-bearing business logic.
pub fn classify_channel(call: &CallRecord) -> String {
    let source = call
        .tracking_source
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let medium = call
        .medium
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if medium.contains("cpc")
        || medium.contains("paid")
        || source.contains("google ads")
        || source.contains("bing ads")
    {
        "Paid Search".to_string()
    } else if medium.contains("organic") {
        "Organic Search".to_string()
    } else if source.contains("google business") || source.contains("gbp") || source.contains("maps")
    {
        "GBP / Maps".to_string()
    } else if medium.contains("referral") {
        "Referral".to_string()
    } else if let Some(raw) = call.tracking_source.as_deref().filter(|s| !s.is_empty()) {
        raw.to_string()
    } else {
        "Direct".to_string()
    }
}

/// Thousands-separated integer, e.g. 12345 → "12,345".
pub fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        format!("-{out}")
    } else {
        out
    }
}

/// Whole-dollar currency string, e.g. 12345.6 → "$12,346".
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    if rounded < 0 {
        format!("-${}", group_thousands(-rounded))
    } else {
        format!("${}", group_thousands(rounded))
    }
}
