//! Executive view aggregates.
//!
//! Denominator convention for this view: conversion rate is conversions
//! over TOTAL calls. Revenue figures come straight from the CSR value
//! field (absent values contribute zero).

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::metrics::{
    call_value, conversions, format_currency, group_thousands, percentage, total_value, trend,
};
use crate::record::CallRecord;

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveTrends {
    pub revenue_trend: f64,
    pub calls_trend: f64,
    pub conversions_trend: f64,
    pub avg_revenue_trend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveMetrics {
    pub total_revenue: f64,
    pub total_calls: usize,
    pub total_conversions: usize,
    pub conversion_rate: f64,
    pub avg_revenue_per_call: f64,
    pub avg_revenue_per_conversion: f64,
    /// Weighted blend: 50% revenue trend, 25% calls, 25% conversions.
    pub growth_rate: f64,
    pub trends: ExecutiveTrends,
}

pub fn executive_metrics(current: &[CallRecord], previous: &[CallRecord]) -> ExecutiveMetrics {
    let total_calls = current.len();
    let total_conversions = conversions(current);
    let total_revenue = total_value(current);

    let avg_revenue_per_call = if total_calls > 0 {
        total_revenue / total_calls as f64
    } else {
        0.0
    };
    let avg_revenue_per_conversion = if total_conversions > 0 {
        total_revenue / total_conversions as f64
    } else {
        0.0
    };

    let prev_calls = previous.len();
    let prev_conversions = conversions(previous);
    let prev_revenue = total_value(previous);
    let prev_avg_revenue = if prev_calls > 0 {
        prev_revenue / prev_calls as f64
    } else {
        0.0
    };

    let revenue_trend = trend(total_revenue, prev_revenue);
    let calls_trend = trend(total_calls as f64, prev_calls as f64);
    let conversions_trend = trend(total_conversions as f64, prev_conversions as f64);

    ExecutiveMetrics {
        total_revenue,
        total_calls,
        total_conversions,
        conversion_rate: percentage(total_conversions as f64, total_calls as f64),
        avg_revenue_per_call,
        avg_revenue_per_conversion,
        growth_rate: revenue_trend * 0.5 + calls_trend * 0.25 + conversions_trend * 0.25,
        trends: ExecutiveTrends {
            revenue_trend,
            calls_trend,
            conversions_trend,
            avg_revenue_trend: trend(avg_revenue_per_call, prev_avg_revenue),
        },
    }
}

// ── Revenue breakdowns ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RevenueBySource {
    pub source: String,
    pub revenue: f64,
    pub calls: usize,
    pub conversions: usize,
    /// Revenue per call, scaled ×100 the way the view displays it.
    pub roi: f64,
}

pub fn revenue_by_source(calls: &[CallRecord], limit: usize) -> Vec<RevenueBySource> {
    #[derive(Default)]
    struct Acc {
        revenue: f64,
        calls: usize,
        conversions: usize,
    }
    let mut by_source: HashMap<String, Acc> = HashMap::new();
    for call in calls {
        let source = call
            .tracking_source
            .clone()
            .unwrap_or_else(|| "(No source)".to_string());
        let acc = by_source.entry(source).or_default();
        acc.revenue += call_value(call);
        acc.calls += 1;
        if call.csr_conversion {
            acc.conversions += 1;
        }
    }
    let mut rows: Vec<RevenueBySource> = by_source
        .into_iter()
        .map(|(source, acc)| RevenueBySource {
            source,
            revenue: acc.revenue,
            calls: acc.calls,
            conversions: acc.conversions,
            roi: if acc.calls > 0 {
                acc.revenue / acc.calls as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.source.cmp(&b.source))
    });
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTrendPoint {
    pub date: String,
    pub revenue: f64,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
}

/// Revenue and conversion activity per calendar day, ascending.
pub fn daily_trends(calls: &[CallRecord]) -> Vec<DailyTrendPoint> {
    #[derive(Default)]
    struct Acc {
        revenue: f64,
        calls: usize,
        conversions: usize,
    }
    let mut by_date: BTreeMap<String, Acc> = BTreeMap::new();
    for call in calls {
        let Some(dt) = call.datetime else { continue };
        let acc = by_date.entry(dt.date().format("%Y-%m-%d").to_string()).or_default();
        acc.revenue += call_value(call);
        acc.calls += 1;
        if call.csr_conversion {
            acc.conversions += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, acc)| DailyTrendPoint {
            date,
            revenue: acc.revenue,
            calls: acc.calls,
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.calls as f64),
        })
        .collect()
}

// ── Performance summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

fn direction(change: f64) -> TrendDirection {
    if change > 1.0 {
        TrendDirection::Up
    } else if change < -1.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Neutral
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub metric: String,
    pub current: String,
    pub previous: String,
    pub change: f64,
    pub trend: TrendDirection,
}

/// Five headline rows with display-formatted values. Changes here use the
/// plain previous>0 ratio (a flat zero previous period reads as no
/// change in this table).
pub fn performance_summary(current: &[CallRecord], previous: &[CallRecord]) -> Vec<SummaryRow> {
    let curr_revenue = total_value(current);
    let curr_calls = current.len();
    let curr_conversions = conversions(current);
    let curr_rate = percentage(curr_conversions as f64, curr_calls as f64);
    let curr_avg = if curr_calls > 0 {
        curr_revenue / curr_calls as f64
    } else {
        0.0
    };

    let prev_revenue = total_value(previous);
    let prev_calls = previous.len();
    let prev_conversions = conversions(previous);
    let prev_rate = percentage(prev_conversions as f64, prev_calls as f64);
    let prev_avg = if prev_calls > 0 {
        prev_revenue / prev_calls as f64
    } else {
        0.0
    };

    let ratio_change = |curr: f64, prev: f64| -> f64 {
        if prev > 0.0 {
            (curr - prev) / prev * 100.0
        } else {
            0.0
        }
    };

    let rows = [
        (
            "Total Revenue",
            format_currency(curr_revenue),
            format_currency(prev_revenue),
            ratio_change(curr_revenue, prev_revenue),
        ),
        (
            "Call Volume",
            group_thousands(curr_calls as i64),
            group_thousands(prev_calls as i64),
            ratio_change(curr_calls as f64, prev_calls as f64),
        ),
        (
            "Conversions",
            group_thousands(curr_conversions as i64),
            group_thousands(prev_conversions as i64),
            ratio_change(curr_conversions as f64, prev_conversions as f64),
        ),
        (
            "Conversion Rate",
            format!("{curr_rate:.1}%"),
            format!("{prev_rate:.1}%"),
            ratio_change(curr_rate, prev_rate),
        ),
        (
            "Avg Revenue/Call",
            format_currency(curr_avg),
            format_currency(prev_avg),
            ratio_change(curr_avg, prev_avg),
        ),
    ];

    rows.into_iter()
        .map(|(metric, current, previous, change)| SummaryRow {
            metric: metric.to_string(),
            current,
            previous,
            change,
            trend: direction(change),
        })
        .collect()
}

// ── Revenue channels ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RevenueChannel {
    pub channel: String,
    pub revenue: f64,
    pub percentage: f64,
}

/// Top revenue channels for the donut chart. When more channels exist than
/// the display limit, the top (limit − 1) survive and the remainder
/// collapse into "Other", so the revenue total is preserved across
/// truncation.
pub fn top_revenue_channels(calls: &[CallRecord], limit: usize) -> Vec<RevenueChannel> {
    let mut by_channel: HashMap<String, f64> = HashMap::new();
    for call in calls {
        let channel = call
            .tracking_source
            .clone()
            .or_else(|| call.campaign.clone())
            .unwrap_or_else(|| "(No channel)".to_string());
        *by_channel.entry(channel).or_default() += call_value(call);
    }
    let total_revenue: f64 = by_channel.values().sum();

    let mut channels: Vec<RevenueChannel> = by_channel
        .into_iter()
        .map(|(channel, revenue)| RevenueChannel {
            channel,
            revenue,
            percentage: percentage(revenue, total_revenue),
        })
        .collect();
    channels.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.channel.cmp(&b.channel))
    });

    if channels.len() <= limit {
        return channels;
    }
    let keep = limit.saturating_sub(1);
    let other_revenue: f64 = channels[keep..].iter().map(|c| c.revenue).sum();
    channels.truncate(keep);
    channels.push(RevenueChannel {
        channel: "Other".to_string(),
        revenue: other_revenue,
        percentage: percentage(other_revenue, total_revenue),
    });
    channels
}
