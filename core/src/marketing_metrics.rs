//! Marketing view aggregates.
//!
//! Denominator convention for this view: conversion rates are conversions
//! over TOTAL calls, per group and for the headline metric.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::metrics::{call_value, conversions, percentage, total_value, trend};
use crate::record::CallRecord;

#[derive(Debug, Clone, Serialize)]
pub struct MarketingTrends {
    pub calls_trend: f64,
    pub conversions_trend: f64,
    pub value_trend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketingMetrics {
    pub total_calls: usize,
    pub total_conversions: usize,
    pub conversion_rate: f64,
    pub total_value: f64,
    pub avg_value_per_call: f64,
    pub trends: MarketingTrends,
}

pub fn marketing_metrics(current: &[CallRecord], previous: &[CallRecord]) -> MarketingMetrics {
    let total_calls = current.len();
    let total_conversions = conversions(current);
    let value = total_value(current);

    let prev_calls = previous.len();
    let prev_conversions = conversions(previous);
    let prev_value = total_value(previous);

    MarketingMetrics {
        total_calls,
        total_conversions,
        conversion_rate: percentage(total_conversions as f64, total_calls as f64),
        total_value: value,
        avg_value_per_call: if total_calls > 0 {
            value / total_calls as f64
        } else {
            0.0
        },
        trends: MarketingTrends {
            calls_trend: trend(total_calls as f64, prev_calls as f64),
            conversions_trend: trend(total_conversions as f64, prev_conversions as f64),
            value_trend: trend(value, prev_value),
        },
    }
}

// ── Grouped performance ──────────────────────────────────────────────────────

#[derive(Default)]
struct GroupAcc {
    calls: usize,
    conversions: usize,
    total_value: f64,
}

impl GroupAcc {
    fn add(&mut self, call: &CallRecord) {
        self.calls += 1;
        if call.csr_conversion {
            self.conversions += 1;
        }
        self.total_value += call_value(call);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignPerformance {
    pub campaign: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub total_value: f64,
    pub avg_value: f64,
}

pub fn campaign_performance(calls: &[CallRecord], limit: usize) -> Vec<CampaignPerformance> {
    let mut by_campaign: HashMap<String, GroupAcc> = HashMap::new();
    for call in calls {
        let campaign = call
            .campaign
            .clone()
            .unwrap_or_else(|| "(No campaign)".to_string());
        by_campaign.entry(campaign).or_default().add(call);
    }
    let mut rows: Vec<CampaignPerformance> = by_campaign
        .into_iter()
        .map(|(campaign, acc)| CampaignPerformance {
            campaign,
            calls: acc.calls,
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.calls as f64),
            total_value: acc.total_value,
            avg_value: if acc.calls > 0 {
                acc.total_value / acc.calls as f64
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.calls
            .cmp(&a.calls)
            .then_with(|| a.campaign.cmp(&b.campaign))
    });
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcePerformance {
    pub source: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub total_value: f64,
    pub avg_value: f64,
}

pub fn source_performance(calls: &[CallRecord], limit: usize) -> Vec<SourcePerformance> {
    let mut by_source: HashMap<String, GroupAcc> = HashMap::new();
    for call in calls {
        let source = call
            .tracking_source
            .clone()
            .unwrap_or_else(|| "(No source)".to_string());
        by_source.entry(source).or_default().add(call);
    }
    let mut rows: Vec<SourcePerformance> = by_source
        .into_iter()
        .map(|(source, acc)| SourcePerformance {
            source,
            calls: acc.calls,
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.calls as f64),
            total_value: acc.total_value,
            avg_value: if acc.calls > 0 {
                acc.total_value / acc.calls as f64
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.source.cmp(&b.source)));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct MediumPerformance {
    pub medium: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
}

/// Every medium, unlimited — the view renders this as a full breakdown.
pub fn medium_breakdown(calls: &[CallRecord]) -> Vec<MediumPerformance> {
    let mut by_medium: HashMap<String, GroupAcc> = HashMap::new();
    for call in calls {
        let medium = call
            .medium
            .clone()
            .unwrap_or_else(|| "(Not set)".to_string());
        by_medium.entry(medium).or_default().add(call);
    }
    let mut rows: Vec<MediumPerformance> = by_medium
        .into_iter()
        .map(|(medium, acc)| MediumPerformance {
            medium,
            calls: acc.calls,
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.calls as f64),
        })
        .collect();
    rows.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.medium.cmp(&b.medium)));
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordPerformance {
    pub keyword: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub total_value: f64,
}

/// Keywordless calls are excluded rather than bucketed under a fallback.
pub fn keyword_performance(calls: &[CallRecord], limit: usize) -> Vec<KeywordPerformance> {
    let mut by_keyword: HashMap<String, GroupAcc> = HashMap::new();
    for call in calls {
        let Some(keyword) = call.keyword.clone() else {
            continue;
        };
        by_keyword.entry(keyword).or_default().add(call);
    }
    let mut rows: Vec<KeywordPerformance> = by_keyword
        .into_iter()
        .map(|(keyword, acc)| KeywordPerformance {
            keyword,
            calls: acc.calls,
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.calls as f64),
            total_value: acc.total_value,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.calls
            .cmp(&a.calls)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignTrendPoint {
    pub date: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
}

/// Daily campaign activity; only `datetime`-bearing calls participate.
pub fn campaign_trends(calls: &[CallRecord]) -> Vec<CampaignTrendPoint> {
    let mut by_date: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for call in calls {
        let Some(dt) = call.datetime else { continue };
        let date = dt.date().format("%Y-%m-%d").to_string();
        let entry = by_date.entry(date).or_default();
        entry.0 += 1;
        if call.csr_conversion {
            entry.1 += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, (calls, converted))| CampaignTrendPoint {
            date,
            calls,
            conversions: converted,
            conversion_rate: percentage(converted as f64, calls as f64),
        })
        .collect()
}
