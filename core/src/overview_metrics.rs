//! Overview view aggregates.
//!
//! Denominator convention for this view: the headline conversion rate is
//! conversions over ANSWERED calls, not total calls. Other views differ —
//! each module pins its own convention.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::metrics::{classify_channel, conversions, day_key, is_answered, percentage, trend};
use crate::record::CallRecord;

#[derive(Debug, Clone, Serialize)]
pub struct OverviewTrends {
    pub calls_trend: f64,
    pub answered_trend: f64,
    pub missed_trend: f64,
    pub conversions_trend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewMetrics {
    pub total_calls: usize,
    pub answered_calls: usize,
    pub missed_calls: usize,
    pub conversions: usize,
    pub answer_rate: f64,
    /// Conversions over answered calls.
    pub conversion_rate: f64,
    pub trends: OverviewTrends,
}

pub fn overview_metrics(current: &[CallRecord], previous: &[CallRecord]) -> OverviewMetrics {
    let total_calls = current.len();
    let answered_calls = current.iter().filter(|c| is_answered(c)).count();
    let missed_calls = total_calls - answered_calls;
    let converted = conversions(current);

    let prev_total = previous.len();
    let prev_answered = previous.iter().filter(|c| is_answered(c)).count();
    let prev_missed = prev_total - prev_answered;
    let prev_converted = conversions(previous);

    OverviewMetrics {
        total_calls,
        answered_calls,
        missed_calls,
        conversions: converted,
        answer_rate: percentage(answered_calls as f64, total_calls as f64),
        conversion_rate: percentage(converted as f64, answered_calls as f64),
        trends: OverviewTrends {
            calls_trend: trend(total_calls as f64, prev_total as f64),
            answered_trend: trend(answered_calls as f64, prev_answered as f64),
            missed_trend: trend(missed_calls as f64, prev_missed as f64),
            conversions_trend: trend(converted as f64, prev_converted as f64),
        },
    }
}

// ── Time series ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DailyVolume {
    pub date: String,
    pub total_calls: usize,
    pub answered_calls: usize,
    pub missed_calls: usize,
}

/// Calls per calendar day, ascending by date. Records without a timestamp
/// are excluded.
pub fn call_volume_over_time(calls: &[CallRecord]) -> Vec<DailyVolume> {
    let mut by_date: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for call in calls {
        let Some(date) = day_key(call) else { continue };
        let entry = by_date.entry(date).or_default();
        entry.0 += 1;
        if is_answered(call) {
            entry.1 += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, (total, answered))| DailyVolume {
            date,
            total_calls: total,
            answered_calls: answered,
            missed_calls: total - answered,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyConversion {
    pub date: String,
    pub conversions: usize,
    pub answer_rate: f64,
}

pub fn conversion_over_time(calls: &[CallRecord]) -> Vec<DailyConversion> {
    let mut by_date: BTreeMap<String, (usize, usize, usize)> = BTreeMap::new();
    for call in calls {
        let Some(date) = day_key(call) else { continue };
        let entry = by_date.entry(date).or_default();
        entry.0 += 1;
        if is_answered(call) {
            entry.1 += 1;
        }
        if call.csr_conversion {
            entry.2 += 1;
        }
    }
    by_date
        .into_iter()
        .map(|(date, (total, answered, converted))| DailyConversion {
            date,
            conversions: converted,
            answer_rate: percentage(answered as f64, total as f64),
        })
        .collect()
}

// ── Breakdowns ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LabelCount {
    pub name: String,
    pub value: usize,
}

pub fn status_breakdown(calls: &[CallRecord]) -> Vec<LabelCount> {
    let mut by_status: HashMap<String, usize> = HashMap::new();
    for call in calls {
        let status = call
            .call_status
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *by_status.entry(status).or_default() += 1;
    }
    let mut breakdown: Vec<LabelCount> = by_status
        .into_iter()
        .map(|(name, value)| LabelCount { name, value })
        .collect();
    breakdown.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    breakdown
}

/// Channel counts, top 7 plus an "Other" bucket holding the remainder.
pub fn channel_mix(calls: &[CallRecord]) -> Vec<LabelCount> {
    let mut by_channel: HashMap<String, usize> = HashMap::new();
    for call in calls {
        *by_channel.entry(classify_channel(call)).or_default() += 1;
    }
    let mut sorted: Vec<LabelCount> = by_channel
        .into_iter()
        .map(|(name, value)| LabelCount { name, value })
        .collect();
    sorted.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));

    if sorted.len() <= 7 {
        return sorted;
    }
    let rest: usize = sorted[7..].iter().map(|c| c.value).sum();
    sorted.truncate(7);
    sorted.push(LabelCount {
        name: "Other".to_string(),
        value: rest,
    });
    sorted
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBucket {
    pub range: String,
    pub calls: usize,
    pub conversion_rate: f64,
}

/// Coarse score distribution {0, 1–2, 3–5}. Zero-count buckets are kept in
/// this view's output (admissions drops them — a per-view asymmetry that is
/// intentional).
pub fn score_distribution(calls: &[CallRecord]) -> Vec<ScoreBucket> {
    struct Bucket {
        range: &'static str,
        min: f64,
        max: f64,
        calls: usize,
        conversions: usize,
    }
    let mut buckets = [
        Bucket {
            range: "0",
            min: 0.0,
            max: 0.0,
            calls: 0,
            conversions: 0,
        },
        Bucket {
            range: "1-2",
            min: 1.0,
            max: 2.0,
            calls: 0,
            conversions: 0,
        },
        Bucket {
            range: "3-5",
            min: 3.0,
            max: 5.0,
            calls: 0,
            conversions: 0,
        },
    ];

    for call in calls {
        let Some(score) = call.csr_call_score else {
            continue;
        };
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| score >= b.min && score <= b.max)
        {
            bucket.calls += 1;
            if call.csr_conversion {
                bucket.conversions += 1;
            }
        }
    }

    buckets
        .into_iter()
        .map(|b| ScoreBucket {
            range: b.range.to_string(),
            calls: b.calls,
            conversion_rate: percentage(b.conversions as f64, b.calls as f64),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct StatePerformance {
    pub state: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
}

pub fn top_states(calls: &[CallRecord], limit: usize) -> Vec<StatePerformance> {
    let mut by_state: HashMap<String, (usize, usize)> = HashMap::new();
    for call in calls {
        let state = call.state.clone().unwrap_or_else(|| "Unknown".to_string());
        let entry = by_state.entry(state).or_default();
        entry.0 += 1;
        if call.csr_conversion {
            entry.1 += 1;
        }
    }
    let mut states: Vec<StatePerformance> = by_state
        .into_iter()
        .map(|(state, (calls, converted))| StatePerformance {
            state,
            calls,
            conversions: converted,
            conversion_rate: percentage(converted as f64, calls as f64),
        })
        .collect();
    states.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.state.cmp(&b.state)));
    states.truncate(limit);
    states
}

#[derive(Debug, Clone, Serialize)]
pub struct SourcePerformance {
    pub source: String,
    pub calls: usize,
    pub answer_rate: f64,
    pub avg_score: f64,
    pub conversions: usize,
    /// Conversions over answered calls, like the headline rate.
    pub conversion_rate: f64,
}

pub fn top_sources(calls: &[CallRecord], limit: usize) -> Vec<SourcePerformance> {
    #[derive(Default)]
    struct Acc {
        calls: usize,
        answered: usize,
        score_total: f64,
        score_count: usize,
        conversions: usize,
    }
    let mut by_source: HashMap<String, Acc> = HashMap::new();
    for call in calls {
        let source = call
            .tracking_source
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        let acc = by_source.entry(source).or_default();
        acc.calls += 1;
        if is_answered(call) {
            acc.answered += 1;
        }
        if let Some(score) = call.csr_call_score {
            acc.score_total += score;
            acc.score_count += 1;
        }
        if call.csr_conversion {
            acc.conversions += 1;
        }
    }
    let mut sources: Vec<SourcePerformance> = by_source
        .into_iter()
        .map(|(source, acc)| SourcePerformance {
            source,
            calls: acc.calls,
            answer_rate: percentage(acc.answered as f64, acc.calls as f64),
            avg_score: if acc.score_count > 0 {
                acc.score_total / acc.score_count as f64
            } else {
                0.0
            },
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.answered as f64),
        })
        .collect();
    sources.sort_by(|a, b| b.calls.cmp(&a.calls).then_with(|| a.source.cmp(&b.source)));
    sources.truncate(limit);
    sources
}
