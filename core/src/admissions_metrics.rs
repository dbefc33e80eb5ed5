//! Admissions view aggregates.
//!
//! Denominator conventions for this view: a qualified lead is any call
//! scored >= 3.0; the qualification rate is qualified over total, and the
//! conversion rate is conversions over QUALIFIED leads.

use serde::Serialize;
use std::collections::HashMap;

use crate::metrics::{agent_label, call_value, conversions, percentage, total_value, trend};
use crate::record::CallRecord;

const QUALIFIED_SCORE: f64 = 3.0;

fn is_qualified(call: &CallRecord) -> bool {
    call.csr_call_score
        .map(|s| s >= QUALIFIED_SCORE)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize)]
pub struct AdmissionsTrends {
    pub inquiries_trend: f64,
    pub qualified_trend: f64,
    pub conversions_trend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdmissionsMetrics {
    pub total_inquiries: usize,
    pub qualified_leads: usize,
    pub conversions: usize,
    pub qualification_rate: f64,
    /// Conversions over qualified leads.
    pub conversion_rate: f64,
    pub avg_call_score: f64,
    pub avg_talk_time: f64,
    pub total_value: f64,
    pub trends: AdmissionsTrends,
}

pub fn admissions_metrics(current: &[CallRecord], previous: &[CallRecord]) -> AdmissionsMetrics {
    let total_inquiries = current.len();
    let qualified_leads = current.iter().filter(|c| is_qualified(c)).count();
    let converted = conversions(current);

    // Scores average over scored calls only; talk time over calls that
    // actually talked. Absent values leave both numerator and denominator.
    let scores: Vec<f64> = current.iter().filter_map(|c| c.csr_call_score).collect();
    let avg_call_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let talk_times: Vec<f64> = current
        .iter()
        .filter_map(|c| c.talk_time)
        .filter(|&t| t > 0)
        .map(f64::from)
        .collect();
    let avg_talk_time = if talk_times.is_empty() {
        0.0
    } else {
        talk_times.iter().sum::<f64>() / talk_times.len() as f64
    };

    let prev_inquiries = previous.len();
    let prev_qualified = previous.iter().filter(|c| is_qualified(c)).count();
    let prev_converted = conversions(previous);

    AdmissionsMetrics {
        total_inquiries,
        qualified_leads,
        conversions: converted,
        qualification_rate: percentage(qualified_leads as f64, total_inquiries as f64),
        conversion_rate: percentage(converted as f64, qualified_leads as f64),
        avg_call_score,
        avg_talk_time,
        total_value: total_value(current),
        trends: AdmissionsTrends {
            inquiries_trend: trend(total_inquiries as f64, prev_inquiries as f64),
            qualified_trend: trend(qualified_leads as f64, prev_qualified as f64),
            conversions_trend: trend(converted as f64, prev_converted as f64),
        },
    }
}

// ── Agent performance ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AgentPerformance {
    pub agent: String,
    pub calls: usize,
    pub avg_score: f64,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub avg_talk_time: f64,
    pub total_value: f64,
}

pub fn agent_performance(calls: &[CallRecord], limit: usize) -> Vec<AgentPerformance> {
    #[derive(Default)]
    struct Acc {
        calls: usize,
        score_total: f64,
        scored: usize,
        conversions: usize,
        talk_total: f64,
        talked: usize,
        value: f64,
    }
    let mut by_agent: HashMap<String, Acc> = HashMap::new();
    for call in calls {
        let acc = by_agent.entry(agent_label(call)).or_default();
        acc.calls += 1;
        if let Some(score) = call.csr_call_score {
            acc.score_total += score;
            acc.scored += 1;
        }
        if call.csr_conversion {
            acc.conversions += 1;
        }
        if let Some(talk) = call.talk_time.filter(|&t| t > 0) {
            acc.talk_total += f64::from(talk);
            acc.talked += 1;
        }
        acc.value += call_value(call);
    }
    let mut rows: Vec<AgentPerformance> = by_agent
        .into_iter()
        .map(|(agent, acc)| AgentPerformance {
            agent,
            calls: acc.calls,
            avg_score: if acc.scored > 0 {
                acc.score_total / acc.scored as f64
            } else {
                0.0
            },
            conversions: acc.conversions,
            conversion_rate: percentage(acc.conversions as f64, acc.calls as f64),
            avg_talk_time: if acc.talked > 0 {
                acc.talk_total / acc.talked as f64
            } else {
                0.0
            },
            total_value: acc.value,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.conversions
            .cmp(&a.conversions)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    rows.truncate(limit);
    rows
}

// ── Score breakdown ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub score_range: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    /// Share of scored calls, not of all calls.
    pub percentage: f64,
}

const SCORE_RANGES: [(&str, f64, f64); 5] = [
    ("4.5 - 5.0 (Excellent)", 4.5, 5.0),
    ("4.0 - 4.4 (Very Good)", 4.0, 4.4),
    ("3.0 - 3.9 (Good)", 3.0, 3.9),
    ("2.0 - 2.9 (Fair)", 2.0, 2.9),
    ("0.0 - 1.9 (Poor)", 0.0, 1.9),
];

/// Fine-grained score distribution. Buckets with zero calls are omitted
/// here (the overview keeps them — intentional per-view asymmetry), and an
/// input with no scored calls yields an empty breakdown.
pub fn score_breakdown(calls: &[CallRecord]) -> Vec<ScoreBreakdown> {
    let scored: Vec<&CallRecord> = calls
        .iter()
        .filter(|c| c.csr_call_score.is_some())
        .collect();
    if scored.is_empty() {
        return Vec::new();
    }
    let total = scored.len();

    SCORE_RANGES
        .iter()
        .filter_map(|(label, min, max)| {
            let in_range: Vec<&&CallRecord> = scored
                .iter()
                .filter(|c| {
                    c.csr_call_score
                        .map(|s| s >= *min && s <= *max)
                        .unwrap_or(false)
                })
                .collect();
            if in_range.is_empty() {
                return None;
            }
            let converted = in_range.iter().filter(|c| c.csr_conversion).count();
            Some(ScoreBreakdown {
                score_range: label.to_string(),
                calls: in_range.len(),
                conversions: converted,
                conversion_rate: percentage(converted as f64, in_range.len() as f64),
                percentage: percentage(in_range.len() as f64, total as f64),
            })
        })
        .collect()
}

// ── Funnel ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FunnelStage {
    pub stage: String,
    pub count: usize,
    /// Relative to the FIRST stage, not the previous one.
    pub percentage: f64,
}

pub fn conversion_funnel(calls: &[CallRecord]) -> Vec<FunnelStage> {
    let total_inquiries = calls.len();
    if total_inquiries == 0 {
        return Vec::new();
    }
    let qualified = calls.iter().filter(|c| is_qualified(c)).count();
    let converted = conversions(calls);

    vec![
        FunnelStage {
            stage: "Total Inquiries".to_string(),
            count: total_inquiries,
            percentage: 100.0,
        },
        FunnelStage {
            stage: "Qualified Leads".to_string(),
            count: qualified,
            percentage: percentage(qualified as f64, total_inquiries as f64),
        },
        FunnelStage {
            stage: "Admissions".to_string(),
            count: converted,
            percentage: percentage(converted as f64, total_inquiries as f64),
        },
    ]
}

// ── Hourly performance ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct HourlyPerformance {
    pub hour: String,
    pub calls: usize,
    pub avg_score: f64,
    pub conversions: usize,
}

/// Business hours 9AM–5PM, every slot present even when empty. The hour
/// comes from `datetime`; undated calls don't participate.
pub fn hourly_performance(calls: &[CallRecord]) -> Vec<HourlyPerformance> {
    use chrono::Timelike;

    #[derive(Default)]
    struct Acc {
        calls: usize,
        score_total: f64,
        scored: usize,
        conversions: usize,
    }
    let mut by_hour: HashMap<u32, Acc> = HashMap::new();
    for call in calls {
        let Some(dt) = call.datetime else { continue };
        let acc = by_hour.entry(dt.hour()).or_default();
        acc.calls += 1;
        if let Some(score) = call.csr_call_score {
            acc.score_total += score;
            acc.scored += 1;
        }
        if call.csr_conversion {
            acc.conversions += 1;
        }
    }

    (9..=17)
        .map(|hour| {
            let acc = by_hour.remove(&hour).unwrap_or_default();
            let twelve = if hour % 12 == 0 { 12 } else { hour % 12 };
            let suffix = if hour >= 12 { "PM" } else { "AM" };
            HourlyPerformance {
                hour: format!("{twelve}{suffix}"),
                calls: acc.calls,
                avg_score: if acc.scored > 0 {
                    acc.score_total / acc.scored as f64
                } else {
                    0.0
                },
                conversions: acc.conversions,
            }
        })
        .collect()
}

// ── States ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StatePerformance {
    pub state: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
}

/// Stateless calls are excluded; ranked by conversion rate, not volume.
pub fn top_performing_states(calls: &[CallRecord], limit: usize) -> Vec<StatePerformance> {
    let mut by_state: HashMap<String, (usize, usize)> = HashMap::new();
    for call in calls {
        let Some(state) = call.state.clone() else {
            continue;
        };
        let entry = by_state.entry(state).or_default();
        entry.0 += 1;
        if call.csr_conversion {
            entry.1 += 1;
        }
    }
    let mut rows: Vec<StatePerformance> = by_state
        .into_iter()
        .map(|(state, (calls, converted))| StatePerformance {
            state,
            calls,
            conversions: converted,
            conversion_rate: percentage(converted as f64, calls as f64),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.conversion_rate
            .partial_cmp(&a.conversion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.state.cmp(&b.state))
    });
    rows.truncate(limit);
    rows
}
