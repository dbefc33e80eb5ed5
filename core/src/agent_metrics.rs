//! Agent roster aggregates.
//!
//! These run over agent-bearing calls only (the caller filters on the
//! agent field being present); names are trimmed before grouping so the
//! same agent with stray whitespace rolls up once.

use serde::Serialize;
use std::collections::HashMap;

use crate::metrics::{call_value, percentage};
use crate::record::CallRecord;

fn trimmed_agent(call: &CallRecord) -> Option<String> {
    call.agent
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub total_agents: usize,
    pub total_calls: usize,
    pub total_conversions: usize,
    pub avg_conversion_rate: f64,
    pub avg_call_score: f64,
    /// Mean duration across all agent calls, absent durations as zero.
    pub avg_handle_time: f64,
    pub top_agent: String,
}

pub fn agent_summary(calls: &[CallRecord]) -> AgentSummary {
    let agent_calls: Vec<&CallRecord> = calls
        .iter()
        .filter(|c| trimmed_agent(c).is_some())
        .collect();

    let mut conversions_by_agent: HashMap<String, usize> = HashMap::new();
    let mut converted = 0usize;
    let mut score_total = 0.0;
    let mut scored = 0usize;
    let mut duration_total = 0.0;

    for call in &agent_calls {
        let agent = trimmed_agent(call).unwrap_or_default();
        let entry = conversions_by_agent.entry(agent).or_default();
        if call.csr_conversion {
            *entry += 1;
            converted += 1;
        }
        if let Some(score) = call.csr_call_score {
            score_total += score;
            scored += 1;
        }
        duration_total += f64::from(call.duration.unwrap_or(0));
    }

    let top_agent = conversions_by_agent
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(agent, _)| agent.clone())
        .unwrap_or_else(|| "N/A".to_string());

    AgentSummary {
        total_agents: conversions_by_agent.len(),
        total_calls: agent_calls.len(),
        total_conversions: converted,
        avg_conversion_rate: percentage(converted as f64, agent_calls.len() as f64),
        avg_call_score: if scored > 0 {
            score_total / scored as f64
        } else {
            0.0
        },
        avg_handle_time: if agent_calls.is_empty() {
            0.0
        } else {
            duration_total / agent_calls.len() as f64
        },
        top_agent,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentLeaderboardRow {
    pub agent: String,
    pub calls: usize,
    pub conversions: usize,
    pub conversion_rate: f64,
    pub revenue: f64,
    pub avg_call_score: f64,
    pub avg_duration: f64,
    pub avg_talk_time: f64,
    pub avg_ring_time: f64,
    pub answer_rate: f64,
    pub rank: usize,
}

/// Full leaderboard ranked by conversions. Averages for duration, talk and
/// ring time are over all of the agent's calls with absent values as zero;
/// the call score averages over scored calls only.
pub fn agent_leaderboard(calls: &[CallRecord]) -> Vec<AgentLeaderboardRow> {
    #[derive(Default)]
    struct Acc {
        calls: usize,
        conversions: usize,
        revenue: f64,
        score_total: f64,
        scored: usize,
        duration_total: f64,
        talk_total: f64,
        ring_total: f64,
        answered: usize,
    }
    let mut by_agent: HashMap<String, Acc> = HashMap::new();
    for call in calls {
        let Some(agent) = trimmed_agent(call) else {
            continue;
        };
        let acc = by_agent.entry(agent).or_default();
        acc.calls += 1;
        if call.csr_conversion {
            acc.conversions += 1;
        }
        acc.revenue += call_value(call);
        if let Some(score) = call.csr_call_score {
            acc.score_total += score;
            acc.scored += 1;
        }
        acc.duration_total += f64::from(call.duration.unwrap_or(0));
        acc.talk_total += f64::from(call.talk_time.unwrap_or(0));
        acc.ring_total += f64::from(call.ring_time.unwrap_or(0));
        if call.call_status.as_deref() == Some("answered") {
            acc.answered += 1;
        }
    }

    let mut rows: Vec<AgentLeaderboardRow> = by_agent
        .into_iter()
        .map(|(agent, acc)| {
            let calls_f = acc.calls as f64;
            AgentLeaderboardRow {
                agent,
                calls: acc.calls,
                conversions: acc.conversions,
                conversion_rate: percentage(acc.conversions as f64, calls_f),
                revenue: acc.revenue,
                avg_call_score: if acc.scored > 0 {
                    acc.score_total / acc.scored as f64
                } else {
                    0.0
                },
                avg_duration: if acc.calls > 0 {
                    acc.duration_total / calls_f
                } else {
                    0.0
                },
                avg_talk_time: if acc.calls > 0 {
                    acc.talk_total / calls_f
                } else {
                    0.0
                },
                avg_ring_time: if acc.calls > 0 {
                    acc.ring_total / calls_f
                } else {
                    0.0
                },
                answer_rate: percentage(acc.answered as f64, calls_f),
                rank: 0,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.conversions
            .cmp(&a.conversions)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}
