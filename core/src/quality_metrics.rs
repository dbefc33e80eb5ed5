//! Ingestion data-quality aggregates.
//!
//! Field presence is probed through accessor functions over the record,
//! the same declarative shape the mapper uses for its header table:
//! auditing a field is a data change.

use serde::Serialize;

use crate::metrics::percentage;
use crate::record::CallRecord;

type Presence = fn(&CallRecord) -> bool;

fn text_present(v: &Option<String>) -> bool {
    v.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
}

/// High-value fields whose absence degrades the core dashboards.
const CRITICAL_FIELDS: &[(&str, Presence)] = &[
    ("customer_number", |c| text_present(&c.customer_number)),
    ("call_status", |c| text_present(&c.call_status)),
    ("duration", |c| c.duration.is_some()),
    ("tracking_number", |c| text_present(&c.tracking_number)),
    ("campaign", |c| text_present(&c.campaign)),
    ("source", |c| text_present(&c.source)),
    ("medium", |c| text_present(&c.medium)),
    ("csr_name", |c| text_present(&c.csr_name)),
];

/// Optional-but-valuable enrichment fields.
const ENRICHMENT_FIELDS: &[(&str, Presence)] = &[
    ("city", |c| text_present(&c.city)),
    ("state", |c| text_present(&c.state)),
    ("csr_call_score", |c| c.csr_call_score.is_some()),
    ("keyword", |c| text_present(&c.keyword)),
    ("device", |c| text_present(&c.device)),
    ("browser", |c| text_present(&c.browser)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPriority {
    High,
    Medium,
    Low,
}

/// Audited field list for the completeness table.
const AUDITED_FIELDS: &[(&str, &str, FieldPriority, Presence)] = &[
    ("customer_number", "Call Info", FieldPriority::High, |c| {
        text_present(&c.customer_number)
    }),
    ("call_status", "Call Info", FieldPriority::High, |c| {
        text_present(&c.call_status)
    }),
    ("duration", "Call Info", FieldPriority::High, |c| {
        c.duration.is_some()
    }),
    ("talk_time", "Call Info", FieldPriority::High, |c| {
        c.talk_time.is_some()
    }),
    ("datetime", "Call Info", FieldPriority::High, |c| {
        c.datetime.is_some()
    }),
    ("tracking_number", "Marketing", FieldPriority::High, |c| {
        text_present(&c.tracking_number)
    }),
    ("tracking_source", "Marketing", FieldPriority::High, |c| {
        text_present(&c.tracking_source)
    }),
    ("campaign", "Marketing", FieldPriority::Medium, |c| {
        text_present(&c.campaign)
    }),
    ("medium", "Marketing", FieldPriority::Medium, |c| {
        text_present(&c.medium)
    }),
    ("keyword", "Marketing", FieldPriority::Low, |c| {
        text_present(&c.keyword)
    }),
    ("csr_name", "Agent", FieldPriority::High, |c| {
        text_present(&c.csr_name)
    }),
    ("csr_call_score", "Agent", FieldPriority::Medium, |c| {
        c.csr_call_score.is_some()
    }),
    ("csr_value", "Agent", FieldPriority::Medium, |c| {
        c.csr_value.is_some()
    }),
    ("city", "Geography", FieldPriority::Medium, |c| {
        text_present(&c.city)
    }),
    ("state", "Geography", FieldPriority::Medium, |c| {
        text_present(&c.state)
    }),
    ("postal_code", "Geography", FieldPriority::Low, |c| {
        text_present(&c.postal_code)
    }),
    ("device", "Technical", FieldPriority::Low, |c| {
        text_present(&c.device)
    }),
    ("browser", "Technical", FieldPriority::Low, |c| {
        text_present(&c.browser)
    }),
    ("transcription", "Technical", FieldPriority::Low, |c| {
        text_present(&c.transcription)
    }),
];

fn presence_pct(calls: &[CallRecord], present: Presence) -> f64 {
    let complete = calls.iter().filter(|c| present(c)).count();
    percentage(complete as f64, calls.len() as f64)
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityMetrics {
    pub total_calls: usize,
    pub overall_score: f64,
    pub completeness_score: f64,
    pub validation_score: f64,
    pub enrichment_score: f64,
}

/// Weighted data-quality score: 50% critical-field completeness, 30% row
/// validity, 20% enrichment coverage.
pub fn quality_metrics(calls: &[CallRecord]) -> QualityMetrics {
    let total_calls = calls.len();
    if total_calls == 0 {
        return QualityMetrics {
            total_calls: 0,
            overall_score: 0.0,
            completeness_score: 0.0,
            validation_score: 0.0,
            enrichment_score: 0.0,
        };
    }

    let completeness_score = CRITICAL_FIELDS
        .iter()
        .map(|(_, present)| presence_pct(calls, *present))
        .sum::<f64>()
        / CRITICAL_FIELDS.len() as f64;

    let valid = calls
        .iter()
        .filter(|c| {
            c.duration.is_some()
                && c.call_status.is_some()
                && (c.date.is_some() || c.datetime.is_some())
        })
        .count();
    let validation_score = percentage(valid as f64, total_calls as f64);

    let enrichment_score = ENRICHMENT_FIELDS
        .iter()
        .map(|(_, present)| presence_pct(calls, *present))
        .sum::<f64>()
        / ENRICHMENT_FIELDS.len() as f64;

    QualityMetrics {
        total_calls,
        overall_score: completeness_score * 0.5 + validation_score * 0.3 + enrichment_score * 0.2,
        completeness_score,
        validation_score,
        enrichment_score,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldCompleteness {
    pub field: String,
    pub category: String,
    pub total: usize,
    pub complete: usize,
    pub completeness: f64,
    pub priority: FieldPriority,
}

pub fn field_completeness(calls: &[CallRecord]) -> Vec<FieldCompleteness> {
    AUDITED_FIELDS
        .iter()
        .map(|(field, category, priority, present)| {
            let complete = calls.iter().filter(|c| present(c)).count();
            FieldCompleteness {
                field: field.to_string(),
                category: category.to_string(),
                total: calls.len(),
                complete,
                completeness: percentage(complete as f64, calls.len() as f64),
                priority: *priority,
            }
        })
        .collect()
}
