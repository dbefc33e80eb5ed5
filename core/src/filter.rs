//! Dashboard filters and their translation into a store predicate.
//!
//! A filter is a request-scoped value: a required date range, optional
//! categorical multi-selects (empty means "no filter", not "match
//! nothing"), and an optional score range where either bound may be
//! omitted independently.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Value;
use std::collections::HashMap;

use crate::types::TenantId;

/// Day-granular inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Bounds at 00:00:00.000 of the start day and 23:59:59.999 of the
    /// end day.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.start.and_time(NaiveTime::MIN);
        let end = self
            .end
            .and_hms_milli_opt(23, 59, 59, 999)
            .expect("23:59:59.999 is a valid time of day");
        (start, end)
    }

    /// Number of calendar days covered, inclusive.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The immediately preceding window of equal length.
    pub fn previous(&self) -> DateRange {
        let len = Duration::days(self.len_days());
        DateRange {
            start: self.start - len,
            end: self.end - len,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFilter {
    pub date_range: DateRange,
    /// Brand selection filters on the receiving number.
    pub brands: Vec<String>,
    pub sources: Vec<String>,
    pub campaigns: Vec<String>,
    pub statuses: Vec<String>,
    pub agents: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub directions: Vec<String>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
}

impl DashboardFilter {
    /// A filter constraining nothing but the date range.
    pub fn for_range(date_range: DateRange) -> Self {
        Self {
            date_range,
            brands: Vec::new(),
            sources: Vec::new(),
            campaigns: Vec::new(),
            statuses: Vec::new(),
            agents: Vec::new(),
            states: Vec::new(),
            cities: Vec::new(),
            directions: Vec::new(),
            min_score: None,
            max_score: None,
        }
    }

    /// Parse from URL-style query parameters: comma-separated lists for
    /// multi-selects, ISO dates for the range, numeric strings for score
    /// bounds. Unparseable values fall back to the default / no
    /// constraint.
    pub fn from_query_params(
        params: &HashMap<String, String>,
        default_range: DateRange,
    ) -> Self {
        let list = |key: &str| -> Vec<String> {
            params
                .get(key)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        let number = |key: &str| -> Option<f64> {
            params.get(key).and_then(|v| v.trim().parse().ok())
        };
        let date = |key: &str, default: NaiveDate| -> NaiveDate {
            params
                .get(key)
                .and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
                .unwrap_or(default)
        };

        Self {
            date_range: DateRange::new(
                date("from", default_range.start),
                date("to", default_range.end),
            ),
            brands: list("brands"),
            sources: list("sources"),
            campaigns: list("campaigns"),
            statuses: list("statuses"),
            agents: list("agents"),
            states: list("states"),
            cities: list("cities"),
            directions: list("directions"),
            min_score: number("minScore"),
            max_score: number("maxScore"),
        }
    }

    /// The same filter over the immediately preceding period of equal
    /// length. Only the date bounds move.
    pub fn previous_period(&self) -> Self {
        let mut prev = self.clone();
        prev.date_range = self.date_range.previous();
        prev
    }
}

/// Timestamp format shared by the stored `datetime`/`date` columns and the
/// filter bounds, so lexicographic comparison matches chronological order.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub(crate) fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Build the WHERE clause and its parameters for one tenant + filter.
pub(crate) fn filter_sql(tenant_id: &TenantId, filter: &DashboardFilter) -> (String, Vec<Value>) {
    let (start, end) = filter.date_range.bounds();

    let mut clauses: Vec<String> = vec![
        "tenant_id = ?".into(),
        "date >= ?".into(),
        "date <= ?".into(),
    ];
    let mut params: Vec<Value> = vec![
        Value::Text(tenant_id.clone()),
        Value::Text(format_timestamp(start)),
        Value::Text(format_timestamp(end)),
    ];

    let multi_selects: [(&str, &[String]); 8] = [
        ("receiving_number", &filter.brands),
        ("tracking_source", &filter.sources),
        ("campaign", &filter.campaigns),
        ("call_status", &filter.statuses),
        ("agent", &filter.agents),
        ("state", &filter.states),
        ("city", &filter.cities),
        ("direction", &filter.directions),
    ];
    for (column, values) in multi_selects {
        if values.is_empty() {
            continue;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        clauses.push(format!("{column} IN ({placeholders})"));
        params.extend(values.iter().cloned().map(Value::Text));
    }

    // SQL NULL comparison excludes unscored rows, matching the reference.
    if let Some(min) = filter.min_score {
        clauses.push("csr_call_score >= ?".into());
        params.push(Value::Real(min));
    }
    if let Some(max) = filter.max_score {
        clauses.push("csr_call_score <= ?".into());
        params.push(Value::Real(max));
    }

    (clauses.join(" AND "), params)
}
