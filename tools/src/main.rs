//! dash-runner: headless runner for the call-tracking analytics core.
//!
//! Usage:
//!   dash-runner --db dash.db --tenant org_123 --ingest calls.csv
//!   dash-runner --db dash.db --tenant org_123 --from 2025-01-01 --to 2025-01-31 --view overview
//!
//! Views: overview | marketing | admissions | executive | agents | quality | options

use anyhow::{anyhow, Result};
use calltrack_core::{
    admissions_metrics, agent_metrics, config::UploadConfig, executive_metrics,
    filter::{DashboardFilter, DateRange},
    ingest::parse_csv,
    marketing_metrics, overview_metrics, quality_metrics,
    store::CallStore,
    upload::{check_upload, ingest_records, summarize},
};
use chrono::{Duration, Local, NaiveDate};
use serde_json::json;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_value(&args, "--db").unwrap_or_else(|| ":memory:".to_string());
    let tenant = arg_value(&args, "--tenant").unwrap_or_else(|| "local-dev".to_string());

    let store = CallStore::open(&db)?;
    store.migrate()?;

    if let Some(path) = arg_value(&args, "--ingest") {
        return run_ingest(&store, &tenant, &path);
    }

    let today = Local::now().date_naive();
    let default_range = DateRange::new(today - Duration::days(29), today);
    let from = parse_date_arg(&args, "--from").unwrap_or(default_range.start);
    let to = parse_date_arg(&args, "--to").unwrap_or(default_range.end);
    let view = arg_value(&args, "--view").unwrap_or_else(|| "overview".to_string());

    run_view(&store, &tenant, DateRange::new(from, to), &view)
}

fn run_ingest(store: &CallStore, tenant: &str, path: &str) -> Result<()> {
    let config = UploadConfig::default();
    let metadata = std::fs::metadata(path)?;
    check_upload(path, metadata.len(), &config)?;

    let text = std::fs::read_to_string(path)?;
    let parse = parse_csv(&text);
    log::info!(
        "parsed {}: {} rows, {} valid, {} invalid",
        path,
        parse.total_rows,
        parse.valid_rows,
        parse.invalid_rows
    );
    if !parse.success || parse.calls.is_empty() {
        let detail = json!({
            "error": "Failed to parse CSV",
            "details": parse.errors,
        });
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Err(anyhow!("CSV parse failed for {path}"));
    }

    let report = ingest_records(store, tenant, &parse.calls, &config)?;
    let summary = summarize(&parse, &report);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_view(store: &CallStore, tenant: &str, range: DateRange, view: &str) -> Result<()> {
    let resolved = store.require_tenant(tenant)?;
    let filter = DashboardFilter::for_range(range);
    let (current, previous) = store.fetch_calls_with_comparison(&resolved.id, &filter)?;

    let output = match view {
        "overview" => json!({
            "metrics": overview_metrics::overview_metrics(&current, &previous),
            "call_volume": overview_metrics::call_volume_over_time(&current),
            "conversion_over_time": overview_metrics::conversion_over_time(&current),
            "status_breakdown": overview_metrics::status_breakdown(&current),
            "channel_mix": overview_metrics::channel_mix(&current),
            "score_distribution": overview_metrics::score_distribution(&current),
            "top_states": overview_metrics::top_states(&current, 10),
            "top_sources": overview_metrics::top_sources(&current, 10),
        }),
        "marketing" => json!({
            "metrics": marketing_metrics::marketing_metrics(&current, &previous),
            "campaigns": marketing_metrics::campaign_performance(&current, 10),
            "sources": marketing_metrics::source_performance(&current, 10),
            "mediums": marketing_metrics::medium_breakdown(&current),
            "keywords": marketing_metrics::keyword_performance(&current, 20),
            "trends": marketing_metrics::campaign_trends(&current),
        }),
        "admissions" => json!({
            "metrics": admissions_metrics::admissions_metrics(&current, &previous),
            "agents": admissions_metrics::agent_performance(&current, 10),
            "score_breakdown": admissions_metrics::score_breakdown(&current),
            "funnel": admissions_metrics::conversion_funnel(&current),
            "hourly": admissions_metrics::hourly_performance(&current),
            "top_states": admissions_metrics::top_performing_states(&current, 10),
        }),
        "executive" => json!({
            "metrics": executive_metrics::executive_metrics(&current, &previous),
            "revenue_by_source": executive_metrics::revenue_by_source(&current, 10),
            "daily_trends": executive_metrics::daily_trends(&current),
            "summary": executive_metrics::performance_summary(&current, &previous),
            "revenue_channels": executive_metrics::top_revenue_channels(&current, 6),
        }),
        "agents" => json!({
            "summary": agent_metrics::agent_summary(&current),
            "leaderboard": agent_metrics::agent_leaderboard(&current),
        }),
        "quality" => json!({
            "metrics": quality_metrics::quality_metrics(&current),
            "fields": quality_metrics::field_completeness(&current),
        }),
        "options" => serde_json::to_value(store.filter_options(&resolved.id)?)?,
        other => return Err(anyhow!("unknown view: {other}")),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}

fn parse_date_arg(args: &[String], flag: &str) -> Option<NaiveDate> {
    arg_value(args, flag).and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
}
