//! Call-record persistence: batched upsert and filtered reads.
//!
//! RULE: the call_record table is wide (100 columns), so one canonical
//! column list drives the INSERT and SELECT statements, the parameter
//! builder pushes in that same order, and reads walk the row through a
//! column cursor. Any new column touches all three.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

use super::CallStore;
use crate::error::DashResult;
use crate::filter::{filter_sql, format_timestamp, DashboardFilter};
use crate::mapper::{parse_date, parse_datetime};
use crate::record::CallRecord;
use crate::types::TenantId;

/// Canonical column order. Must match migrations/001_foundation.sql.
const COLUMNS: [&str; 100] = [
    "id",
    "tenant_id",
    "call_id",
    // customer
    "name",
    "customer_number",
    "email",
    "phone",
    "phone_type",
    "carrier",
    "gender",
    "name_type",
    // call facts
    "call_status",
    "direction",
    "duration",
    "ring_time",
    "talk_time",
    "likelihood",
    "message_body",
    "blocked",
    // temporal
    "datetime",
    "date",
    "day",
    "hour_of_day",
    // geography
    "street",
    "city",
    "state",
    "postal_code",
    "country",
    "visitor_ip",
    // marketing attribution
    "tracking_number",
    "tracking_source",
    "tracking_number_label",
    "campaign",
    "source",
    "medium",
    "keyword",
    "search_query",
    "referral_page",
    "last_url",
    // ad network
    "ad_match_type",
    "ad_content",
    "ad_slot",
    "ad_slot_position",
    "ad_network",
    "creative_id",
    "ad_group_id",
    "campaign_id",
    "ad_format",
    "ad_targeting_type",
    "ad_placement",
    "google_click_id",
    "google_uid",
    "ms_click_id",
    // CSR / agent
    "csr_name",
    "csr_call_score",
    "csr_conversion",
    "csr_value",
    "agent",
    // technical
    "browser",
    "device",
    "mobile",
    "receiving_number",
    "call_path",
    "first_transfer_point",
    "all_transfer_points",
    "menu_key_press",
    // recordings
    "audio_wav",
    "audio_mp3",
    "user_accessed_recording",
    "transcription",
    "transcription_language",
    "transcription_confidence",
    "summary",
    // additional
    "visitor_sid",
    "form",
    "form_name",
    "custom_fields",
    "keyword_spotting",
    "source_tag",
    "custom_variables",
    // demographic enrichment
    "lookup_age",
    "lookup_education",
    "lookup_home_owner_status",
    "lookup_length_of_residence",
    "lookup_household_income",
    "lookup_marital_status",
    "lookup_market_value",
    "lookup_occupation",
    "lookup_presence_of_children",
    "lookup_facebook",
    "lookup_linkedin",
    "lookup_twitter",
    // experiments
    "experiments",
    "variations",
    "vwo_experiments",
    "vwo_variations",
    "unbounce_variant",
    // chat
    "chat_messages",
    // metadata
    "tags",
    "notes",
];

fn insert_sql() -> String {
    let placeholders = vec!["?"; COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO call_record ({}) VALUES ({})
         ON CONFLICT(tenant_id, call_id) DO NOTHING",
        COLUMNS.join(", "),
        placeholders
    )
}

fn select_sql(where_clause: &str) -> String {
    format!(
        "SELECT {} FROM call_record WHERE {} ORDER BY datetime DESC",
        COLUMNS.join(", "),
        where_clause
    )
}

// ── Value builders ───────────────────────────────────────────────────────────

fn v_text(v: &Option<String>) -> Value {
    match v {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

fn v_seconds(v: Option<u32>) -> Value {
    match v {
        Some(n) => Value::Integer(i64::from(n)),
        None => Value::Null,
    }
}

fn v_real(v: Option<f64>) -> Value {
    match v {
        Some(n) => Value::Real(n),
        None => Value::Null,
    }
}

fn v_bool(v: bool) -> Value {
    Value::Integer(i64::from(v))
}

fn v_datetime(v: Option<NaiveDateTime>) -> Value {
    match v {
        Some(dt) => Value::Text(format_timestamp(dt)),
        None => Value::Null,
    }
}

/// Day-bucketed dates are stored as their midnight timestamp so they sort
/// and compare with the filter bounds.
fn v_date(v: Option<NaiveDate>) -> Value {
    v_datetime(v.map(|d| d.and_time(NaiveTime::MIN)))
}

fn v_list(v: &[String]) -> DashResult<Value> {
    Ok(Value::Text(serde_json::to_string(v)?))
}

fn v_json(v: &Option<serde_json::Value>) -> DashResult<Value> {
    Ok(match v {
        Some(j) => Value::Text(serde_json::to_string(j)?),
        None => Value::Null,
    })
}

/// Parameters for one row, in canonical column order.
fn call_to_params(id: &str, tenant_id: &TenantId, c: &CallRecord) -> DashResult<Vec<Value>> {
    let mut p: Vec<Value> = Vec::with_capacity(COLUMNS.len());
    p.push(Value::Text(id.to_string()));
    p.push(Value::Text(tenant_id.clone()));
    p.push(Value::Text(c.call_id.clone()));
    // customer
    p.push(v_text(&c.name));
    p.push(v_text(&c.customer_number));
    p.push(v_text(&c.email));
    p.push(v_text(&c.phone));
    p.push(v_text(&c.phone_type));
    p.push(v_text(&c.carrier));
    p.push(v_text(&c.gender));
    p.push(v_text(&c.name_type));
    // call facts
    p.push(v_text(&c.call_status));
    p.push(v_text(&c.direction));
    p.push(v_seconds(c.duration));
    p.push(v_seconds(c.ring_time));
    p.push(v_seconds(c.talk_time));
    p.push(v_text(&c.likelihood));
    p.push(v_text(&c.message_body));
    p.push(v_bool(c.blocked));
    // temporal
    p.push(v_datetime(c.datetime));
    p.push(v_date(c.date));
    p.push(v_text(&c.day));
    p.push(v_real(c.hour_of_day));
    // geography
    p.push(v_text(&c.street));
    p.push(v_text(&c.city));
    p.push(v_text(&c.state));
    p.push(v_text(&c.postal_code));
    p.push(v_text(&c.country));
    p.push(v_text(&c.visitor_ip));
    // marketing attribution
    p.push(v_text(&c.tracking_number));
    p.push(v_text(&c.tracking_source));
    p.push(v_text(&c.tracking_number_label));
    p.push(v_text(&c.campaign));
    p.push(v_text(&c.source));
    p.push(v_text(&c.medium));
    p.push(v_text(&c.keyword));
    p.push(v_text(&c.search_query));
    p.push(v_text(&c.referral_page));
    p.push(v_text(&c.last_url));
    // ad network
    p.push(v_text(&c.ad_match_type));
    p.push(v_text(&c.ad_content));
    p.push(v_text(&c.ad_slot));
    p.push(v_text(&c.ad_slot_position));
    p.push(v_text(&c.ad_network));
    p.push(v_text(&c.creative_id));
    p.push(v_text(&c.ad_group_id));
    p.push(v_text(&c.campaign_id));
    p.push(v_text(&c.ad_format));
    p.push(v_text(&c.ad_targeting_type));
    p.push(v_text(&c.ad_placement));
    p.push(v_text(&c.google_click_id));
    p.push(v_text(&c.google_uid));
    p.push(v_text(&c.ms_click_id));
    // CSR / agent
    p.push(v_text(&c.csr_name));
    p.push(v_real(c.csr_call_score));
    p.push(v_bool(c.csr_conversion));
    p.push(v_real(c.csr_value));
    p.push(v_text(&c.agent));
    // technical
    p.push(v_text(&c.browser));
    p.push(v_text(&c.device));
    p.push(v_bool(c.mobile));
    p.push(v_text(&c.receiving_number));
    p.push(v_text(&c.call_path));
    p.push(v_text(&c.first_transfer_point));
    p.push(v_list(&c.all_transfer_points)?);
    p.push(v_text(&c.menu_key_press));
    // recordings
    p.push(v_text(&c.audio_wav));
    p.push(v_text(&c.audio_mp3));
    p.push(v_bool(c.user_accessed_recording));
    p.push(v_text(&c.transcription));
    p.push(v_text(&c.transcription_language));
    p.push(v_real(c.transcription_confidence));
    p.push(v_text(&c.summary));
    // additional
    p.push(v_text(&c.visitor_sid));
    p.push(v_text(&c.form));
    p.push(v_text(&c.form_name));
    p.push(v_json(&c.custom_fields)?);
    p.push(v_list(&c.keyword_spotting)?);
    p.push(v_text(&c.source_tag));
    p.push(v_json(&c.custom_variables)?);
    // demographic enrichment
    p.push(v_text(&c.lookup_age));
    p.push(v_text(&c.lookup_education));
    p.push(v_text(&c.lookup_home_owner_status));
    p.push(v_text(&c.lookup_length_of_residence));
    p.push(v_text(&c.lookup_household_income));
    p.push(v_text(&c.lookup_marital_status));
    p.push(v_text(&c.lookup_market_value));
    p.push(v_text(&c.lookup_occupation));
    p.push(v_text(&c.lookup_presence_of_children));
    p.push(v_text(&c.lookup_facebook));
    p.push(v_text(&c.lookup_linkedin));
    p.push(v_text(&c.lookup_twitter));
    // experiments
    p.push(v_list(&c.experiments)?);
    p.push(v_list(&c.variations)?);
    p.push(v_list(&c.vwo_experiments)?);
    p.push(v_list(&c.vwo_variations)?);
    p.push(v_text(&c.unbounce_variant));
    // chat
    p.push(v_json(&c.chat_messages)?);
    // metadata
    p.push(v_list(&c.tags)?);
    p.push(v_text(&c.notes));
    Ok(p)
}

// ── Row reading ──────────────────────────────────────────────────────────────

/// Walks a result row in canonical column order.
struct ColumnCursor<'stmt, 'row> {
    row: &'row rusqlite::Row<'stmt>,
    i: usize,
}

impl<'stmt, 'row> ColumnCursor<'stmt, 'row> {
    fn new(row: &'row rusqlite::Row<'stmt>) -> Self {
        Self { row, i: 0 }
    }

    fn next<T: rusqlite::types::FromSql>(&mut self) -> rusqlite::Result<T> {
        let v = self.row.get(self.i);
        self.i += 1;
        v
    }

    fn text(&mut self) -> rusqlite::Result<Option<String>> {
        self.next()
    }

    fn seconds(&mut self) -> rusqlite::Result<Option<u32>> {
        Ok(self.next::<Option<i64>>()?.map(|v| v as u32))
    }

    fn real(&mut self) -> rusqlite::Result<Option<f64>> {
        self.next()
    }

    fn boolean(&mut self) -> rusqlite::Result<bool> {
        Ok(self.next::<i64>()? != 0)
    }

    fn datetime(&mut self) -> rusqlite::Result<Option<NaiveDateTime>> {
        Ok(self.text()?.as_deref().and_then(parse_datetime))
    }

    fn date(&mut self) -> rusqlite::Result<Option<NaiveDate>> {
        Ok(self.text()?.as_deref().and_then(parse_date))
    }

    fn list(&mut self) -> rusqlite::Result<Vec<String>> {
        Ok(self
            .text()?
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default())
    }

    fn json(&mut self) -> rusqlite::Result<Option<serde_json::Value>> {
        Ok(self.text()?.and_then(|s| serde_json::from_str(&s).ok()))
    }
}

fn call_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CallRecord> {
    let mut col = ColumnCursor::new(row);
    let id: Option<String> = col.text()?;
    let _tenant_id: Option<String> = col.text()?;
    let call_id: String = col.next()?;
    Ok(CallRecord {
        id,
        call_id,
        // customer
        name: col.text()?,
        customer_number: col.text()?,
        email: col.text()?,
        phone: col.text()?,
        phone_type: col.text()?,
        carrier: col.text()?,
        gender: col.text()?,
        name_type: col.text()?,
        // call facts
        call_status: col.text()?,
        direction: col.text()?,
        duration: col.seconds()?,
        ring_time: col.seconds()?,
        talk_time: col.seconds()?,
        likelihood: col.text()?,
        message_body: col.text()?,
        blocked: col.boolean()?,
        // temporal
        datetime: col.datetime()?,
        date: col.date()?,
        day: col.text()?,
        hour_of_day: col.real()?,
        // geography
        street: col.text()?,
        city: col.text()?,
        state: col.text()?,
        postal_code: col.text()?,
        country: col.text()?,
        visitor_ip: col.text()?,
        // marketing attribution
        tracking_number: col.text()?,
        tracking_source: col.text()?,
        tracking_number_label: col.text()?,
        campaign: col.text()?,
        source: col.text()?,
        medium: col.text()?,
        keyword: col.text()?,
        search_query: col.text()?,
        referral_page: col.text()?,
        last_url: col.text()?,
        // ad network
        ad_match_type: col.text()?,
        ad_content: col.text()?,
        ad_slot: col.text()?,
        ad_slot_position: col.text()?,
        ad_network: col.text()?,
        creative_id: col.text()?,
        ad_group_id: col.text()?,
        campaign_id: col.text()?,
        ad_format: col.text()?,
        ad_targeting_type: col.text()?,
        ad_placement: col.text()?,
        google_click_id: col.text()?,
        google_uid: col.text()?,
        ms_click_id: col.text()?,
        // CSR / agent
        csr_name: col.text()?,
        csr_call_score: col.real()?,
        csr_conversion: col.boolean()?,
        csr_value: col.real()?,
        agent: col.text()?,
        // technical
        browser: col.text()?,
        device: col.text()?,
        mobile: col.boolean()?,
        receiving_number: col.text()?,
        call_path: col.text()?,
        first_transfer_point: col.text()?,
        all_transfer_points: col.list()?,
        menu_key_press: col.text()?,
        // recordings
        audio_wav: col.text()?,
        audio_mp3: col.text()?,
        user_accessed_recording: col.boolean()?,
        transcription: col.text()?,
        transcription_language: col.text()?,
        transcription_confidence: col.real()?,
        summary: col.text()?,
        // additional
        visitor_sid: col.text()?,
        form: col.text()?,
        form_name: col.text()?,
        custom_fields: col.json()?,
        keyword_spotting: col.list()?,
        source_tag: col.text()?,
        custom_variables: col.json()?,
        // demographic enrichment
        lookup_age: col.text()?,
        lookup_education: col.text()?,
        lookup_home_owner_status: col.text()?,
        lookup_length_of_residence: col.text()?,
        lookup_household_income: col.text()?,
        lookup_marital_status: col.text()?,
        lookup_market_value: col.text()?,
        lookup_occupation: col.text()?,
        lookup_presence_of_children: col.text()?,
        lookup_facebook: col.text()?,
        lookup_linkedin: col.text()?,
        lookup_twitter: col.text()?,
        // experiments
        experiments: col.list()?,
        variations: col.list()?,
        vwo_experiments: col.list()?,
        vwo_variations: col.list()?,
        unbounce_variant: col.text()?,
        // chat
        chat_messages: col.json()?,
        // metadata
        tags: col.list()?,
        notes: col.text()?,
    })
}

// ── Filter options ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize)]
pub struct DimensionOption {
    pub value: String,
    pub count: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FilterOptions {
    pub brands: Vec<DimensionOption>,
    pub sources: Vec<DimensionOption>,
    pub campaigns: Vec<DimensionOption>,
    pub statuses: Vec<DimensionOption>,
    pub agents: Vec<DimensionOption>,
    pub states: Vec<DimensionOption>,
    pub cities: Vec<DimensionOption>,
    pub directions: Vec<DimensionOption>,
}

// ── Store methods ────────────────────────────────────────────────────────────

impl CallStore {
    /// Insert one batch inside a single transaction.
    ///
    /// Duplicate `(tenant_id, call_id)` rows are silently skipped by the
    /// conflict clause; the return value counts rows actually inserted.
    pub fn insert_calls_batch(
        &self,
        tenant_id: &TenantId,
        calls: &[CallRecord],
    ) -> DashResult<usize> {
        let tx = self.conn().unchecked_transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare_cached(&insert_sql())?;
            for call in calls {
                let id = Uuid::new_v4().to_string();
                let values = call_to_params(&id, tenant_id, call)?;
                inserted += stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// All records matching the filter, newest first.
    pub fn fetch_calls(
        &self,
        tenant_id: &TenantId,
        filter: &DashboardFilter,
    ) -> DashResult<Vec<CallRecord>> {
        let (where_clause, values) = filter_sql(tenant_id, filter);
        let mut stmt = self.conn().prepare(&select_sql(&where_clause))?;
        let rows = stmt.query_map(params_from_iter(values), call_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Current-period records plus the immediately preceding period of
    /// equal length under the same categorical constraints.
    pub fn fetch_calls_with_comparison(
        &self,
        tenant_id: &TenantId,
        filter: &DashboardFilter,
    ) -> DashResult<(Vec<CallRecord>, Vec<CallRecord>)> {
        let current = self.fetch_calls(tenant_id, filter)?;
        let previous = self.fetch_calls(tenant_id, &filter.previous_period())?;
        Ok((current, previous))
    }

    pub fn call_count(&self, tenant_id: &TenantId) -> DashResult<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM call_record WHERE tenant_id = ?1",
                params![tenant_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    fn dimension_options(
        &self,
        tenant_id: &TenantId,
        column: &str,
    ) -> DashResult<Vec<DimensionOption>> {
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM call_record
             WHERE tenant_id = ?1 AND {column} IS NOT NULL
             GROUP BY {column}
             ORDER BY COUNT(*) DESC
             LIMIT 100"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![tenant_id], |row| {
            Ok(DimensionOption {
                value: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Distinct values (with counts) available for each filter dimension.
    pub fn filter_options(&self, tenant_id: &TenantId) -> DashResult<FilterOptions> {
        Ok(FilterOptions {
            brands: self.dimension_options(tenant_id, "receiving_number")?,
            sources: self.dimension_options(tenant_id, "tracking_source")?,
            campaigns: self.dimension_options(tenant_id, "campaign")?,
            statuses: self.dimension_options(tenant_id, "call_status")?,
            agents: self.dimension_options(tenant_id, "agent")?,
            states: self.dimension_options(tenant_id, "state")?,
            cities: self.dimension_options(tenant_id, "city")?,
            directions: self.dimension_options(tenant_id, "direction")?,
        })
    }
}
