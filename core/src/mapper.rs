//! Vendor CSV field mapper.
//!
//! Maps one raw export row (string-keyed by the vendor's human-readable
//! column headers) onto a normalized [`CallRecord`]. Pure and side-effect
//! free: no I/O, no persistence awareness.
//!
//! RULES:
//!   - The only required column is the call identifier ("CallId" or
//!     "Call Id"). A row without it maps to None.
//!   - Every coercion is independently fallible and falls back to absent.
//!     A bad cell never rejects the row, and nothing here panics.
//!   - Booleans are the exception: they default to false, never absent.
//!   - Plain text columns flow through the TEXT_FIELDS table below; adding
//!     one is a data change, not a code change.

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;

use crate::record::CallRecord;

// ── Header index ─────────────────────────────────────────────────────────────

/// Column positions for one parsed header row.
pub struct HeaderIndex {
    by_name: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &StringRecord) -> Self {
        let by_name = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();
        Self { by_name }
    }
}

/// One data row viewed through the header index.
/// Missing columns and empty cells both read as absent.
struct RowView<'a> {
    index: &'a HeaderIndex,
    record: &'a StringRecord,
}

impl<'a> RowView<'a> {
    fn raw(&self, header: &str) -> Option<&'a str> {
        let i = *self.index.by_name.get(header)?;
        let cell = self.record.get(i)?;
        if cell.is_empty() {
            None
        } else {
            Some(cell)
        }
    }

    fn first_of(&self, headers: &[&str]) -> Option<&'a str> {
        headers.iter().find_map(|h| self.raw(h))
    }

    fn text(&self, header: &str) -> Option<String> {
        self.raw(header).map(str::to_string)
    }
}

// ── Coercions ────────────────────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// "HH:MM:SS", "MM:SS", or bare integer seconds.
pub fn parse_duration(value: &str) -> Option<u32> {
    let v = value.trim();
    if v.contains(':') {
        let parts: Vec<u32> = v
            .split(':')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .ok()?;
        return match parts.as_slice() {
            [h, m, s] => h
                .checked_mul(3600)
                .and_then(|hs| m.checked_mul(60).map(|ms| (hs, ms)))
                .and_then(|(hs, ms)| hs.checked_add(ms))
                .and_then(|t| t.checked_add(*s)),
            [m, s] => m.checked_mul(60).and_then(|ms| ms.checked_add(*s)),
            _ => None,
        };
    }
    v.parse::<u32>().ok()
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let v = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(v, fmt) {
            return Some(dt);
        }
    }
    // A bare date is a valid timestamp at midnight.
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(v, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(v, fmt) {
            return Some(d);
        }
    }
    parse_datetime(v).map(|dt| dt.date())
}

/// Case-insensitive member of {"true", "yes", "1"}; anything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Comma-split, trimmed, empties removed. Absent input maps to an empty
/// list at the call sites, never to an absent list.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best-effort embedded JSON; malformed input is absent, not an error.
pub fn parse_json(value: &str) -> Option<serde_json::Value> {
    serde_json::from_str(value).ok()
}

// ── Declarative text-column table ────────────────────────────────────────────

type TextSlot = fn(&mut CallRecord) -> &mut Option<String>;

/// Vendor header → pass-through text field. Typed columns (durations,
/// dates, numbers, booleans, lists, JSON) and alternate-spelling columns
/// are handled explicitly in [`map_row`].
const TEXT_FIELDS: &[(&str, TextSlot)] = &[
    // customer
    ("Name", |c| &mut c.name),
    ("Customer #", |c| &mut c.customer_number),
    ("Email", |c| &mut c.email),
    ("Phone Type", |c| &mut c.phone_type),
    ("Carrier", |c| &mut c.carrier),
    ("Gender", |c| &mut c.gender),
    ("Name Type", |c| &mut c.name_type),
    // call facts
    ("Call Status", |c| &mut c.call_status),
    ("Direction", |c| &mut c.direction),
    ("Likelihood", |c| &mut c.likelihood),
    ("Message Body", |c| &mut c.message_body),
    ("Day", |c| &mut c.day),
    // geography
    ("Street", |c| &mut c.street),
    ("City", |c| &mut c.city),
    ("State", |c| &mut c.state),
    ("Postal Code", |c| &mut c.postal_code),
    ("Country", |c| &mut c.country),
    ("Visitor IP", |c| &mut c.visitor_ip),
    // marketing attribution
    ("Tracking Source", |c| &mut c.tracking_source),
    ("Tracking # Label", |c| &mut c.tracking_number_label),
    ("campaign", |c| &mut c.campaign),
    ("source", |c| &mut c.source),
    ("medium", |c| &mut c.medium),
    ("keyword", |c| &mut c.keyword),
    ("Search Query", |c| &mut c.search_query),
    ("Referral Page", |c| &mut c.referral_page),
    ("Last URL", |c| &mut c.last_url),
    // ad network
    ("ad_match_type", |c| &mut c.ad_match_type),
    ("ad_content", |c| &mut c.ad_content),
    ("ad_slot", |c| &mut c.ad_slot),
    ("ad_slot_position", |c| &mut c.ad_slot_position),
    ("ad_network", |c| &mut c.ad_network),
    ("creative_id", |c| &mut c.creative_id),
    ("campaign_id", |c| &mut c.campaign_id),
    ("ad_format", |c| &mut c.ad_format),
    ("ad_targeting_type", |c| &mut c.ad_targeting_type),
    ("ad_placement", |c| &mut c.ad_placement),
    ("Google Click ID", |c| &mut c.google_click_id),
    ("Google UID", |c| &mut c.google_uid),
    ("MS Click ID", |c| &mut c.ms_click_id),
    // CSR / agent
    ("CSR Name", |c| &mut c.csr_name),
    ("Agent", |c| &mut c.agent),
    // technical
    ("Browser", |c| &mut c.browser),
    ("Device", |c| &mut c.device),
    ("Receiving Number", |c| &mut c.receiving_number),
    ("Call Path", |c| &mut c.call_path),
    ("First Transfer Point", |c| &mut c.first_transfer_point),
    ("Menu Key Press", |c| &mut c.menu_key_press),
    // recordings
    ("Audio Wav", |c| &mut c.audio_wav),
    ("Audio MP3", |c| &mut c.audio_mp3),
    ("transcription_language", |c| &mut c.transcription_language),
    ("Summary", |c| &mut c.summary),
    // additional
    ("Visitor SID", |c| &mut c.visitor_sid),
    ("Form", |c| &mut c.form),
    ("Form Name", |c| &mut c.form_name),
    ("Source Tag", |c| &mut c.source_tag),
    // demographic enrichment
    ("extended_lookup.age", |c| &mut c.lookup_age),
    ("extended_lookup.education", |c| &mut c.lookup_education),
    ("extended_lookup.home_owner_status", |c| {
        &mut c.lookup_home_owner_status
    }),
    ("extended_lookup.length_of_residence", |c| {
        &mut c.lookup_length_of_residence
    }),
    ("extended_lookup.household_income", |c| {
        &mut c.lookup_household_income
    }),
    ("extended_lookup.marital_status", |c| {
        &mut c.lookup_marital_status
    }),
    ("extended_lookup.market_value", |c| &mut c.lookup_market_value),
    ("extended_lookup.occupation", |c| &mut c.lookup_occupation),
    ("extended_lookup.presence_of_children", |c| {
        &mut c.lookup_presence_of_children
    }),
    ("extended_lookup.facebook", |c| &mut c.lookup_facebook),
    ("extended_lookup.linkedin", |c| &mut c.lookup_linkedin),
    ("extended_lookup.twitter", |c| &mut c.lookup_twitter),
    // experiments
    ("Unbounce Variant", |c| &mut c.unbounce_variant),
    // metadata
    ("Notes", |c| &mut c.notes),
];

// ── Row mapping ──────────────────────────────────────────────────────────────

/// Map one data row. None iff the call identifier is missing — the caller
/// records the rejection and keeps going.
pub fn map_row(index: &HeaderIndex, record: &StringRecord) -> Option<CallRecord> {
    let view = RowView { index, record };

    let call_id = view.first_of(&["CallId", "Call Id"])?.to_string();

    let mut call = CallRecord {
        call_id,
        ..CallRecord::default()
    };

    for (header, slot) in TEXT_FIELDS {
        *slot(&mut call) = view.text(header);
    }

    // Alternate header spellings.
    call.ad_group_id = view
        .first_of(&["ad_group_id", "adgroup_id"])
        .map(str::to_string);
    call.transcription = view
        .first_of(&["Transcription", "transcript"])
        .map(str::to_string);

    // The caller-side phone and the tracking number share one vendor column.
    call.phone = view.text("Tracking #");
    call.tracking_number = view.text("Tracking #");

    // Durations.
    call.duration = view.raw("Duration").and_then(parse_duration);
    call.ring_time = view.raw("Ring Time").and_then(parse_duration);
    call.talk_time = view.raw("Talk Time").and_then(parse_duration);

    // Temporal.
    call.datetime = view.raw("DateTime").and_then(parse_datetime);
    call.date = view.raw("Date").and_then(parse_date);
    call.hour_of_day = view.raw("Hour of Day").and_then(parse_number);

    // Booleans.
    call.blocked = view.raw("Blocked").map(parse_bool).unwrap_or(false);
    call.mobile = view.raw("Mobile").map(parse_bool).unwrap_or(false);
    call.csr_conversion = view
        .raw("CSR Conversion")
        .map(parse_bool)
        .unwrap_or(false);
    call.user_accessed_recording = view
        .raw("User Accessed Recording")
        .map(parse_bool)
        .unwrap_or(false);

    // Numbers.
    call.csr_call_score = view.raw("CSR Call Score").and_then(parse_number);
    call.csr_value = view.raw("CSR Value").and_then(parse_number);
    call.transcription_confidence = view
        .raw("transcription_confidence")
        .and_then(parse_number);

    // Delimited lists.
    call.all_transfer_points = view
        .raw("All Transfer Points")
        .map(parse_list)
        .unwrap_or_default();
    call.keyword_spotting = view
        .raw("Keyword Spotting")
        .map(parse_list)
        .unwrap_or_default();
    call.experiments = view.raw("Experiments").map(parse_list).unwrap_or_default();
    call.variations = view.raw("Variations").map(parse_list).unwrap_or_default();
    call.vwo_experiments = view
        .raw("VWO Experiments")
        .map(parse_list)
        .unwrap_or_default();
    call.vwo_variations = view
        .raw("VWO Variations")
        .map(parse_list)
        .unwrap_or_default();
    call.tags = view.raw("Tags").map(parse_list).unwrap_or_default();

    // Embedded JSON.
    call.custom_fields = view.raw("CustomFields").and_then(parse_json);
    call.custom_variables = view.raw("Custom Variables").and_then(parse_json);
    call.chat_messages = view.raw("Chat Messages").and_then(parse_json);

    Some(call)
}
