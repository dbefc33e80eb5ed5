//! The normalized call record — one tracked phone call for one tenant.
//!
//! Field order mirrors the call_record table in migrations/001_foundation.sql.
//! Everything the vendor export may omit is an Option (or an empty Vec for
//! list columns); booleans default to false, never absent.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::CallId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Store-assigned row id (uuid). None until persisted.
    pub id: Option<String>,
    /// Vendor-assigned identifier, unique per tenant.
    pub call_id: CallId,

    // customer
    pub name: Option<String>,
    pub customer_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_type: Option<String>,
    pub carrier: Option<String>,
    pub gender: Option<String>,
    pub name_type: Option<String>,

    // call facts
    pub call_status: Option<String>,
    pub direction: Option<String>,
    pub duration: Option<u32>,
    pub ring_time: Option<u32>,
    pub talk_time: Option<u32>,
    pub likelihood: Option<String>,
    pub message_body: Option<String>,
    pub blocked: bool,

    // temporal
    pub datetime: Option<NaiveDateTime>,
    pub date: Option<NaiveDate>,
    pub day: Option<String>,
    pub hour_of_day: Option<f64>,

    // geography
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub visitor_ip: Option<String>,

    // marketing attribution
    pub tracking_number: Option<String>,
    pub tracking_source: Option<String>,
    pub tracking_number_label: Option<String>,
    pub campaign: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub keyword: Option<String>,
    pub search_query: Option<String>,
    pub referral_page: Option<String>,
    pub last_url: Option<String>,

    // ad network
    pub ad_match_type: Option<String>,
    pub ad_content: Option<String>,
    pub ad_slot: Option<String>,
    pub ad_slot_position: Option<String>,
    pub ad_network: Option<String>,
    pub creative_id: Option<String>,
    pub ad_group_id: Option<String>,
    pub campaign_id: Option<String>,
    pub ad_format: Option<String>,
    pub ad_targeting_type: Option<String>,
    pub ad_placement: Option<String>,
    pub google_click_id: Option<String>,
    pub google_uid: Option<String>,
    pub ms_click_id: Option<String>,

    // CSR / agent
    pub csr_name: Option<String>,
    pub csr_call_score: Option<f64>,
    pub csr_conversion: bool,
    pub csr_value: Option<f64>,
    pub agent: Option<String>,

    // technical
    pub browser: Option<String>,
    pub device: Option<String>,
    pub mobile: bool,
    pub receiving_number: Option<String>,
    pub call_path: Option<String>,
    pub first_transfer_point: Option<String>,
    pub all_transfer_points: Vec<String>,
    pub menu_key_press: Option<String>,

    // recordings
    pub audio_wav: Option<String>,
    pub audio_mp3: Option<String>,
    pub user_accessed_recording: bool,
    pub transcription: Option<String>,
    pub transcription_language: Option<String>,
    pub transcription_confidence: Option<f64>,
    pub summary: Option<String>,

    // additional
    pub visitor_sid: Option<String>,
    pub form: Option<String>,
    pub form_name: Option<String>,
    pub custom_fields: Option<serde_json::Value>,
    pub keyword_spotting: Vec<String>,
    pub source_tag: Option<String>,
    pub custom_variables: Option<serde_json::Value>,

    // demographic enrichment
    pub lookup_age: Option<String>,
    pub lookup_education: Option<String>,
    pub lookup_home_owner_status: Option<String>,
    pub lookup_length_of_residence: Option<String>,
    pub lookup_household_income: Option<String>,
    pub lookup_marital_status: Option<String>,
    pub lookup_market_value: Option<String>,
    pub lookup_occupation: Option<String>,
    pub lookup_presence_of_children: Option<String>,
    pub lookup_facebook: Option<String>,
    pub lookup_linkedin: Option<String>,
    pub lookup_twitter: Option<String>,

    // experiments
    pub experiments: Vec<String>,
    pub variations: Vec<String>,
    pub vwo_experiments: Vec<String>,
    pub vwo_variations: Vec<String>,
    pub unbounce_variant: Option<String>,

    // chat
    pub chat_messages: Option<serde_json::Value>,

    // metadata
    pub tags: Vec<String>,
    pub notes: Option<String>,
}
