// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.

use leadscout_core::QualityTier;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a lead was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Ai,
    Manual,
    /// An AI draft the operator edited before sending. Counted as manual.
    Edited,
}

impl ResponseType {
    pub fn is_ai(self) -> bool {
        self == Self::Ai
    }
}

/// Fields supplied when persisting a new lead.
///
/// The quality label is not supplied: it is always derived from the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub chat_source: String,
    /// Defaults to `chat_source` when `None`.
    pub chat_title: Option<String>,
    pub sender_id: Option<i64>,
    pub sender_name: String,
    pub message_text: String,
    pub message_id: Option<i64>,
    pub quality_score: i32,
    pub quality_reasons: Vec<String>,
}

/// A persisted lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub chat_source: String,
    pub chat_title: String,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub message_text: String,
    pub message_id: Option<i64>,
    pub quality_score: i32,
    pub quality_label: QualityTier,
    pub quality_reasons: Vec<String>,
    pub created_at: String,
    pub responded: bool,
    pub response_text: Option<String>,
    pub response_timestamp: Option<String>,
    pub response_type: Option<ResponseType>,
    pub forwarded: bool,
    pub forwarded_at: Option<String>,
}

/// Lead counts over a lookback window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadStats {
    pub total_leads: i64,
    pub hot_leads: i64,
    pub good_leads: i64,
    pub normal_leads: i64,
    pub low_quality_leads: i64,
    pub responded: i64,
    /// Percentage of leads answered, rounded to one decimal.
    pub response_rate: f64,
}

/// Aggregate row for one monitored chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSource {
    pub chat_id: String,
    pub chat_name: Option<String>,
    pub chat_type: Option<String>,
    pub active: bool,
    pub leads_count: i64,
    pub last_lead_time: Option<String>,
    pub last_scan_time: Option<String>,
    pub created_at: String,
}

/// Rollup for one calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: String,
    pub total_leads: i64,
    pub hot_leads: i64,
    pub good_leads: i64,
    pub normal_leads: i64,
    pub low_quality_leads: i64,
    pub responses_sent: i64,
    pub ai_responses: i64,
    pub manual_responses: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEfficiency {
    pub total_responses: i64,
    pub ai_responses: i64,
    pub manual_responses: i64,
    pub not_responded: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analytics {
    pub daily_data: Vec<DailyStat>,
    pub response_efficiency: ResponseEfficiency,
}

/// A stored trigger phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub phrase: String,
    pub active: bool,
    pub hits_count: i64,
    pub created_at: String,
    pub last_hit_at: Option<String>,
}

/// Review state of a drafted reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Pending,
    Approved,
    Rejected,
    Sent,
}

/// A drafted reply joined with the lead it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingResponse {
    pub id: i64,
    pub lead_id: i64,
    pub lead_message: String,
    pub quality_label: QualityTier,
    pub chat_source: String,
    pub ai_response: String,
    pub edited_response: Option<String>,
    pub status: ResponseStatus,
    pub created_at: String,
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    String(String),
    Json(serde_json::Value),
}

impl SettingValue {
    /// Name stored in the `type` column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Json(_) => "json",
        }
    }

    /// Text stored in the `value` column.
    pub fn encode(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::String(s) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Rebuilds a value from its stored text and type name.
    ///
    /// Unparseable numbers and JSON fall back to the raw string.
    pub fn decode(value: &str, type_name: &str) -> Self {
        match type_name {
            "bool" => Self::Bool(value.eq_ignore_ascii_case("true")),
            "int" => value
                .parse()
                .map(Self::Int)
                .unwrap_or_else(|_| Self::String(value.to_string())),
            "json" => serde_json::from_str(value)
                .map(Self::Json)
                .unwrap_or_else(|_| Self::String(value.to_string())),
            _ => Self::String(value.to_string()),
        }
    }

    /// Classifies an arbitrary JSON value as submitted by the dashboard.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) if n.is_i64() => {
                n.as_i64().map(Self::Int).unwrap_or(Self::Json(serde_json::Value::Null))
            }
            serde_json::Value::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_type_strings() {
        use std::str::FromStr;
        assert_eq!(ResponseType::Edited.to_string(), "edited");
        assert_eq!(ResponseType::from_str("ai").unwrap(), ResponseType::Ai);
        assert!(!ResponseType::Manual.is_ai());
    }

    #[test]
    fn setting_values_survive_encoding() {
        for value in [
            SettingValue::Bool(true),
            SettingValue::Int(-30),
            SettingValue::String("hours".into()),
            SettingValue::Json(serde_json::json!({"models": ["a", "b"]})),
        ] {
            let decoded = SettingValue::decode(&value.encode(), value.type_name());
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn json_classification_prefers_scalar_types() {
        assert_eq!(
            SettingValue::from_json(serde_json::json!(30)),
            SettingValue::Int(30)
        );
        assert_eq!(
            SettingValue::from_json(serde_json::json!(false)),
            SettingValue::Bool(false)
        );
        assert_eq!(
            SettingValue::from_json(serde_json::json!(1.5)),
            SettingValue::Json(serde_json::json!(1.5))
        );
    }
}
