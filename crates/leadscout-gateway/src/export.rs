// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead export bodies for `GET /api/export`.

use leadscout_core::LeadscoutError;
use leadscout_storage::Lead;
use serde::{Deserialize, Serialize};

/// Requested export encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// Flat CSV row; reasons are joined since CSV has no lists.
#[derive(Debug, Serialize)]
struct CsvLead<'a> {
    id: i64,
    created_at: &'a str,
    chat_source: &'a str,
    chat_title: &'a str,
    sender_id: Option<i64>,
    sender_name: Option<&'a str>,
    quality_label: &'static str,
    quality_score: i32,
    quality_reasons: String,
    message_text: &'a str,
    responded: bool,
    response_text: Option<&'a str>,
    forwarded: bool,
}

fn export_err(e: impl std::error::Error + Send + Sync + 'static) -> LeadscoutError {
    LeadscoutError::Export {
        source: Box::new(e),
    }
}

/// Renders leads in the requested format.
pub fn render(format: ExportFormat, leads: &[Lead]) -> Result<Vec<u8>, LeadscoutError> {
    match format {
        ExportFormat::Json => serde_json::to_vec_pretty(leads).map_err(export_err),
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for lead in leads {
                writer
                    .serialize(CsvLead {
                        id: lead.id,
                        created_at: &lead.created_at,
                        chat_source: &lead.chat_source,
                        chat_title: &lead.chat_title,
                        sender_id: lead.sender_id,
                        sender_name: lead.sender_name.as_deref(),
                        quality_label: lead.quality_label.code(),
                        quality_score: lead.quality_score,
                        quality_reasons: lead.quality_reasons.join("; "),
                        message_text: &lead.message_text,
                        responded: lead.responded,
                        response_text: lead.response_text.as_deref(),
                        forwarded: lead.forwarded,
                    })
                    .map_err(export_err)?;
            }
            writer
                .into_inner()
                .map_err(|e| export_err(e.into_error()))
        }
    }
}
