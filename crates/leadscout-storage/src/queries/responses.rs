// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Review queue for drafted replies.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use leadscout_core::{LeadscoutError, QualityTier};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{Database, format_timestamp, map_tr_err};
use crate::models::{PendingResponse, ResponseStatus};

pub async fn add(
    db: &Database,
    lead_id: i64,
    ai_response: &str,
    now: DateTime<Utc>,
) -> Result<i64, LeadscoutError> {
    let ai_response = ai_response.to_string();
    let stamp = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO pending_responses (lead_id, ai_response, created_at) \
                 VALUES (?1, ?2, ?3)",
                params![lead_id, ai_response, stamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Drafts still awaiting review, newest first.
pub async fn list_pending(db: &Database) -> Result<Vec<PendingResponse>, LeadscoutError> {
    db.connection()
        .call(|conn| -> Result<Vec<PendingResponse>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT pr.id, pr.lead_id, l.message_text, l.quality_label, l.chat_source, \
                        pr.ai_response, pr.edited_response, pr.status, pr.created_at \
                 FROM pending_responses pr JOIN leads l ON pr.lead_id = l.id \
                 WHERE pr.status = 'pending' \
                 ORDER BY pr.created_at DESC, pr.id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                let label: String = row.get(3)?;
                let status: String = row.get(7)?;
                Ok(PendingResponse {
                    id: row.get(0)?,
                    lead_id: row.get(1)?,
                    lead_message: row.get(2)?,
                    quality_label: QualityTier::from_str(&label).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?,
                    chat_source: row.get(4)?,
                    ai_response: row.get(5)?,
                    edited_response: row.get(6)?,
                    status: ResponseStatus::from_str(&status).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e))
                    })?,
                    created_at: row.get(8)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Moves a draft to `status`, optionally replacing its text.
///
/// Returns `false` when the draft does not exist.
pub async fn update_status(
    db: &Database,
    id: i64,
    status: ResponseStatus,
    edited_text: Option<&str>,
    now: DateTime<Utc>,
) -> Result<bool, LeadscoutError> {
    let edited_text = edited_text.map(str::to_string);
    let stamp = format_timestamp(now);
    let status = status.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE pending_responses SET status = ?1, \
                    edited_response = COALESCE(?2, edited_response), \
                    processed_at = ?3, \
                    sent_at = CASE WHEN ?1 = 'sent' THEN ?3 ELSE sent_at END \
                 WHERE id = ?4",
                params![status, edited_text, stamp, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
