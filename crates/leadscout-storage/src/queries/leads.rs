// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead persistence and lead-level aggregate queries.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use leadscout_core::{LeadscoutError, QualityTier};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{Database, format_timestamp, map_tr_err};
use crate::models::{Lead, LeadStats, NewLead, ResponseType};
use crate::queries::stats;

const LEAD_COLUMNS: &str = "id, chat_source, chat_title, sender_id, sender_name, message_text, \
     message_id, quality_score, quality_label, quality_reasons, created_at, responded, \
     response_text, response_timestamp, response_type, forwarded, forwarded_at";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub(crate) fn lead_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let chat_source: String = row.get(1)?;
    let chat_title: Option<String> = row.get(2)?;
    let label: String = row.get(8)?;
    let reasons: String = row.get(9)?;
    let response_type: Option<String> = row.get(14)?;

    Ok(Lead {
        id: row.get(0)?,
        chat_title: chat_title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| chat_source.clone()),
        chat_source,
        sender_id: row.get(3)?,
        sender_name: row.get(4)?,
        message_text: row.get(5)?,
        message_id: row.get(6)?,
        quality_score: row.get(7)?,
        quality_label: QualityTier::from_str(&label).map_err(|e| conversion_err(8, e))?,
        quality_reasons: serde_json::from_str(&reasons).map_err(|e| conversion_err(9, e))?,
        created_at: row.get(10)?,
        responded: row.get(11)?,
        response_text: row.get(12)?,
        response_timestamp: row.get(13)?,
        response_type: response_type
            .map(|t| ResponseType::from_str(&t))
            .transpose()
            .map_err(|e| conversion_err(14, e))?,
        forwarded: row.get(15)?,
        forwarded_at: row.get(16)?,
    })
}

/// Inserts a lead and updates its chat-source aggregate and the daily rollup
/// in one transaction. Returns the new lead id.
pub async fn create_lead(
    db: &Database,
    lead: NewLead,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<i64, LeadscoutError> {
    let tier = QualityTier::from_score(lead.quality_score);
    let reasons = serde_json::to_string(&lead.quality_reasons).map_err(|e| {
        LeadscoutError::Storage {
            source: Box::new(e),
        }
    })?;
    let created_at = format_timestamp(now);
    let chat_title = lead
        .chat_title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| lead.chat_source.clone());

    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO leads (chat_source, chat_title, sender_id, sender_name, \
                 message_text, message_id, quality_score, quality_label, quality_reasons, \
                 created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    lead.chat_source,
                    chat_title,
                    lead.sender_id,
                    lead.sender_name,
                    lead.message_text,
                    lead.message_id,
                    lead.quality_score,
                    tier.to_string(),
                    reasons,
                    created_at,
                ],
            )?;
            let lead_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO chat_sources (chat_id, chat_name, leads_count, last_lead_time) \
                 VALUES (?1, ?2, 1, ?3) \
                 ON CONFLICT(chat_id) DO UPDATE SET \
                    leads_count = leads_count + 1, \
                    last_lead_time = excluded.last_lead_time, \
                    chat_name = COALESCE(excluded.chat_name, chat_name)",
                params![lead.chat_source, chat_title, created_at],
            )?;

            stats::record_lead(&tx, today, tier)?;

            tx.commit()?;
            Ok(lead_id)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a single lead by id.
pub async fn get_lead(db: &Database, id: i64) -> Result<Option<Lead>, LeadscoutError> {
    db.connection()
        .call(move |conn| -> Result<Option<Lead>, rusqlite::Error> {
            let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1");
            match conn.query_row(&sql, params![id], lead_from_row) {
                Ok(lead) => Ok(Some(lead)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Leads created at or after `since`, newest first, at most `limit`.
pub async fn recent_leads(
    db: &Database,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<Lead>, LeadscoutError> {
    let since = format_timestamp(since);
    db.connection()
        .call(move |conn| -> Result<Vec<Lead>, rusqlite::Error> {
            let sql = format!(
                "SELECT {LEAD_COLUMNS} FROM leads WHERE created_at >= ?1 \
                 ORDER BY created_at DESC, id DESC LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![since, limit], lead_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Tier counts and response rate for leads created at or after `since`.
pub async fn stats_since(db: &Database, since: DateTime<Utc>) -> Result<LeadStats, LeadscoutError> {
    let since = format_timestamp(since);
    db.connection()
        .call(move |conn| -> Result<LeadStats, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN quality_label = 'HOT' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN quality_label = 'GOOD' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN quality_label = 'NORMAL' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN quality_label = 'LOW_QUALITY' THEN 1 ELSE 0 END), 0), \
                    COALESCE(SUM(CASE WHEN responded = 1 THEN 1 ELSE 0 END), 0) \
                 FROM leads WHERE created_at >= ?1",
                params![since],
                |row| {
                    let total: i64 = row.get(0)?;
                    let responded: i64 = row.get(5)?;
                    let response_rate = if total > 0 {
                        (responded as f64 / total as f64 * 1000.0).round() / 10.0
                    } else {
                        0.0
                    };
                    Ok(LeadStats {
                        total_leads: total,
                        hot_leads: row.get(1)?,
                        good_leads: row.get(2)?,
                        normal_leads: row.get(3)?,
                        low_quality_leads: row.get(4)?,
                        responded,
                        response_rate,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Records a reply on a lead and bumps the daily response counters.
///
/// Counters move only on the first response to a lead, so a lead never
/// counts twice. Returns `false` when the lead does not exist.
pub async fn mark_responded(
    db: &Database,
    lead_id: i64,
    text: &str,
    response_type: ResponseType,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<bool, LeadscoutError> {
    let text = text.to_string();
    let stamp = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;

            let already: bool = match tx.query_row(
                "SELECT responded FROM leads WHERE id = ?1",
                params![lead_id],
                |row| row.get(0),
            ) {
                Ok(flag) => flag,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(false),
                Err(e) => return Err(e),
            };

            tx.execute(
                "UPDATE leads SET responded = 1, response_text = ?1, \
                 response_timestamp = ?2, response_type = ?3 WHERE id = ?4",
                params![text, stamp, response_type.to_string(), lead_id],
            )?;

            if !already {
                stats::record_response(&tx, today, response_type)?;
            }

            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Flags a lead as delivered to the operator.
pub async fn mark_forwarded(
    db: &Database,
    lead_id: i64,
    now: DateTime<Utc>,
) -> Result<bool, LeadscoutError> {
    let stamp = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE leads SET forwarded = 1, forwarded_at = ?1 WHERE id = ?2",
                params![stamp, lead_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Total number of stored leads.
pub async fn count_leads(db: &Database) -> Result<i64, LeadscoutError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))
        })
        .await
        .map_err(map_tr_err)
}
