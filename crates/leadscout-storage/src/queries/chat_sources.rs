// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat source aggregates.

use chrono::{DateTime, Utc};
use leadscout_core::LeadscoutError;
use rusqlite::params;

use crate::database::{Database, format_timestamp, map_tr_err};
use crate::models::ChatSource;

/// All sources, busiest first.
pub async fn list(db: &Database) -> Result<Vec<ChatSource>, LeadscoutError> {
    db.connection()
        .call(|conn| -> Result<Vec<ChatSource>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT chat_id, chat_name, chat_type, active, leads_count, \
                        last_lead_time, last_scan_time, created_at \
                 FROM chat_sources ORDER BY leads_count DESC, chat_name ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(ChatSource {
                    chat_id: row.get(0)?,
                    chat_name: row.get(1)?,
                    chat_type: row.get(2)?,
                    active: row.get(3)?,
                    leads_count: row.get(4)?,
                    last_lead_time: row.get(5)?,
                    last_scan_time: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Registers a source. Returns `false` if it already exists.
pub async fn add(
    db: &Database,
    chat_id: &str,
    chat_name: Option<&str>,
    chat_type: Option<&str>,
) -> Result<bool, LeadscoutError> {
    let chat_id = chat_id.to_string();
    let chat_name = chat_name.unwrap_or(&chat_id).to_string();
    let chat_type = chat_type.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO chat_sources (chat_id, chat_name, chat_type) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(chat_id) DO NOTHING",
                params![chat_id, chat_name, chat_type],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Deletes a source. Returns whether a row was removed.
pub async fn remove(db: &Database, chat_id: &str) -> Result<bool, LeadscoutError> {
    let chat_id = chat_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let removed =
                conn.execute("DELETE FROM chat_sources WHERE chat_id = ?1", params![chat_id])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Stamps the last completed scan of a source, creating the row if needed.
pub async fn touch_scan(
    db: &Database,
    chat_id: &str,
    chat_name: &str,
    chat_type: &str,
    now: DateTime<Utc>,
) -> Result<(), LeadscoutError> {
    let chat_id = chat_id.to_string();
    let chat_name = chat_name.to_string();
    let chat_type = chat_type.to_string();
    let stamp = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO chat_sources (chat_id, chat_name, chat_type, last_scan_time) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(chat_id) DO UPDATE SET \
                    last_scan_time = excluded.last_scan_time, \
                    chat_type = COALESCE(chat_type, excluded.chat_type)",
                params![chat_id, chat_name, chat_type, stamp],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
