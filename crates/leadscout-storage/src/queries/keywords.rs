// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword rows. Callers pass phrases already normalized.

use chrono::{DateTime, Utc};
use leadscout_core::LeadscoutError;
use rusqlite::params;

use crate::database::{Database, format_timestamp, map_tr_err};
use crate::models::Keyword;

/// Inserts a phrase. Returns `false` if it already exists.
pub async fn insert(db: &Database, phrase: &str) -> Result<bool, LeadscoutError> {
    let phrase = phrase.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO keywords (phrase) VALUES (?1) ON CONFLICT(phrase) DO NOTHING",
                params![phrase],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete(db: &Database, phrase: &str) -> Result<bool, LeadscoutError> {
    let phrase = phrase.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let removed = conn.execute("DELETE FROM keywords WHERE phrase = ?1", params![phrase])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_active(db: &Database, phrase: &str, active: bool) -> Result<bool, LeadscoutError> {
    let phrase = phrase.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE keywords SET active = ?1 WHERE phrase = ?2",
                params![active, phrase],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Keywords ordered by hit count (descending) then phrase.
pub async fn list(db: &Database, active_only: bool) -> Result<Vec<Keyword>, LeadscoutError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Keyword>, rusqlite::Error> {
            let filter = if active_only { "WHERE active = 1" } else { "" };
            let mut stmt = conn.prepare(&format!(
                "SELECT phrase, active, hits_count, created_at, last_hit_at FROM keywords \
                 {filter} ORDER BY hits_count DESC, phrase ASC"
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok(Keyword {
                    phrase: row.get(0)?,
                    active: row.get(1)?,
                    hits_count: row.get(2)?,
                    created_at: row.get(3)?,
                    last_hit_at: row.get(4)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn record_hit(
    db: &Database,
    phrase: &str,
    now: DateTime<Utc>,
) -> Result<bool, LeadscoutError> {
    let phrase = phrase.to_string();
    let stamp = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let changed = conn.execute(
                "UPDATE keywords SET hits_count = hits_count + 1, last_hit_at = ?1 \
                 WHERE phrase = ?2",
                params![stamp, phrase],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}
