// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed key/value settings.

use chrono::{DateTime, Utc};
use leadscout_core::LeadscoutError;
use rusqlite::params;

use crate::database::{Database, format_timestamp, map_tr_err};
use crate::models::SettingValue;

pub async fn get(db: &Database, key: &str) -> Result<Option<SettingValue>, LeadscoutError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<SettingValue>, rusqlite::Error> {
            match conn.query_row(
                "SELECT value, type FROM system_settings WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            ) {
                Ok((value, kind)) => Ok(Some(SettingValue::decode(&value, &kind))),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set(
    db: &Database,
    key: &str,
    value: &SettingValue,
    now: DateTime<Utc>,
) -> Result<(), LeadscoutError> {
    let key = key.to_string();
    let encoded = value.encode();
    let kind = value.type_name();
    let stamp = format_timestamp(now);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO system_settings (key, value, type, updated_at) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(key) DO UPDATE SET \
                    value = excluded.value, type = excluded.type, updated_at = excluded.updated_at",
                params![key, encoded, kind, stamp],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All stored settings, ordered by key.
pub async fn all(db: &Database) -> Result<Vec<(String, SettingValue)>, LeadscoutError> {
    db.connection()
        .call(|conn| -> Result<Vec<(String, SettingValue)>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT key, value, type FROM system_settings ORDER BY key")?;
            let rows = stmt.query_map([], |row| {
                let key: String = row.get(0)?;
                let value: String = row.get(1)?;
                let kind: String = row.get(2)?;
                Ok((key, SettingValue::decode(&value, &kind)))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
