// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scan result rows and their CSV / JSON export.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use leadscout_core::{ChatMessage, ChatRef, LeadscoutError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Longest message excerpt kept in a scan row, in characters.
pub const EXCERPT_CHARS: usize = 200;

/// One matched message in a scan export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRow {
    pub chat: String,
    pub chat_ref: String,
    pub id: i64,
    pub date: String,
    pub sender_id: Option<i64>,
    pub text: String,
}

impl ScanRow {
    pub fn new(reference: &ChatRef, message: &ChatMessage) -> Self {
        Self {
            chat: message.chat.display_title(),
            chat_ref: reference.to_string(),
            id: message.message_id,
            date: message.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            sender_id: message.sender_id(),
            text: message.text.chars().take(EXCERPT_CHARS).collect(),
        }
    }
}

/// Drops rows whose text was already seen, keeping the first occurrence.
pub fn dedupe_by_text(rows: Vec<ScanRow>) -> Vec<ScanRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.text.clone()))
        .collect()
}

/// Export file path for a scan finished at `at`.
pub fn export_path(dir: &Path, at: NaiveDateTime, extension: &str) -> PathBuf {
    dir.join(format!("leads_{}.{extension}", at.format("%Y%m%d_%H%M%S")))
}

fn export_err(e: impl std::error::Error + Send + Sync + 'static) -> LeadscoutError {
    LeadscoutError::Export {
        source: Box::new(e),
    }
}

/// Writes rows as CSV with a header line.
pub fn write_csv(path: &Path, rows: &[ScanRow]) -> Result<(), LeadscoutError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
    for row in rows {
        writer.serialize(row).map_err(export_err)?;
    }
    writer.flush().map_err(export_err)?;
    info!(path = %path.display(), rows = rows.len(), "wrote CSV export");
    Ok(())
}

/// Writes rows as a pretty-printed JSON array.
pub fn write_json(path: &Path, rows: &[ScanRow]) -> Result<(), LeadscoutError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(export_err)?;
    }
    let json = serde_json::to_string_pretty(rows).map_err(export_err)?;
    std::fs::write(path, json).map_err(export_err)?;
    info!(path = %path.display(), rows = rows.len(), "wrote JSON export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use leadscout_core::{ChatInfo, ChatKind};

    fn row(id: i64, text: &str) -> ScanRow {
        ScanRow {
            chat: "Видео".into(),
            chat_ref: "@video".into(),
            id,
            date: "2026-03-02 12:00:00".into(),
            sender_id: Some(7),
            text: text.into(),
        }
    }

    #[test]
    fn row_truncates_long_text_by_characters() {
        let message = ChatMessage {
            chat: ChatInfo {
                id: -1,
                title: None,
                username: Some("video".into()),
                kind: ChatKind::Supergroup,
            },
            message_id: 9,
            date: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            sender: None,
            text: "я".repeat(250),
        };
        let row = ScanRow::new(&ChatRef::Username("video".into()), &message);
        assert_eq!(row.text.chars().count(), EXCERPT_CHARS);
        assert_eq!(row.chat, "video");
        assert_eq!(row.chat_ref, "@video");
        assert_eq!(row.sender_id, None);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let rows = dedupe_by_text(vec![row(1, "a"), row(2, "b"), row(3, "a")]);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn export_names_carry_timestamp() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        let path = export_path(Path::new("data/exports"), at, "csv");
        assert_eq!(path, Path::new("data/exports/leads_20260302_140509.csv"));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/leads.csv");
        write_csv(&path, &[row(1, "нужен монтаж, бюджет есть")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("chat,chat_ref,id,date,sender_id,text"));
        assert_eq!(
            lines.next(),
            Some("Видео,@video,1,2026-03-02 12:00:00,7,\"нужен монтаж, бюджет есть\"")
        );
    }

    #[test]
    fn json_is_an_array_of_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.json");
        write_json(&path, &[row(1, "a"), row(2, "b")]).unwrap();

        let parsed: Vec<ScanRow> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, [row(1, "a"), row(2, "b")]);
    }
}
