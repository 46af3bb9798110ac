// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily rollups. Written additively inside the lead and response
//! transactions, read back for analytics.

use chrono::NaiveDate;
use leadscout_core::{LeadscoutError, QualityTier};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{Analytics, DailyStat, ResponseEfficiency, ResponseType};

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Adds one lead to the date's total and to exactly one tier bucket.
pub(crate) fn record_lead(
    tx: &rusqlite::Transaction<'_>,
    date: NaiveDate,
    tier: QualityTier,
) -> rusqlite::Result<()> {
    let bucket = |t: QualityTier| i64::from(tier == t);
    tx.execute(
        "INSERT INTO daily_stats (date, total_leads, hot_leads, good_leads, normal_leads, \
         low_quality_leads) VALUES (?1, 1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(date) DO UPDATE SET \
            total_leads = total_leads + 1, \
            hot_leads = hot_leads + excluded.hot_leads, \
            good_leads = good_leads + excluded.good_leads, \
            normal_leads = normal_leads + excluded.normal_leads, \
            low_quality_leads = low_quality_leads + excluded.low_quality_leads",
        params![
            date_key(date),
            bucket(QualityTier::Hot),
            bucket(QualityTier::Good),
            bucket(QualityTier::Normal),
            bucket(QualityTier::LowQuality),
        ],
    )?;
    Ok(())
}

/// Adds one response to the date, attributed to either the AI or the manual counter.
pub(crate) fn record_response(
    tx: &rusqlite::Transaction<'_>,
    date: NaiveDate,
    response_type: ResponseType,
) -> rusqlite::Result<()> {
    let ai = i64::from(response_type.is_ai());
    tx.execute(
        "INSERT INTO daily_stats (date, responses_sent, ai_responses, manual_responses) \
         VALUES (?1, 1, ?2, ?3) \
         ON CONFLICT(date) DO UPDATE SET \
            responses_sent = responses_sent + 1, \
            ai_responses = ai_responses + excluded.ai_responses, \
            manual_responses = manual_responses + excluded.manual_responses",
        params![date_key(date), ai, 1 - ai],
    )?;
    Ok(())
}

/// Rollup row for one date, if any lead or response was recorded on it.
pub async fn daily_stat(db: &Database, date: NaiveDate) -> Result<Option<DailyStat>, LeadscoutError> {
    let key = date_key(date);
    db.connection()
        .call(move |conn| -> Result<Option<DailyStat>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("{DAILY_SELECT} WHERE date = ?1"))?;
            match stmt.query_row(params![key], daily_from_row) {
                Ok(stat) => Ok(Some(stat)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

const DAILY_SELECT: &str = "SELECT date, total_leads, hot_leads, good_leads, normal_leads, \
     low_quality_leads, responses_sent, ai_responses, manual_responses FROM daily_stats";

fn daily_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DailyStat> {
    Ok(DailyStat {
        date: row.get(0)?,
        total_leads: row.get(1)?,
        hot_leads: row.get(2)?,
        good_leads: row.get(3)?,
        normal_leads: row.get(4)?,
        low_quality_leads: row.get(5)?,
        responses_sent: row.get(6)?,
        ai_responses: row.get(7)?,
        manual_responses: row.get(8)?,
    })
}

/// Daily rows on or after `since` (ascending) plus response totals over them.
pub async fn analytics(db: &Database, since: NaiveDate) -> Result<Analytics, LeadscoutError> {
    let since = date_key(since);
    db.connection()
        .call(move |conn| -> Result<Analytics, rusqlite::Error> {
            let daily_data = {
                let mut stmt =
                    conn.prepare(&format!("{DAILY_SELECT} WHERE date >= ?1 ORDER BY date ASC"))?;
                let rows = stmt.query_map(params![since], daily_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };

            let response_efficiency = ResponseEfficiency {
                total_responses: daily_data.iter().map(|d| d.responses_sent).sum(),
                ai_responses: daily_data.iter().map(|d| d.ai_responses).sum(),
                manual_responses: daily_data.iter().map(|d| d.manual_responses).sum(),
                not_responded: daily_data
                    .iter()
                    .map(|d| d.total_leads - d.responses_sent)
                    .sum::<i64>()
                    .max(0),
            };

            Ok(Analytics {
                daily_data,
                response_efficiency,
            })
        })
        .await
        .map_err(map_tr_err)
}
