// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History scan over a fixed list of chats.

use std::path::PathBuf;

use leadscout_core::{ChatInfo, ChatRef, LeadscoutError};
use tracing::{debug, info, warn};

use crate::export::{self, ScanRow};
use crate::filters::{self, MissCounter};
use crate::pipeline::{IngestPipeline, Outcome, SkipReason};

/// Totals for one finished scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub chats_scanned: usize,
    pub chats_skipped: usize,
    pub messages_seen: usize,
    pub leads: usize,
    /// Rows left after deduplication, in scan order.
    pub rows: Vec<ScanRow>,
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

/// What a single chat contributed.
#[derive(Debug, Default)]
struct ChatScan {
    seen: usize,
    leads: usize,
    rows: Vec<ScanRow>,
    stopped_early: bool,
}

impl IngestPipeline {
    /// Scans the recent history of every chat and exports the matches.
    ///
    /// A chat that fails to resolve, or is a broadcast channel, is skipped.
    /// Only an export failure is returned as an error.
    pub async fn scan(&self, refs: &[ChatRef]) -> Result<ScanReport, LeadscoutError> {
        let mut report = ScanReport::default();
        let mut rows = Vec::new();

        for reference in refs {
            if self.cancel.is_cancelled() {
                info!("scan interrupted by shutdown");
                break;
            }

            let chat = match self.deps.chat.resolve_chat(reference).await {
                Ok(chat) => chat,
                Err(e) => {
                    warn!(chat = %reference, error = %e, "skipping unresolved chat");
                    report.chats_skipped += 1;
                    continue;
                }
            };
            if chat.is_broadcast() {
                info!(chat = %reference, "skipping broadcast channel");
                report.chats_skipped += 1;
                continue;
            }

            match self.scan_chat(reference, &chat).await {
                Ok(result) => {
                    info!(
                        chat = %chat.display_title(),
                        seen = result.seen,
                        leads = result.leads,
                        stopped_early = result.stopped_early,
                        "chat scanned"
                    );
                    report.chats_scanned += 1;
                    report.messages_seen += result.seen;
                    report.leads += result.leads;
                    rows.extend(result.rows);
                }
                Err(e) => {
                    warn!(chat = %reference, error = %e, "failed to read chat history");
                    report.chats_skipped += 1;
                    continue;
                }
            }

            let kind = chat.kind.to_string();
            if let Err(e) = self
                .deps
                .store
                .touch_scan(&chat.source_key(), &chat.display_title(), &kind)
                .await
            {
                warn!(chat = %reference, error = %e, "failed to record scan time");
            }
        }

        report.rows = export::dedupe_by_text(rows);
        self.export(&mut report).await?;

        info!(
            chats = report.chats_scanned,
            skipped = report.chats_skipped,
            leads = report.leads,
            rows = report.rows.len(),
            "scan finished"
        );
        Ok(report)
    }

    async fn scan_chat(
        &self,
        reference: &ChatRef,
        chat: &ChatInfo,
    ) -> Result<ChatScan, LeadscoutError> {
        let history = self
            .deps
            .chat
            .history(chat, self.settings.max_messages_per_chat)
            .await?;

        let now = self.deps.clock.now();
        let mut misses = MissCounter::default();
        let mut result = ChatScan::default();

        for message in history.iter().take(self.settings.max_messages_per_chat) {
            if self.cancel.is_cancelled() {
                break;
            }
            result.seen += 1;

            if !filters::within_window(message.date, now, self.settings.lookback) {
                if misses.miss() {
                    debug!(chat = %reference, misses = misses.misses(), "history left the window");
                    result.stopped_early = true;
                    break;
                }
                continue;
            }
            misses.hit();

            match self.process(message).await {
                Outcome::Lead(_) => {
                    result.leads += 1;
                    result.rows.push(ScanRow::new(reference, message));
                }
                Outcome::Skipped(SkipReason::NoKeywords) => break,
                Outcome::Skipped(_) => {}
            }
        }
        Ok(result)
    }

    async fn export(&self, report: &mut ScanReport) -> Result<(), LeadscoutError> {
        if report.rows.is_empty() {
            info!("no matches to export");
            return Ok(());
        }

        let at = self.deps.clock.local_now();
        let dir = self.settings.export_dir.clone();
        let (save_csv, save_json) = (self.settings.save_csv, self.settings.save_json);
        let rows = report.rows.clone();

        let (csv_path, json_path) = tokio::task::spawn_blocking(move || {
            let csv_path = if save_csv {
                let path = export::export_path(&dir, at, "csv");
                export::write_csv(&path, &rows)?;
                Some(path)
            } else {
                None
            };
            let json_path = if save_json {
                let path = export::export_path(&dir, at, "json");
                export::write_json(&path, &rows)?;
                Some(path)
            } else {
                None
            };
            Ok::<_, LeadscoutError>((csv_path, json_path))
        })
        .await
        .map_err(|e| LeadscoutError::Internal(format!("export task failed: {e}")))??;

        report.csv_path = csv_path;
        report.json_path = json_path;
        Ok(())
    }
}
