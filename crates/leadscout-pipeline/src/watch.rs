// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live monitoring of subscribed chats.

use std::collections::HashSet;

use leadscout_core::{ChatInfo, ChatRef, LeadscoutError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::pipeline::{IngestPipeline, Outcome};

/// Totals for one watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchReport {
    pub chats: usize,
    pub messages_seen: usize,
    pub leads: usize,
}

impl IngestPipeline {
    /// Resolves the chats that can be watched. Failures and broadcast
    /// channels are logged and left out.
    pub async fn resolve_watchable(&self, refs: &[ChatRef]) -> Vec<ChatInfo> {
        let mut chats = Vec::with_capacity(refs.len());
        for reference in refs {
            match self.deps.chat.resolve_chat(reference).await {
                Ok(chat) if chat.is_broadcast() => {
                    info!(chat = %reference, "skipping broadcast channel");
                }
                Ok(chat) => chats.push(chat),
                Err(e) => warn!(chat = %reference, error = %e, "skipping unresolved chat"),
            }
        }
        chats
    }

    /// Processes new messages until `cancel` fires or the stream ends.
    ///
    /// No timeframe check is applied to pushed messages.
    pub async fn watch(
        &self,
        refs: &[ChatRef],
        cancel: CancellationToken,
    ) -> Result<WatchReport, LeadscoutError> {
        let chats = self.resolve_watchable(refs).await;
        if chats.is_empty() {
            return Err(LeadscoutError::Config(
                "no chat in the source list could be watched".into(),
            ));
        }

        let watched: HashSet<i64> = chats.iter().map(|c| c.id).collect();
        let mut stream = self.deps.chat.subscribe(&chats).await?;
        let mut report = WatchReport {
            chats: chats.len(),
            ..WatchReport::default()
        };
        info!(chats = report.chats, "watching for new messages");

        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("watch stopped by shutdown");
                    break;
                }
                next = stream.recv() => match next {
                    Some(message) => message,
                    None => {
                        warn!("message stream ended");
                        break;
                    }
                },
            };

            if !watched.contains(&message.chat.id) {
                debug!(chat_id = message.chat.id, "message from unwatched chat");
                continue;
            }
            report.messages_seen += 1;
            if let Outcome::Lead(_) = self.process(&message).await {
                report.leads += 1;
            }
        }

        Ok(report)
    }
}
