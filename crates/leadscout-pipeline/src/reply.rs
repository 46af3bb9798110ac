// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delayed auto-reply delivery.
//!
//! A reply task sleeps for its tier delay, reserves a throttle slot (the cap
//! or the hour may have changed while it slept), drafts, sends, and then
//! commits the reservation. A failed or cancelled send releases it. Tasks
//! are best-effort: cancellation during the delay abandons the reply.

use std::sync::Arc;
use std::time::Duration;

use leadscout_core::{
    ChatClient, ChatMessage, ChatTarget, Clock, OutboundMessage, QualityTier, ReplyDrafter,
};
use leadscout_reply::ReplyThrottle;
use leadscout_storage::{LeadStore, ResponseType};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::card;

/// One reply to deliver.
#[derive(Debug, Clone)]
pub struct ReplyJob {
    pub lead_id: i64,
    pub message: ChatMessage,
    pub score: i32,
    pub tier: QualityTier,
    pub delay: Duration,
    /// Where the operator notification goes.
    pub operator: ChatTarget,
}

/// What happened to a reply job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Sent { text: String, count: u32 },
    Cancelled,
    Throttled(leadscout_reply::ReplyDecision),
    SendFailed,
}

/// Shared handles a reply task needs.
#[derive(Clone)]
pub struct ReplyWorker {
    pub chat: Arc<dyn ChatClient>,
    pub store: Arc<LeadStore>,
    pub drafter: Arc<dyn ReplyDrafter>,
    pub clock: Arc<dyn Clock>,
    pub throttle: Arc<Mutex<ReplyThrottle>>,
}

impl ReplyWorker {
    /// Runs one job to completion or cancellation.
    pub async fn run(self, job: ReplyJob, cancel: CancellationToken) -> ReplyOutcome {
        info!(
            lead_id = job.lead_id,
            priority = job.tier.priority(),
            delay_secs = job.delay.as_secs(),
            "auto-reply scheduled"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                info!(lead_id = job.lead_id, "auto-reply abandoned on shutdown");
                return ReplyOutcome::Cancelled;
            }
            _ = tokio::time::sleep(job.delay) => {}
        }

        let decision = self
            .throttle
            .lock()
            .await
            .try_reserve(self.clock.local_now(), job.score);
        if !decision.is_allowed() {
            info!(lead_id = job.lead_id, reason = %decision, "auto-reply skipped after delay");
            return ReplyOutcome::Throttled(decision);
        }

        let sender_name = job
            .message
            .sender
            .as_ref()
            .and_then(|s| s.first_name.clone())
            .unwrap_or_default();
        let text = tokio::select! {
            _ = cancel.cancelled() => {
                self.throttle.lock().await.release();
                info!(lead_id = job.lead_id, "auto-reply abandoned on shutdown");
                return ReplyOutcome::Cancelled;
            }
            text = self.drafter.draft(&job.message.text, job.tier, &sender_name) => text,
        };

        let source = ChatTarget::Chat {
            id: job.message.chat.id,
            display: job.message.chat.display_title(),
        };
        let mut reply = OutboundMessage::plain(source, text.clone());
        reply.reply_to = Some(job.message.message_id);
        if let Err(e) = self.chat.send(reply).await {
            self.throttle.lock().await.release();
            warn!(lead_id = job.lead_id, error = %e, "failed to send auto-reply");
            return ReplyOutcome::SendFailed;
        }

        let (count, max) = {
            let mut throttle = self.throttle.lock().await;
            throttle.commit(self.clock.local_now());
            (throttle.count(), throttle.max_per_day())
        };
        info!(lead_id = job.lead_id, count, max, "auto-reply sent");

        if job.lead_id > 0
            && let Err(e) = self
                .store
                .mark_responded(job.lead_id, &text, ResponseType::Ai)
                .await
        {
            warn!(lead_id = job.lead_id, error = %e, "failed to record auto-reply");
        }

        self.notify_operator(&job, &text, count, max).await;
        ReplyOutcome::Sent { text, count }
    }

    async fn notify_operator(&self, job: &ReplyJob, text: &str, count: u32, max: u32) {
        let notification = card::reply_notification(text, job.tier, count, max);
        let markdown = OutboundMessage::markdown(job.operator.clone(), notification.clone());
        if let Err(e) = self.chat.send(markdown).await {
            debug!(error = %e, "markdown notification failed, retrying as plain text");
            let plain = OutboundMessage::plain(job.operator.clone(), notification);
            if let Err(e) = self.chat.send(plain).await {
                warn!(lead_id = job.lead_id, error = %e, "failed to notify operator");
            }
        }
    }
}
