// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned reply drafter for deterministic testing.
//!
//! `CannedDrafter` implements `ReplyDrafter` with pre-configured replies,
//! enabling auto-reply tests without an oracle.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadscout_core::{QualityTier, ReplyDrafter};

/// One `draft()` invocation as seen by the drafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftCall {
    pub message_text: String,
    pub tier: QualityTier,
    pub sender_name: String,
}

/// A drafter that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default reply is returned.
pub struct CannedDrafter {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<DraftCall>>,
    delay: Duration,
}

impl CannedDrafter {
    /// Default reply when the queue is empty.
    pub const DEFAULT_REPLY: &'static str = "Здравствуйте! Напишите в личку, обсудим.";

    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a drafter pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Makes every `draft()` take `delay`, like a slow oracle.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<DraftCall> {
        self.calls.lock().await.clone()
    }
}

impl Default for CannedDrafter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyDrafter for CannedDrafter {
    async fn draft(&self, message_text: &str, tier: QualityTier, sender_name: &str) -> String {
        self.calls.lock().await.push(DraftCall {
            message_text: message_text.to_string(),
            tier,
            sender_name: sender_name.to_string(),
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Self::DEFAULT_REPLY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_queued_then_default() {
        let drafter = CannedDrafter::with_replies(vec!["первый".into()]);
        assert_eq!(drafter.draft("a", QualityTier::Hot, "Анна").await, "первый");
        assert_eq!(
            drafter.draft("b", QualityTier::Good, "").await,
            CannedDrafter::DEFAULT_REPLY
        );

        let calls = drafter.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].sender_name, "Анна");
        assert_eq!(calls[1].tier, QualityTier::Good);
    }
}
