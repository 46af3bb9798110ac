// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply drafting seam between the pipeline and the completion oracle.

use async_trait::async_trait;

use crate::types::QualityTier;

/// Produces the text of an auto-reply.
///
/// Drafting is infallible from the caller's point of view: implementations
/// recover from every remote failure and return canned text instead.
#[async_trait]
pub trait ReplyDrafter: Send + Sync + 'static {
    async fn draft(&self, message_text: &str, tier: QualityTier, sender_name: &str) -> String;
}
