// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget event emission towards the dashboard.

use async_trait::async_trait;

use crate::error::LeadscoutError;

/// One-way event sink.
///
/// The pipeline publishes `new_lead` events here and ignores failures, so a
/// missing or broken dashboard never affects lead delivery.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    async fn publish(
        &self,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<(), LeadscoutError>;
}

/// Publisher that drops every event. Used when no dashboard runs in-process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(
        &self,
        _event_type: &str,
        _payload: serde_json::Value,
    ) -> Result<(), LeadscoutError> {
        Ok(())
    }
}
