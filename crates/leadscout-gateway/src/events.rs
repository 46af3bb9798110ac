// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process event fan-out from the pipeline to dashboard clients.

use async_trait::async_trait;
use leadscout_core::{AdapterType, EventPublisher, HealthStatus, LeadscoutError, PluginAdapter};
use tokio::sync::broadcast;

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// One event published by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardEvent {
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// [`EventPublisher`] backed by a tokio broadcast channel.
///
/// Publishing never blocks and never fails for lack of listeners: events
/// emitted while no dashboard is connected are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<DashboardEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(
        &self,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<(), LeadscoutError> {
        let event = DashboardEvent {
            event_type: event_type.to_string(),
            payload,
        };
        if self.tx.send(event).is_err() {
            tracing::trace!(event_type, "no dashboard listeners");
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for BroadcastPublisher {
    fn name(&self) -> &str {
        "dashboard"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadscoutError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadscoutError> {
        Ok(())
    }
}
