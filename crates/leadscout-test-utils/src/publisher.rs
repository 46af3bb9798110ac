// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event publisher that records what the pipeline emits.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadscout_core::{EventPublisher, LeadscoutError};

/// Captures published events, optionally failing every publish.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, serde_json::Value)>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish return an error (events are still recorded).
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().await.clone()
    }

    /// Payloads of events with the given type.
    pub async fn payloads(&self, event_type: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(kind, _)| kind == event_type)
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(
        &self,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<(), LeadscoutError> {
        self.events
            .lock()
            .await
            .push((event_type.to_string(), payload));
        if self.fail.load(Ordering::SeqCst) {
            return Err(LeadscoutError::Internal("dashboard unavailable".into()));
        }
        Ok(())
    }
}
