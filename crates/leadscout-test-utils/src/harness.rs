// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles an in-memory lead store, a keyword store, and the
//! mock collaborators a pipeline needs, all sharing one [`FixedClock`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use leadscout_config::LeadscoutConfig;
use leadscout_core::{ChatInfo, ChatMessage, Clock, LeadscoutError, Sender};
use leadscout_storage::{KeywordStore, LeadStore};

use crate::clock::FixedClock;
use crate::mock_chat::MockChatClient;
use crate::mock_drafter::CannedDrafter;
use crate::publisher::RecordingPublisher;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    keywords: Vec<String>,
    replies: Vec<String>,
    clock: FixedClock,
    config: LeadscoutConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            keywords: Vec::new(),
            replies: Vec::new(),
            // A Monday at noon: inside the default active hours.
            clock: FixedClock::ymd_hms(2026, 3, 2, 12, 0, 0),
            config: LeadscoutConfig::default(),
        }
    }

    /// Active trigger phrases seeded into the keyword store.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replies returned by the canned drafter, in order.
    pub fn with_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_clock(mut self, clock: FixedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Adjust the configuration before the harness is built.
    pub fn with_config(mut self, edit: impl FnOnce(&mut LeadscoutConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, LeadscoutError> {
        let clock = Arc::new(self.clock);
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let store = Arc::new(LeadStore::in_memory(dyn_clock.clone()).await?);
        let keywords = Arc::new(KeywordStore::open(store.database()?.clone(), dyn_clock).await?);
        for phrase in &self.keywords {
            keywords.add(phrase).await?;
        }

        Ok(TestHarness {
            store,
            keywords,
            chat: Arc::new(MockChatClient::new()),
            publisher: Arc::new(RecordingPublisher::new()),
            drafter: Arc::new(CannedDrafter::with_replies(self.replies)),
            clock,
            config: self.config,
        })
    }
}

/// A complete test environment with mock collaborators and in-memory storage.
pub struct TestHarness {
    pub store: Arc<LeadStore>,
    pub keywords: Arc<KeywordStore>,
    pub chat: Arc<MockChatClient>,
    pub publisher: Arc<RecordingPublisher>,
    pub drafter: Arc<CannedDrafter>,
    pub clock: Arc<FixedClock>,
    pub config: LeadscoutConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A message in `chat` sent `age` before the harness clock's now.
    pub fn message(&self, chat: &ChatInfo, id: i64, text: &str, age: Duration) -> ChatMessage {
        self.message_at(chat, id, text, self.clock.now() - age)
    }

    pub fn message_at(
        &self,
        chat: &ChatInfo,
        id: i64,
        text: &str,
        date: DateTime<Utc>,
    ) -> ChatMessage {
        ChatMessage {
            chat: chat.clone(),
            message_id: id,
            date,
            sender: Some(sender(7001, Some("client_anna"), "Анна")),
            text: text.to_string(),
        }
    }
}

/// A sender with a first name and an optional username.
pub fn sender(id: i64, username: Option<&str>, first_name: &str) -> Sender {
    Sender {
        id,
        username: username.map(String::from),
        first_name: Some(first_name.to_string()),
        last_name: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_chat::group_chat;

    #[tokio::test]
    async fn builder_seeds_keywords() {
        let harness = TestHarness::builder()
            .with_keywords(["Ищу видеопродюсера", "нужен монтажер"])
            .build()
            .await
            .unwrap();

        assert!(harness.keywords.matches("ИЩУ ВИДЕОПРОДЮСЕРА срочно"));
        assert_eq!(harness.store.count_leads().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn messages_are_dated_relative_to_clock() {
        let harness = TestHarness::builder().build().await.unwrap();
        let chat = group_chat(-1, "Видео", None);
        let msg = harness.message(&chat, 1, "hi", Duration::hours(2));
        assert_eq!(harness.clock.now() - msg.date, Duration::hours(2));
    }
}
