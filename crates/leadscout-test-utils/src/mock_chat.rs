// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat client for deterministic testing.
//!
//! `MockChatClient` implements `ChatClient` with registered chats, canned
//! history, injectable live messages, and captured outbound traffic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use leadscout_core::{
    AdapterType, ChatClient, ChatInfo, ChatKind, ChatMessage, ChatRef, ChatTarget, HealthStatus,
    LeadscoutError, OutboundMessage, PluginAdapter, TextFormat,
};

/// A forwarded message as captured by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarded {
    pub target: ChatTarget,
    pub chat_id: i64,
    pub message_id: i64,
}

/// A mock chat account for testing.
///
/// - **chats**: references registered via `add_chat()` resolve to their info
/// - **history**: messages set via `set_history()` are served newest first
/// - **live**: messages injected via `inject()` reach the `subscribe()` receiver
/// - **sent** / **forwarded**: captured for assertions
pub struct MockChatClient {
    chats: Mutex<HashMap<ChatRef, ChatInfo>>,
    history: Mutex<HashMap<i64, Vec<ChatMessage>>>,
    live_tx: Mutex<Option<mpsc::Sender<ChatMessage>>>,
    sent: Mutex<Vec<OutboundMessage>>,
    forwarded: Mutex<Vec<Forwarded>>,
    next_id: AtomicI64,
    fail_markdown: AtomicBool,
    fail_sends: AtomicBool,
    fail_forwards: AtomicBool,
    saved_messages: AtomicBool,
    ignore_history_limit: AtomicBool,
}

impl MockChatClient {
    /// Create a mock client with no chats.
    pub fn new() -> Self {
        Self {
            chats: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            live_tx: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            forwarded: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            fail_markdown: AtomicBool::new(false),
            fail_sends: AtomicBool::new(false),
            fail_forwards: AtomicBool::new(false),
            saved_messages: AtomicBool::new(true),
            ignore_history_limit: AtomicBool::new(false),
        }
    }

    /// Makes `reference` resolve to `chat`.
    pub async fn add_chat(&self, reference: ChatRef, chat: ChatInfo) {
        self.chats.lock().await.insert(reference, chat);
    }

    /// Replaces the history of a chat. `messages` must be newest first.
    pub async fn set_history(&self, chat_id: i64, messages: Vec<ChatMessage>) {
        self.history.lock().await.insert(chat_id, messages);
    }

    /// Pushes a live message to the active subscription.
    ///
    /// Returns `false` when nobody is subscribed.
    pub async fn inject(&self, message: ChatMessage) -> bool {
        let tx = self.live_tx.lock().await.clone();
        match tx {
            Some(tx) => tx.send(message).await.is_ok(),
            None => false,
        }
    }

    /// Ends the live stream, as a dropped connection would.
    pub async fn disconnect(&self) {
        self.live_tx.lock().await.take();
    }

    /// Markdown sends fail while plain sends still succeed.
    pub fn fail_markdown(&self, fail: bool) {
        self.fail_markdown.store(fail, Ordering::SeqCst);
    }

    /// Every send fails.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_forwards(&self, fail: bool) {
        self.fail_forwards.store(fail, Ordering::SeqCst);
    }

    /// `history()` returns everything regardless of `limit`, like a client
    /// that pages past the requested size.
    pub fn ignore_history_limit(&self, ignore: bool) {
        self.ignore_history_limit.store(ignore, Ordering::SeqCst);
    }

    /// Whether `me` resolves to saved messages (a user account) or fails
    /// (a bot account).
    pub fn supports_saved_messages(&self, supported: bool) {
        self.saved_messages.store(supported, Ordering::SeqCst);
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get all forwards performed through `forward()`.
    pub async fn forwarded(&self) -> Vec<Forwarded> {
        self.forwarded.lock().await.clone()
    }

    /// Clear captured sends and forwards.
    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.forwarded.lock().await.clear();
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A supergroup chat with an optional public username.
pub fn group_chat(id: i64, title: &str, username: Option<&str>) -> ChatInfo {
    ChatInfo {
        id,
        title: Some(title.to_string()),
        username: username.map(String::from),
        kind: ChatKind::Supergroup,
    }
}

/// A broadcast channel.
pub fn broadcast_channel(id: i64, title: &str, username: Option<&str>) -> ChatInfo {
    ChatInfo {
        kind: ChatKind::Channel,
        ..group_chat(id, title, username)
    }
}

#[async_trait]
impl PluginAdapter for MockChatClient {
    fn name(&self) -> &str {
        "mock-chat"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Chat
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadscoutError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadscoutError> {
        self.disconnect().await;
        Ok(())
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn resolve_chat(&self, reference: &ChatRef) -> Result<ChatInfo, LeadscoutError> {
        self.chats
            .lock()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| LeadscoutError::Resolution {
                reference: reference.to_string(),
                message: "no such chat".into(),
            })
    }

    async fn resolve_target(&self, raw: &str) -> Result<ChatTarget, LeadscoutError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("me") {
            return if self.saved_messages.load(Ordering::SeqCst) {
                Ok(ChatTarget::SavedMessages)
            } else {
                Err(LeadscoutError::Resolution {
                    reference: raw.to_string(),
                    message: "saved messages unavailable".into(),
                })
            };
        }
        match ChatRef::parse(raw) {
            Some(ChatRef::Id(id)) => Ok(ChatTarget::Chat {
                id,
                display: raw.to_string(),
            }),
            Some(reference) => {
                let chat = self.resolve_chat(&reference).await?;
                Ok(ChatTarget::Chat {
                    id: chat.id,
                    display: reference.to_string(),
                })
            }
            None => Err(LeadscoutError::Resolution {
                reference: raw.to_string(),
                message: "empty target".into(),
            }),
        }
    }

    async fn history(
        &self,
        chat: &ChatInfo,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, LeadscoutError> {
        let limit = if self.ignore_history_limit.load(Ordering::SeqCst) {
            usize::MAX
        } else {
            limit
        };
        Ok(self
            .history
            .lock()
            .await
            .get(&chat.id)
            .map(|messages| messages.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn subscribe(
        &self,
        _chats: &[ChatInfo],
    ) -> Result<mpsc::Receiver<ChatMessage>, LeadscoutError> {
        let (tx, rx) = mpsc::channel(64);
        *self.live_tx.lock().await = Some(tx);
        Ok(rx)
    }

    async fn send(&self, msg: OutboundMessage) -> Result<i64, LeadscoutError> {
        if self.fail_sends.load(Ordering::SeqCst)
            || (msg.format == TextFormat::Markdown && self.fail_markdown.load(Ordering::SeqCst))
        {
            return Err(LeadscoutError::chat("mock send failure"));
        }
        self.sent.lock().await.push(msg);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn forward(
        &self,
        target: &ChatTarget,
        message: &ChatMessage,
    ) -> Result<(), LeadscoutError> {
        if self.fail_forwards.load(Ordering::SeqCst) {
            return Err(LeadscoutError::chat("mock forward failure"));
        }
        self.forwarded.lock().await.push(Forwarded {
            target: target.clone(),
            chat_id: message.chat.id,
            message_id: message.message_id,
        });
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(chat: &ChatInfo, id: i64, text: &str) -> ChatMessage {
        ChatMessage {
            chat: chat.clone(),
            message_id: id,
            date: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
            sender: None,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn registered_chats_resolve() {
        let client = MockChatClient::new();
        let chat = group_chat(-100, "Видео", Some("video"));
        client
            .add_chat(ChatRef::Username("video".into()), chat.clone())
            .await;

        let resolved = client
            .resolve_chat(&ChatRef::Username("video".into()))
            .await
            .unwrap();
        assert_eq!(resolved, chat);
        assert!(client.resolve_chat(&ChatRef::Id(5)).await.is_err());
    }

    #[tokio::test]
    async fn history_respects_limit() {
        let client = MockChatClient::new();
        let chat = group_chat(-100, "Видео", None);
        client
            .set_history(
                chat.id,
                vec![message(&chat, 3, "c"), message(&chat, 2, "b"), message(&chat, 1, "a")],
            )
            .await;

        let history = client.history(&chat, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message_id, 3);
    }

    #[tokio::test]
    async fn send_captures_and_assigns_ids() {
        let client = MockChatClient::new();
        let first = client
            .send(OutboundMessage::plain(ChatTarget::SavedMessages, "one"))
            .await
            .unwrap();
        let second = client
            .send(OutboundMessage::plain(ChatTarget::SavedMessages, "two"))
            .await
            .unwrap();
        assert_eq!(second, first + 1);
        assert_eq!(client.sent_messages().await.len(), 2);

        client.clear().await;
        assert!(client.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn markdown_failure_leaves_plain_working() {
        let client = MockChatClient::new();
        client.fail_markdown(true);
        assert!(
            client
                .send(OutboundMessage::markdown(ChatTarget::SavedMessages, "**x**"))
                .await
                .is_err()
        );
        assert!(
            client
                .send(OutboundMessage::plain(ChatTarget::SavedMessages, "x"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn injected_messages_reach_subscriber() {
        let client = MockChatClient::new();
        let chat = group_chat(-100, "Видео", None);
        assert!(!client.inject(message(&chat, 1, "early")).await);

        let mut rx = client.subscribe(std::slice::from_ref(&chat)).await.unwrap();
        assert!(client.inject(message(&chat, 2, "live")).await);
        assert_eq!(rx.recv().await.unwrap().text, "live");

        client.disconnect().await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn me_target_depends_on_account_kind() {
        let client = MockChatClient::new();
        assert_eq!(
            client.resolve_target("me").await.unwrap(),
            ChatTarget::SavedMessages
        );
        client.supports_saved_messages(false);
        assert!(client.resolve_target("me").await.is_err());
        assert_eq!(
            client.resolve_target("12345").await.unwrap(),
            ChatTarget::Chat {
                id: 12345,
                display: "12345".into()
            }
        );
    }
}
