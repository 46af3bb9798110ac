// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat client trait for the messaging account that reads chats and forwards leads.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::LeadscoutError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatInfo, ChatMessage, ChatRef, ChatTarget, OutboundMessage};

/// Access to the Telegram account that monitors chats.
///
/// Implementations own the connection. The pipeline never touches the wire
/// protocol directly.
#[async_trait]
pub trait ChatClient: PluginAdapter {
    /// Resolves a chat reference into a concrete chat.
    ///
    /// Broadcast channels resolve successfully with [`ChatKind::Channel`](crate::types::ChatKind::Channel);
    /// the caller decides to skip them.
    async fn resolve_chat(&self, reference: &ChatRef) -> Result<ChatInfo, LeadscoutError>;

    /// Resolves the operator target (`me`, `@username`, or a numeric id).
    async fn resolve_target(&self, raw: &str) -> Result<ChatTarget, LeadscoutError>;

    /// Returns up to `limit` messages from the chat history, newest first.
    async fn history(
        &self,
        chat: &ChatInfo,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, LeadscoutError>;

    /// Starts pushing new messages from the given chats into a channel.
    ///
    /// The receiver yields `None` once the underlying connection stops.
    async fn subscribe(
        &self,
        chats: &[ChatInfo],
    ) -> Result<mpsc::Receiver<ChatMessage>, LeadscoutError>;

    /// Sends a message and returns the id assigned to it.
    async fn send(&self, msg: OutboundMessage) -> Result<i64, LeadscoutError>;

    /// Forwards the original message to the target.
    async fn forward(
        &self,
        target: &ChatTarget,
        message: &ChatMessage,
    ) -> Result<(), LeadscoutError>;

    /// Whether the client currently holds a live connection.
    async fn is_connected(&self) -> bool;
}
