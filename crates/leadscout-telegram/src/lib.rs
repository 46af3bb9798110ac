// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat client for LeadScout.
//!
//! Implements [`ChatClient`] over the Telegram Bot API via teloxide. Live
//! messages arrive through a long-polling dispatcher. The Bot API has no
//! history endpoint, so history is served from the backlog of updates
//! Telegram retains for the bot (up to 24 hours), drained once per scan.

pub mod convert;
pub mod markdown;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use leadscout_config::model::TelegramConfig;
use leadscout_core::{
    AdapterType, ChatClient, ChatInfo, ChatMessage, ChatRef, ChatTarget, HealthStatus,
    LeadscoutError, OutboundMessage, PluginAdapter, TextFormat,
};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode, Recipient, ReplyParameters, UpdateKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Messages retained per chat from the update backlog.
const BACKLOG_PER_CHAT: usize = 1000;

/// Capacity of the live subscription channel.
const SUBSCRIPTION_BUFFER: usize = 100;

/// Bot API page size for `getUpdates`.
const UPDATES_PAGE: u8 = 100;

fn request_err(context: &str, e: teloxide::RequestError) -> LeadscoutError {
    LeadscoutError::Chat {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn message_id(id: i64) -> Result<MessageId, LeadscoutError> {
    i32::try_from(id)
        .map(MessageId)
        .map_err(|_| LeadscoutError::chat(format!("message id {id} out of range")))
}

fn target_chat(target: &ChatTarget) -> Result<ChatId, LeadscoutError> {
    match target {
        ChatTarget::Chat { id, .. } => Ok(ChatId(*id)),
        ChatTarget::SavedMessages => Err(LeadscoutError::chat(
            "bot accounts have no saved messages; set FORWARD_TO to a chat id",
        )),
    }
}

/// Telegram chat client implementing [`ChatClient`].
pub struct TelegramClient {
    bot: Bot,
    backlog: Mutex<HashMap<i64, VecDeque<ChatMessage>>>,
    /// Next `getUpdates` offset; `None` until the first update is confirmed.
    offset: tokio::sync::Mutex<Option<i32>>,
    polling: Mutex<Option<tokio::task::JoinHandle<()>>>,
    connected: AtomicBool,
}

impl TelegramClient {
    /// Creates a client from configuration.
    ///
    /// Requires `telegram.bot_token` or `TELEGRAM_BOT_TOKEN`.
    pub fn new(config: &TelegramConfig) -> Result<Self, LeadscoutError> {
        let token = config.resolved_bot_token().ok_or_else(|| {
            LeadscoutError::Config(
                "telegram.bot_token or TELEGRAM_BOT_TOKEN is required for the Telegram client"
                    .into(),
            )
        })?;
        Ok(Self::with_bot(Bot::new(token)))
    }

    /// Wraps an already constructed bot.
    pub fn with_bot(bot: Bot) -> Self {
        Self {
            bot,
            backlog: Mutex::new(HashMap::new()),
            offset: tokio::sync::Mutex::new(None),
            polling: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Points the bot at a different Bot API server.
    pub fn with_api_url(self, url: &str) -> Result<Self, LeadscoutError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| LeadscoutError::Config(format!("invalid Bot API url {url}: {e}")))?;
        Ok(Self::with_bot(self.bot.set_api_url(url)))
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Verifies the token with `getMe` and marks the client connected.
    pub async fn connect(&self) -> Result<(), LeadscoutError> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| request_err("failed to authorize bot", e))?;
        info!(bot = ?me.user.username, "connected to Telegram");
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn polling_active(&self) -> bool {
        self.polling
            .lock()
            .map(|guard| guard.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    fn remember(&self, message: ChatMessage) {
        let Ok(mut backlog) = self.backlog.lock() else {
            return;
        };
        let queue = backlog.entry(message.chat.id).or_default();
        if queue.len() == BACKLOG_PER_CHAT {
            queue.pop_front();
        }
        queue.push_back(message);
    }

    /// Pulls every pending update into the backlog and confirms it.
    ///
    /// Returns the number of messages added. Must not run while the live
    /// dispatcher is polling, since Telegram allows one `getUpdates` consumer.
    pub async fn drain_pending(&self) -> Result<usize, LeadscoutError> {
        let mut offset = self.offset.lock().await;
        let mut drained = 0;

        loop {
            let mut request = self.bot.get_updates().limit(UPDATES_PAGE).timeout(0);
            if let Some(next) = *offset {
                request = request.offset(next);
            }
            let updates = request
                .await
                .map_err(|e| request_err("failed to fetch pending updates", e))?;
            if updates.is_empty() {
                break;
            }

            for update in updates {
                *offset = Some(update.id.as_offset());
                if let UpdateKind::Message(msg) = update.kind
                    && let Some(message) = convert::to_chat_message(&msg)
                {
                    self.remember(message);
                    drained += 1;
                }
            }
        }

        debug!(drained, "drained pending updates");
        Ok(drained)
    }
}

#[async_trait]
impl PluginAdapter for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Chat
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadscoutError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), LeadscoutError> {
        debug!("Telegram client shutting down");
        if let Ok(mut polling) = self.polling.lock()
            && let Some(handle) = polling.take()
        {
            handle.abort();
        }
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ChatClient for TelegramClient {
    async fn resolve_chat(&self, reference: &ChatRef) -> Result<ChatInfo, LeadscoutError> {
        let recipient = match reference {
            ChatRef::Username(name) => Recipient::ChannelUsername(format!("@{name}")),
            ChatRef::Id(id) => Recipient::Id(ChatId(*id)),
            ChatRef::Invite(_) => {
                return Err(LeadscoutError::Resolution {
                    reference: reference.to_string(),
                    message: "invite links cannot be resolved by a bot; add the bot to the chat \
                              and list its id instead"
                        .into(),
                });
            }
        };

        let chat = self
            .bot
            .get_chat(recipient)
            .await
            .map_err(|e| LeadscoutError::Resolution {
                reference: reference.to_string(),
                message: e.to_string(),
            })?;
        Ok(convert::full_chat_info(&chat))
    }

    async fn resolve_target(&self, raw: &str) -> Result<ChatTarget, LeadscoutError> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("me") {
            return Err(LeadscoutError::Resolution {
                reference: raw.to_string(),
                message: "bot accounts have no saved messages".into(),
            });
        }
        let reference = ChatRef::parse(raw).ok_or_else(|| LeadscoutError::Resolution {
            reference: raw.to_string(),
            message: "empty target".into(),
        })?;
        let chat = self.resolve_chat(&reference).await?;
        let display = match &reference {
            ChatRef::Username(name) => format!("@{name}"),
            _ => chat.display_title(),
        };
        Ok(ChatTarget::Chat {
            id: chat.id,
            display,
        })
    }

    async fn history(
        &self,
        chat: &ChatInfo,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, LeadscoutError> {
        if !self.polling_active() {
            self.drain_pending().await?;
        }
        let backlog = self
            .backlog
            .lock()
            .map_err(|_| LeadscoutError::Internal("telegram backlog lock poisoned".into()))?;
        Ok(backlog
            .get(&chat.id)
            .map(|queue| queue.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn subscribe(
        &self,
        chats: &[ChatInfo],
    ) -> Result<mpsc::Receiver<ChatMessage>, LeadscoutError> {
        let mut polling = self
            .polling
            .lock()
            .map_err(|_| LeadscoutError::Internal("telegram polling lock poisoned".into()))?;
        if polling.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(LeadscoutError::chat("already subscribed"));
        }

        let watched: Arc<HashSet<i64>> = Arc::new(chats.iter().map(|c| c.id).collect());
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let bot = self.bot.clone();

        info!(chats = watched.len(), "starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                let watched = watched.clone();
                async move {
                    if !watched.contains(&msg.chat.id.0) {
                        debug!(chat_id = msg.chat.id.0, "ignoring unwatched chat");
                        return respond(());
                    }
                    match convert::to_chat_message(&msg) {
                        Some(message) => {
                            if tx.send(message).await.is_err() {
                                warn!("subscription channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(msg_id = msg.id.0, "ignoring message without text");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        *polling = Some(handle);
        Ok(rx)
    }

    async fn send(&self, msg: OutboundMessage) -> Result<i64, LeadscoutError> {
        let chat_id = target_chat(&msg.target)?;

        let mut request = match msg.format {
            TextFormat::Markdown => self
                .bot
                .send_message(chat_id, markdown::to_markdown_v2(&msg.text))
                .parse_mode(ParseMode::MarkdownV2),
            TextFormat::Plain => self.bot.send_message(chat_id, msg.text),
        };
        if let Some(reply_to) = msg.reply_to {
            request = request.reply_parameters(ReplyParameters::new(message_id(reply_to)?));
        }

        let sent = request
            .await
            .map_err(|e| request_err("failed to send message", e))?;
        Ok(i64::from(sent.id.0))
    }

    async fn forward(
        &self,
        target: &ChatTarget,
        message: &ChatMessage,
    ) -> Result<(), LeadscoutError> {
        let to = target_chat(target)?;
        self.bot
            .forward_message(to, ChatId(message.chat.id), message_id(message.message_id)?)
            .await
            .map_err(|e| request_err("failed to forward message", e))?;
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11";

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            forward_to: "env".into(),
            bot_token: token.map(String::from),
        }
    }

    fn client_for(server: &MockServer) -> TelegramClient {
        TelegramClient::with_bot(Bot::new(TOKEN))
            .with_api_url(&server.uri())
            .expect("valid mock url")
    }

    fn group(id: i64) -> ChatInfo {
        ChatInfo {
            id,
            title: Some("Группа".into()),
            username: None,
            kind: leadscout_core::ChatKind::Supergroup,
        }
    }

    fn message_json(message_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
        serde_json::json!({
            "message_id": message_id,
            "date": 1700000000i64,
            "chat": {"id": chat_id, "type": "supergroup", "title": "Группа"},
            "from": {"id": 7, "is_bot": false, "first_name": "Олег"},
            "text": text,
        })
    }

    #[test]
    fn new_accepts_configured_token() {
        assert!(TelegramClient::new(&config(Some(TOKEN))).is_ok());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let client = TelegramClient::new(&config(Some(TOKEN))).unwrap();
        assert_eq!(client.name(), "telegram");
        assert_eq!(client.version(), semver::Version::new(0, 1, 0));
        assert_eq!(client.adapter_type(), AdapterType::Chat);
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let client = TelegramClient::new(&config(Some(TOKEN))).unwrap();
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn saved_messages_target_is_unsupported() {
        let client = TelegramClient::new(&config(Some(TOKEN))).unwrap();
        let result = client
            .send(OutboundMessage::plain(ChatTarget::SavedMessages, "card"))
            .await;
        assert!(matches!(result, Err(LeadscoutError::Chat { .. })));

        let target = client.resolve_target("me").await;
        assert!(matches!(target, Err(LeadscoutError::Resolution { .. })));
    }

    #[tokio::test]
    async fn invite_links_do_not_resolve() {
        let client = TelegramClient::new(&config(Some(TOKEN))).unwrap();
        let result = client
            .resolve_chat(&ChatRef::Invite("AbCdEf".into()))
            .await;
        match result {
            Err(LeadscoutError::Resolution { reference, .. }) => {
                assert_eq!(reference, "https://t.me/+AbCdEf");
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn markdown_send_uses_markdown_v2_and_reply_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)/sendmessage$"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": -100500,
                "text": "*ID лида:* 5",
                "parse_mode": "MarkdownV2",
                "reply_parameters": {"message_id": 9},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": message_json(321, -100500, "ID лида: 5"),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut msg = OutboundMessage::markdown(
            ChatTarget::Chat {
                id: -100500,
                display: "Группа".into(),
            },
            "**ID лида:** 5",
        );
        msg.reply_to = Some(9);
        let sent = client.send(msg).await.expect("send succeeds");
        assert_eq!(sent, 321);
    }

    #[tokio::test]
    async fn api_errors_surface_as_chat_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)/sendmessage$"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client
            .send(OutboundMessage::plain(
                ChatTarget::Chat {
                    id: 1,
                    display: "1".into(),
                },
                "hello",
            ))
            .await;
        assert!(matches!(result, Err(LeadscoutError::Chat { .. })));
    }

    #[tokio::test]
    async fn history_drains_backlog_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)/getupdates$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 10, "message": message_json(1, -100500, "первое")},
                    {"update_id": 11, "message": message_json(2, -100777, "чужое")},
                    {"update_id": 12, "message": message_json(3, -100500, "второе")},
                ],
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)/getupdates$"))
            .and(body_partial_json(serde_json::json!({"offset": 13})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let history = client.history(&group(-100500), 10).await.expect("history");
        let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["второе", "первое"]);

        let limited = client.history(&group(-100777), 10).await.expect("history");
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].message_id, 2);
    }
}
