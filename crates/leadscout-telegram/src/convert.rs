// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from teloxide types into the chat-agnostic domain types.

use leadscout_core::{ChatInfo, ChatKind, ChatMessage, Sender};
use teloxide::types::{Chat, ChatFullInfo, Message, User};

fn kind_of(private: bool, group: bool, supergroup: bool) -> ChatKind {
    if private {
        ChatKind::Private
    } else if group {
        ChatKind::Group
    } else if supergroup {
        ChatKind::Supergroup
    } else {
        ChatKind::Channel
    }
}

/// Chat metadata carried on every message.
pub fn chat_info(chat: &Chat) -> ChatInfo {
    ChatInfo {
        id: chat.id.0,
        title: chat.title().map(str::to_string),
        username: chat.username().map(str::to_string),
        kind: kind_of(chat.is_private(), chat.is_group(), chat.is_supergroup()),
    }
}

/// Chat metadata returned by `getChat`.
pub fn full_chat_info(chat: &ChatFullInfo) -> ChatInfo {
    ChatInfo {
        id: chat.id.0,
        title: chat.title().map(str::to_string),
        username: chat.username().map(str::to_string),
        kind: kind_of(chat.is_private(), chat.is_group(), chat.is_supergroup()),
    }
}

pub fn sender(user: &User) -> Sender {
    Sender {
        // Telegram user ids fit in 52 bits.
        id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()).filter(|n| !n.is_empty()),
        last_name: user.last_name.clone(),
    }
}

/// Converts a message carrying text or a caption.
///
/// Service messages, stickers and captionless media return `None`.
pub fn to_chat_message(msg: &Message) -> Option<ChatMessage> {
    let text = msg.text().or_else(|| msg.caption())?;
    Some(ChatMessage {
        chat: chat_info(&msg.chat),
        message_id: i64::from(msg.id.0),
        date: msg.date,
        sender: msg.from.as_ref().map(sender),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a supergroup message from JSON, matching the Bot API structure.
    fn group_message(username: Option<&str>, from: serde_json::Value, body: serde_json::Value) -> Message {
        let mut chat = serde_json::json!({
            "id": -1001234567890i64,
            "type": "supergroup",
            "title": "Видео Продакшн",
        });
        if let Some(name) = username {
            chat["username"] = serde_json::json!(name);
        }
        let mut json = serde_json::json!({
            "message_id": 77,
            "date": 1700000000i64,
            "chat": chat,
            "from": from,
        });
        if let (Some(target), Some(extra)) = (json.as_object_mut(), body.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn user(username: Option<&str>) -> serde_json::Value {
        let mut from = serde_json::json!({
            "id": 4242,
            "is_bot": false,
            "first_name": "Анна",
            "last_name": "Смирнова",
        });
        if let Some(name) = username {
            from["username"] = serde_json::json!(name);
        }
        from
    }

    #[test]
    fn text_message_maps_all_fields() {
        let msg = group_message(
            Some("videochat"),
            user(Some("anna_s")),
            serde_json::json!({"text": "Ищу видеопродюсера"}),
        );
        let converted = to_chat_message(&msg).expect("text message converts");

        assert_eq!(converted.message_id, 77);
        assert_eq!(converted.text, "Ищу видеопродюсера");
        assert_eq!(converted.date.timestamp(), 1_700_000_000);
        assert_eq!(converted.chat.id, -1001234567890);
        assert_eq!(converted.chat.kind, ChatKind::Supergroup);
        assert_eq!(converted.chat.source_key(), "videochat");
        assert_eq!(converted.chat.display_title(), "Видео Продакшн");
        assert_eq!(converted.sender_display(), "@anna_s");
    }

    #[test]
    fn caption_is_used_when_text_is_absent() {
        let msg = group_message(
            None,
            user(None),
            serde_json::json!({
                "caption": "нужен монтажер",
                "photo": [{
                    "file_id": "f",
                    "file_unique_id": "u",
                    "width": 10,
                    "height": 10,
                }],
            }),
        );
        let converted = to_chat_message(&msg).expect("captioned photo converts");
        assert_eq!(converted.text, "нужен монтажер");
        assert_eq!(converted.chat.source_key(), "chat_-1001234567890");
    }

    #[test]
    fn location_without_text_is_skipped() {
        let msg = group_message(
            None,
            user(None),
            serde_json::json!({
                "location": {"latitude": 55.75, "longitude": 37.62},
            }),
        );
        assert!(to_chat_message(&msg).is_none());
    }

    #[test]
    fn sender_without_username_uses_full_name() {
        let msg = group_message(None, user(None), serde_json::json!({"text": "привет"}));
        let converted = to_chat_message(&msg).expect("converts");
        let sender = converted.sender.expect("has sender");
        assert_eq!(sender.id, 4242);
        assert_eq!(sender.display(), "Анна Смирнова");
        assert_eq!(sender.clickable(), "[Анна Смирнова](tg://user?id=4242)");
    }

    #[test]
    fn private_chat_kind() {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {"id": 4242, "type": "private", "first_name": "Анна"},
            "from": user(None),
            "text": "hi",
        });
        let msg: Message = serde_json::from_value(json).expect("private message");
        assert_eq!(chat_info(&msg.chat).kind, ChatKind::Private);
    }
}
