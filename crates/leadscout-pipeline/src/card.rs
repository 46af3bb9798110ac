// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing texts: the lead card and the auto-reply notification.

use leadscout_core::{ChatMessage, QualityTier, Sender};
use leadscout_scoring::ScoreCard;

const AUTO_REPLY_SCHEDULED: &str = "🤖 Together.ai автоответ запланирован";
const MANUAL_REPLY: &str = "💬 Ручной ответ";
const UNKNOWN_SENDER: &str = "unknown";

/// Card status line for a lead.
pub fn reply_status(auto_reply_enabled: bool, score: i32) -> &'static str {
    if auto_reply_enabled && score >= 0 {
        AUTO_REPLY_SCHEDULED
    } else {
        MANUAL_REPLY
    }
}

/// Everything a card shows about one lead.
#[derive(Debug, Clone)]
pub struct LeadCard<'a> {
    pub message: &'a ChatMessage,
    pub score: &'a ScoreCard,
    pub lead_id: i64,
    pub auto_reply_enabled: bool,
}

impl LeadCard<'_> {
    fn author(&self) -> String {
        self.message
            .sender
            .as_ref()
            .map(Sender::clickable)
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string())
    }

    /// The card in markdown, one field per line.
    pub fn render(&self) -> String {
        let message = self.message;
        let mut lines = vec![
            format!("👀 **Найдено в:** \n {}", message.chat.display_title()),
            format!("⏰ **{}**", message.date.format("%Y-%m-%d %H:%M:%S")),
            format!("✏️ **Автор:** \n {}", self.author()),
            format!(
                "🎯 **Качество:** \n {} (очки: {})",
                self.score.tier.display(),
                self.score.score
            ),
            format!(
                "🤖 **Статус:** {}",
                reply_status(self.auto_reply_enabled, self.score.score)
            ),
            format!("🆔 **ID лида:** {}", self.lead_id),
        ];

        if !self.score.reasons.is_empty() {
            lines.push(format!(
                "📊 **Причины:** \n {}",
                self.score.reasons.join(", ")
            ));
        }

        if let Some(link) = message.chat.message_link(message.message_id) {
            lines.push(format!("🔗 {link}"));
        }

        lines.join("\n")
    }
}

/// Fallback for when markdown delivery fails: mention links become
/// `name (ID: 123)`.
pub fn plain_variant(markdown: &str) -> String {
    markdown.replace('[', "").replace("](tg://user?id=", " (ID: ")
}

/// Operator notification sent after an auto-reply goes out.
pub fn reply_notification(reply: &str, tier: QualityTier, count: u32, max: u32) -> String {
    format!(
        "🤖 **TOGETHER.AI АВТООТВЕТ**\n\n📝 **Ответ:** {reply}\n\n📊 **Качество лида:** {}\n📈 **Счетчик:** {count}/{max}",
        tier.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use leadscout_core::{ChatInfo, ChatKind};

    fn message(username: Option<&str>, sender: Option<Sender>) -> ChatMessage {
        ChatMessage {
            chat: ChatInfo {
                id: -100,
                title: Some("Видео Москва".into()),
                username: username.map(String::from),
                kind: ChatKind::Supergroup,
            },
            message_id: 55,
            date: Utc.with_ymd_and_hms(2026, 3, 2, 9, 5, 7).unwrap(),
            sender,
            text: "Ищу видеопродюсера срочно".into(),
        }
    }

    fn named_sender() -> Sender {
        Sender {
            id: 42,
            username: None,
            first_name: Some("Анна".into()),
            last_name: Some("К".into()),
        }
    }

    fn score(points: i32, reasons: &[&str]) -> ScoreCard {
        ScoreCard {
            score: points,
            tier: QualityTier::from_score(points),
            reasons: reasons.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn full_card_layout() {
        let msg = message(Some("video_msk"), Some(named_sender()));
        let card = score(5, &["Срочность", "Бюджет"]);
        let text = LeadCard {
            message: &msg,
            score: &card,
            lead_id: 12,
            auto_reply_enabled: true,
        }
        .render();

        let expected = [
            "👀 **Найдено в:** \n Видео Москва",
            "⏰ **2026-03-02 09:05:07**",
            "✏️ **Автор:** \n [Анна К](tg://user?id=42)",
            "🎯 **Качество:** \n 🔥 ГОРЯЧИЙ ЛИД (очки: 5)",
            "🤖 **Статус:** 🤖 Together.ai автоответ запланирован",
            "🆔 **ID лида:** 12",
            "📊 **Причины:** \n Срочность, Бюджет",
            "🔗 https://t.me/video_msk/55",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn optional_lines_are_omitted() {
        let msg = message(None, None);
        let card = score(0, &[]);
        let text = LeadCard {
            message: &msg,
            score: &card,
            lead_id: 0,
            auto_reply_enabled: false,
        }
        .render();

        assert!(!text.contains("Причины"));
        assert!(!text.contains("🔗"));
        assert!(text.contains("✏️ **Автор:** \n unknown"));
        assert!(text.contains("🤖 **Статус:** 💬 Ручной ответ"));
        assert!(text.ends_with("🆔 **ID лида:** 0"));
    }

    #[test]
    fn negative_score_is_manual_even_with_auto_reply() {
        assert_eq!(reply_status(true, -1), MANUAL_REPLY);
        assert_eq!(reply_status(true, 0), AUTO_REPLY_SCHEDULED);
        assert_eq!(reply_status(false, 7), MANUAL_REPLY);
    }

    #[test]
    fn plain_variant_unwraps_mentions() {
        let plain = plain_variant("✏️ **Автор:** \n [Анна К](tg://user?id=42)");
        assert_eq!(plain, "✏️ **Автор:** \n Анна К (ID: 42)");
    }

    #[test]
    fn notification_includes_counter() {
        let text = reply_notification("Привет!", QualityTier::Good, 3, 30);
        assert!(text.starts_with("🤖 **TOGETHER.AI АВТООТВЕТ**\n\n📝 **Ответ:** Привет!"));
        assert!(text.contains("📊 **Качество лида:** 🟡 ХОРОШИЙ ЛИД"));
        assert!(text.ends_with("📈 **Счетчик:** 3/30"));
    }
}
