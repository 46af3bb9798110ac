// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the pipeline, storage, and adapter crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Chat,
    Oracle,
    Storage,
    Publisher,
}

// --- Lead quality ---

/// Quality tier of a lead, derived from its score.
///
/// The same thresholds classify a freshly scored message and bucket the
/// daily statistics, so both always go through [`QualityTier::from_score`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityTier {
    Hot,
    Good,
    Normal,
    LowQuality,
}

impl QualityTier {
    /// Lower bound (inclusive) of the HOT tier.
    pub const HOT_MIN: i32 = 5;
    /// Lower bound (inclusive) of the GOOD tier.
    pub const GOOD_MIN: i32 = 2;
    /// Lower bound (inclusive) of the NORMAL tier.
    pub const NORMAL_MIN: i32 = 0;

    /// Classifies a score: `>= 5` HOT, `2..5` GOOD, `0..2` NORMAL, negative LOW_QUALITY.
    pub fn from_score(score: i32) -> Self {
        if score >= Self::HOT_MIN {
            Self::Hot
        } else if score >= Self::GOOD_MIN {
            Self::Good
        } else if score >= Self::NORMAL_MIN {
            Self::Normal
        } else {
            Self::LowQuality
        }
    }

    /// Stored tier code, e.g. `HOT`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Hot => "HOT",
            Self::Good => "GOOD",
            Self::Normal => "NORMAL",
            Self::LowQuality => "LOW_QUALITY",
        }
    }

    /// Tone instruction for drafted replies.
    pub fn tone(self) -> &'static str {
        match self {
            Self::Hot => "очень заинтересованно и профессионально",
            Self::Good => "дружелюбно и активно",
            Self::Normal | Self::LowQuality => "вежливо и кратко",
        }
    }

    /// Operator-facing label used on cards and notifications.
    pub fn display(self) -> &'static str {
        match self {
            Self::Hot => "🔥 ГОРЯЧИЙ ЛИД",
            Self::Good => "🟡 ХОРОШИЙ ЛИД",
            Self::Normal => "🟢 ОБЫЧНЫЙ ЛИД",
            Self::LowQuality => "🔴 НИЗКОЕ КАЧЕСТВО",
        }
    }

    /// Short priority tag for log lines about scheduled replies.
    pub fn priority(self) -> &'static str {
        match self {
            Self::Hot => "🔥 ГОРЯЧИЙ",
            Self::Good => "🟡 ХОРОШИЙ",
            Self::Normal | Self::LowQuality => "🟢 ОБЫЧНЫЙ",
        }
    }
}

// --- Chats and messages ---

/// Kind of a Telegram chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    /// Broadcast-only channel. Never scanned.
    Channel,
}

/// A resolved chat that can be scanned or watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
    pub kind: ChatKind,
}

impl ChatInfo {
    /// Canonical source key: the public username without `@`, else `chat_{id}`.
    pub fn source_key(&self) -> String {
        match self.username.as_deref().map(|u| u.trim_start_matches('@')) {
            Some(username) if !username.is_empty() => username.to_string(),
            _ => format!("chat_{}", self.id),
        }
    }

    /// Display title, falling back to the source key.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.source_key())
    }

    /// Public link to a message, available only for chats with a username.
    pub fn message_link(&self, message_id: i64) -> Option<String> {
        let username = self.username.as_deref()?.trim_start_matches('@');
        if username.is_empty() {
            return None;
        }
        Some(format!("https://t.me/{username}/{message_id}"))
    }

    pub fn is_broadcast(&self) -> bool {
        self.kind == ChatKind::Channel
    }
}

/// The author of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Sender {
    fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref().filter(|u| !u.is_empty())
    }

    /// Plain display string: `@username`, else the full name, else `id:{id}`.
    pub fn display(&self) -> String {
        if let Some(username) = self.username() {
            return format!("@{username}");
        }
        let name = self.full_name();
        if name.is_empty() {
            format!("id:{}", self.id)
        } else {
            name
        }
    }

    /// Markdown mention that opens the sender's profile when clicked.
    pub fn clickable(&self) -> String {
        if let Some(username) = self.username() {
            return format!("@{username}");
        }
        let name = self.full_name();
        let label = if name.is_empty() {
            "Пользователь".to_string()
        } else {
            name
        };
        format!("[{label}](tg://user?id={})", self.id)
    }

    /// First name for prompt personalization.
    pub fn first_name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.first_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(default)
    }
}

/// An inbound message observed in a monitored chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub chat: ChatInfo,
    pub message_id: i64,
    pub date: DateTime<Utc>,
    pub sender: Option<Sender>,
    pub text: String,
}

impl ChatMessage {
    pub fn sender_id(&self) -> Option<i64> {
        self.sender.as_ref().map(|s| s.id)
    }

    pub fn sender_display(&self) -> String {
        self.sender
            .as_ref()
            .map(Sender::display)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// One line of the chat source list, parsed but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatRef {
    /// Public username, stored without the leading `@`.
    Username(String),
    /// Numeric chat id (supergroups are negative).
    Id(i64),
    /// Private invite hash from a `t.me/+...` link.
    Invite(String),
}

impl ChatRef {
    /// Parses a chat reference.
    ///
    /// Accepts `@name`, `name`, numeric ids, `https://t.me/name` and
    /// `https://t.me/+hash` invite links. Returns `None` for blank lines.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let link = ["https://t.me/", "http://t.me/", "t.me/"]
            .iter()
            .find_map(|prefix| raw.strip_prefix(prefix));
        if let Some(path) = link {
            let path = path.trim_end_matches('/');
            if let Some(hash) = path.strip_prefix('+') {
                return Some(Self::Invite(hash.to_string()));
            }
            if let Some(hash) = path.strip_prefix("joinchat/") {
                return Some(Self::Invite(hash.to_string()));
            }
            let name = path.rsplit('/').next().unwrap_or(path);
            return (!name.is_empty()).then(|| Self::Username(name.to_string()));
        }

        if let Some(name) = raw.strip_prefix('@') {
            return (!name.is_empty()).then(|| Self::Username(name.to_string()));
        }

        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<i64>() {
                return Some(Self::Id(id));
            }
        }

        Some(Self::Username(raw.to_string()))
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(name) => write!(f, "@{name}"),
            Self::Id(id) => write!(f, "{id}"),
            Self::Invite(hash) => write!(f, "https://t.me/+{hash}"),
        }
    }
}

/// Where lead cards are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    /// The account's own saved-messages chat.
    SavedMessages,
    /// A concrete chat or user.
    Chat { id: i64, display: String },
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SavedMessages => f.write_str("Сохраненные сообщения"),
            Self::Chat { display, .. } => f.write_str(display),
        }
    }
}

/// Formatting applied to an outbound message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Markdown,
    Plain,
}

/// A message to be sent by a [`ChatClient`](crate::traits::ChatClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub target: ChatTarget,
    pub text: String,
    pub format: TextFormat,
    /// Message id in the target chat this one replies to.
    pub reply_to: Option<i64>,
}

impl OutboundMessage {
    pub fn markdown(target: ChatTarget, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            format: TextFormat::Markdown,
            reply_to: None,
        }
    }

    pub fn plain(target: ChatTarget, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            format: TextFormat::Plain,
            reply_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(username: Option<&str>, first: Option<&str>, last: Option<&str>) -> Sender {
        Sender {
            id: 42,
            username: username.map(String::from),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
        }
    }

    #[test]
    fn tier_thresholds_partition_scores() {
        assert_eq!(QualityTier::from_score(5), QualityTier::Hot);
        assert_eq!(QualityTier::from_score(4), QualityTier::Good);
        assert_eq!(QualityTier::from_score(2), QualityTier::Good);
        assert_eq!(QualityTier::from_score(1), QualityTier::Normal);
        assert_eq!(QualityTier::from_score(0), QualityTier::Normal);
        assert_eq!(QualityTier::from_score(-1), QualityTier::LowQuality);
    }

    #[test]
    fn tier_codes_round_trip() {
        use std::str::FromStr;
        assert_eq!(QualityTier::LowQuality.to_string(), "LOW_QUALITY");
        assert_eq!(QualityTier::from_str("HOT").unwrap(), QualityTier::Hot);
        let json = serde_json::to_string(&QualityTier::Good).unwrap();
        assert_eq!(json, "\"GOOD\"");
        for tier in [
            QualityTier::Hot,
            QualityTier::Good,
            QualityTier::Normal,
            QualityTier::LowQuality,
        ] {
            assert_eq!(tier.code(), tier.to_string());
        }
        assert_eq!(QualityTier::LowQuality.tone(), QualityTier::Normal.tone());
    }

    proptest::proptest! {
        #[test]
        fn tier_matches_threshold_definition(score in -1000i32..1000) {
            let expected = if score >= 5 {
                QualityTier::Hot
            } else if score >= 2 {
                QualityTier::Good
            } else if score >= 0 {
                QualityTier::Normal
            } else {
                QualityTier::LowQuality
            };
            proptest::prop_assert_eq!(QualityTier::from_score(score), expected);
        }
    }

    #[test]
    fn sender_display_prefers_username() {
        let s = sender(Some("ivan"), Some("Иван"), None);
        assert_eq!(s.display(), "@ivan");
        assert_eq!(s.clickable(), "@ivan");
    }

    #[test]
    fn sender_display_falls_back_to_name_then_id() {
        let named = sender(None, Some("Иван"), Some("Петров"));
        assert_eq!(named.display(), "Иван Петров");
        assert_eq!(named.clickable(), "[Иван Петров](tg://user?id=42)");

        let anonymous = sender(None, None, None);
        assert_eq!(anonymous.display(), "id:42");
        assert_eq!(anonymous.clickable(), "[Пользователь](tg://user?id=42)");
    }

    #[test]
    fn source_key_strips_sigil_and_falls_back_to_id() {
        let mut chat = ChatInfo {
            id: -100123,
            title: None,
            username: Some("@videomakers".into()),
            kind: ChatKind::Supergroup,
        };
        assert_eq!(chat.source_key(), "videomakers");
        assert_eq!(chat.display_title(), "videomakers");
        assert_eq!(
            chat.message_link(7).as_deref(),
            Some("https://t.me/videomakers/7")
        );

        chat.username = None;
        assert_eq!(chat.source_key(), "chat_-100123");
        assert!(chat.message_link(7).is_none());
    }

    #[test]
    fn chat_ref_parses_all_supported_forms() {
        assert_eq!(ChatRef::parse("@jetlag"), Some(ChatRef::Username("jetlag".into())));
        assert_eq!(ChatRef::parse("jetlag"), Some(ChatRef::Username("jetlag".into())));
        assert_eq!(
            ChatRef::parse("https://t.me/jetlag"),
            Some(ChatRef::Username("jetlag".into()))
        );
        assert_eq!(
            ChatRef::parse("https://t.me/+R_KxUQ"),
            Some(ChatRef::Invite("R_KxUQ".into()))
        );
        assert_eq!(ChatRef::parse("-1001234567890"), Some(ChatRef::Id(-1001234567890)));
        assert_eq!(ChatRef::parse("   "), None);
    }
}
