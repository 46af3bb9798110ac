// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal tables used by the quality scorer.
//!
//! A signal is a lower-case phrase, the points it contributes when the phrase
//! occurs anywhere in the message, and the reason shown to the operator.
//! Tables are ordered; the order of reasons on a lead follows table order.

use serde::{Deserialize, Serialize};

/// One scoring rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub phrase: String,
    pub points: i32,
    pub reason: String,
}

impl Signal {
    pub fn new(phrase: &str, points: i32, reason: &str) -> Self {
        Self {
            phrase: phrase.to_lowercase(),
            points,
            reason: reason.to_string(),
        }
    }
}

/// Ordered positive and negative signals.
///
/// Positives are always evaluated before negatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTable {
    pub positive: Vec<Signal>,
    pub negative: Vec<Signal>,
}

impl SignalTable {
    pub fn new(positive: Vec<Signal>, negative: Vec<Signal>) -> Self {
        Self { positive, negative }
    }

    /// Signals tuned for video-production leads in Russian-speaking chats.
    pub fn video_production() -> Self {
        let positive = vec![
            Signal::new("бюджет", 3, "💰 Упоминает бюджет"),
            Signal::new("готов платить", 3, "💰 Готов платить"),
            Signal::new("плачу", 3, "💰 Готов платить"),
            Signal::new("оплачу", 3, "💰 Готов платить"),
            Signal::new("срочно", 2, "⚡ Срочная потребность"),
            Signal::new("deadline", 2, "📅 Есть дедлайн"),
            Signal::new("дедлайн", 2, "📅 Есть дедлайн"),
            Signal::new("опытного", 2, "⭐ Ищет опытного специалиста"),
            Signal::new("портфолио", 2, "📁 Интересует портфолио"),
            Signal::new("примеры работ", 2, "📁 Хочет видеть примеры"),
            Signal::new("техническое задание", 2, "📋 Есть ТЗ"),
            Signal::new("тз", 1, "📋 Есть ТЗ"),
            Signal::new("профессионал", 2, "⭐ Ищет профессионала"),
            Signal::new("качественно", 1, "✨ Важно качество"),
            Signal::new("быстро", 2, "⚡ Нужно быстро"),
        ];

        let negative = vec![
            Signal::new("бесплатно", -5, "🚫 Ищет бесплатно"),
            Signal::new("даром", -5, "🚫 Ищет даром"),
            Signal::new("без оплаты", -5, "🚫 Без оплаты"),
            Signal::new("взаимозачет", -3, "🤝 Взаимозачет"),
            Signal::new("процент", -2, "📈 Процент от прибыли"),
            Signal::new("стажер", -2, "👶 Ищет стажера"),
            Signal::new("новичок", -1, "👶 Ищет новичка"),
            Signal::new("дешево", -2, "💸 Ищет дешево"),
            Signal::new("недорого", -1, "💸 Ищет недорого"),
        ];

        Self { positive, negative }
    }

    /// Positive signals followed by negative signals, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.positive.iter().chain(self.negative.iter())
    }
}

impl Default for SignalTable {
    fn default() -> Self {
        Self::video_production()
    }
}
