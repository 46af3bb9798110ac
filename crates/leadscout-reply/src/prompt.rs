// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt construction, response cleaning, and fallback templates.

use std::sync::LazyLock;

use leadscout_core::QualityTier;
use rand::seq::SliceRandom;
use regex::Regex;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Marker the prompt ends with; models often echo it.
const ANSWER_MARKER: &str = "Ответ:";

/// Replies at or below this many characters are treated as empty.
pub const MIN_REPLY_CHARS: usize = 10;

pub const DEFAULT_SENDER_NAME: &str = "Клиент";

const HOT_TEMPLATES: [&str; 2] = [
    "Привет! Вижу вам нужен видеопродюсер 🎬 У меня большой опыт в этой сфере. Напишите мне в личные сообщения - обсудим ваш проект детально!",
    "Здравствуйте! Отлично, что ищете профессионала для видео 🎥 Готов помочь с вашим проектом. Пишите в ЛС - обговорим все детали!",
];

const GOOD_TEMPLATES: [&str; 2] = [
    "Привет! Могу помочь с видеопродакшеном 🎬 Есть портфолио и опыт. Напишите в личку - обсудим ваши задачи!",
    "Здравствуйте! Вижу нужен видеопродюсер 🎥 С удовольствием помогу. Пишите в ЛС!",
];

const OTHER_TEMPLATES: [&str; 2] = [
    "Привет! Помогу с видеопроизводством 🎬 Напишите в личные сообщения для обсуждения деталей.",
    "Здравствуйте! Готов помочь с вашим видеопроектом 🎥 Пишите в ЛС!",
];

fn urgency(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::Hot => "Это важный клиент!",
        QualityTier::Good => "Хороший клиент.",
        QualityTier::Normal | QualityTier::LowQuality => "Обычный запрос.",
    }
}

/// Builds the single-turn prompt for a lead message.
pub fn build_prompt(message_text: &str, tier: QualityTier, sender_name: &str) -> String {
    let name = if sender_name.trim().is_empty() {
        DEFAULT_SENDER_NAME
    } else {
        sender_name.trim()
    };
    format!(
        "Ты профессиональный видеопродюсер и отвечаешь клиенту в Telegram {tone}. {urgency}\n\n\
         ИМЯ КЛИЕНТА: {name}\n\
         СООБЩЕНИЕ КЛИЕНТА: \"{message_text}\"\n\n\
         ВАЖНО: отвечай без тегов <think> и без размышлений, только готовый ответ!\n\n\
         Напиши короткий ответ на русском языке:\n\
         - Поприветствуй клиента по имени\n\
         - Покажи понимание его потребности\n\
         - Предложи свою помощь\n\
         - Попроси написать в личные сообщения\n\
         - Используй 1-2 эмодзи\n\
         - Максимум 80 слов\n\n\
         {ANSWER_MARKER}",
        tone = tier.tone(),
        urgency = urgency(tier),
    )
}

/// Strips reasoning blocks, collapses whitespace, and keeps only the text
/// after the last answer marker.
pub fn clean_response(raw: &str) -> String {
    let without_think = THINK_BLOCK.replace_all(raw, "");
    let collapsed = WHITESPACE.replace_all(without_think.trim(), " ");
    let answer: &str = match collapsed.rfind(ANSWER_MARKER) {
        Some(idx) => &collapsed[idx + ANSWER_MARKER.len()..],
        None => &collapsed,
    };
    answer.trim().to_string()
}

/// Whether a reply carries enough text to be worth sending.
pub fn is_substantial(text: &str) -> bool {
    text.chars().count() > MIN_REPLY_CHARS
}

/// The fixed template set for a tier.
pub fn fallback_templates(tier: QualityTier) -> &'static [&'static str] {
    match tier {
        QualityTier::Hot => &HOT_TEMPLATES,
        QualityTier::Good => &GOOD_TEMPLATES,
        QualityTier::Normal | QualityTier::LowQuality => &OTHER_TEMPLATES,
    }
}

/// A random template for the tier.
pub fn fallback_reply(tier: QualityTier) -> String {
    let templates = fallback_templates(tier);
    templates
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(templates[0])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_tone_name_and_message() {
        let prompt = build_prompt("Ищу видеопродюсера", QualityTier::Hot, "Анна");
        assert!(prompt.contains("очень заинтересованно и профессионально"));
        assert!(prompt.contains("ИМЯ КЛИЕНТА: Анна"));
        assert!(prompt.contains("\"Ищу видеопродюсера\""));
        assert!(prompt.contains("80 слов"));
        assert!(prompt.ends_with("Ответ:"));

        let anonymous = build_prompt("x", QualityTier::LowQuality, "  ");
        assert!(anonymous.contains("ИМЯ КЛИЕНТА: Клиент"));
        assert!(anonymous.contains("вежливо и кратко"));
    }

    #[test]
    fn cleaning_removes_multiline_think_blocks() {
        let raw = "<think>\nthe user wants\na producer\n</think>\n\nЗдравствуйте!   Готов   помочь.";
        assert_eq!(clean_response(raw), "Здравствуйте! Готов помочь.");
    }

    #[test]
    fn cleaning_keeps_text_after_last_marker() {
        let raw = "Ответ: черновик\nОтвет:  Привет, Анна! Пишите в ЛС 🎬";
        assert_eq!(clean_response(raw), "Привет, Анна! Пишите в ЛС 🎬");
    }

    #[test]
    fn cleaning_can_leave_nothing() {
        assert_eq!(clean_response("<think>only thoughts</think>"), "");
        assert!(!is_substantial(&clean_response("<think>x</think> Ок!")));
    }

    #[test]
    fn substantial_counts_characters_not_bytes() {
        assert!(!is_substantial("Привет!!!!"));
        assert!(is_substantial("Привет!!!!!"));
    }

    #[test]
    fn fallback_comes_from_tier_set() {
        for tier in [
            QualityTier::Hot,
            QualityTier::Good,
            QualityTier::Normal,
            QualityTier::LowQuality,
        ] {
            for _ in 0..10 {
                let reply = fallback_reply(tier);
                assert!(fallback_templates(tier).contains(&reply.as_str()));
            }
        }
        assert_eq!(
            fallback_templates(QualityTier::Normal),
            fallback_templates(QualityTier::LowQuality)
        );
    }
}
