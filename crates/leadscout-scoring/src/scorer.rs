// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality scoring of candidate leads.

use leadscout_core::QualityTier;
use serde::{Deserialize, Serialize};

use crate::signals::SignalTable;

/// Result of scoring one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub score: i32,
    pub tier: QualityTier,
    /// Reasons of every signal that fired, in table order. Not deduplicated.
    pub reasons: Vec<String>,
}

/// Applies a [`SignalTable`] to message text.
#[derive(Debug, Clone, Default)]
pub struct QualityScorer {
    table: SignalTable,
}

impl QualityScorer {
    pub fn new(table: SignalTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SignalTable {
        &self.table
    }

    /// Scores `text` against every signal in table order.
    pub fn score(&self, text: &str) -> ScoreCard {
        let lower = text.to_lowercase();
        let mut score = 0;
        let mut reasons = Vec::new();

        for signal in self.table.iter() {
            if lower.contains(signal.phrase.as_str()) {
                score += signal.points;
                reasons.push(signal.reason.clone());
            }
        }

        ScoreCard {
            score,
            tier: QualityTier::from_score(score),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;

    fn scorer() -> QualityScorer {
        QualityScorer::default()
    }

    #[test]
    fn budget_and_speed_make_a_hot_lead() {
        let card = scorer().score("Ищу видеопродюсера, бюджет 200к, нужно быстро");
        assert_eq!(card.score, 5);
        assert_eq!(card.tier, QualityTier::Hot);
        assert_eq!(card.reasons, ["💰 Упоминает бюджет", "⚡ Нужно быстро"]);
    }

    #[test]
    fn free_work_for_interns_is_low_quality() {
        let card = scorer().score("работа бесплатно, ищу стажера");
        assert_eq!(card.score, -7);
        assert_eq!(card.tier, QualityTier::LowQuality);
        assert_eq!(card.reasons, ["🚫 Ищет бесплатно", "👶 Ищет стажера"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let card = scorer().score("СРОЧНО нужен монтаж");
        assert_eq!(card.score, 2);
        assert_eq!(card.tier, QualityTier::Good);
    }

    #[test]
    fn overlapping_signals_are_not_deduplicated() {
        // The specific phrase and the short abbreviation both fire.
        let card = scorer().score("есть техническое задание и тз");
        assert_eq!(card.reasons, ["📋 Есть ТЗ", "📋 Есть ТЗ"]);
        assert_eq!(card.score, 3);
    }

    #[test]
    fn reasons_follow_table_order_not_text_order() {
        let card = scorer().score("нужно быстро, бюджет есть");
        assert_eq!(card.reasons, ["💰 Упоминает бюджет", "⚡ Нужно быстро"]);
    }

    #[test]
    fn neutral_text_is_normal_with_no_reasons() {
        let card = scorer().score("Кто занимается видео для соцсетей?");
        assert_eq!(card.score, 0);
        assert_eq!(card.tier, QualityTier::Normal);
        assert!(card.reasons.is_empty());
    }

    #[test]
    fn synthetic_table_substitutes_cleanly() {
        let table = SignalTable::new(
            vec![Signal::new("alpha", 4, "has alpha")],
            vec![Signal::new("omega", -10, "has omega")],
        );
        let scorer = QualityScorer::new(table);
        assert_eq!(scorer.score("alpha").tier, QualityTier::Good);
        assert_eq!(scorer.score("alpha omega").score, -6);
        assert_eq!(scorer.score("бюджет").score, 0);
    }

    proptest::proptest! {
        #[test]
        fn scoring_is_idempotent(text in "\\PC{0,80}") {
            let scorer = QualityScorer::default();
            proptest::prop_assert_eq!(scorer.score(&text), scorer.score(&text));
        }

        #[test]
        fn tier_always_follows_score(text in "(бюджет|срочно|бесплатно|дешево|тз| |x){0,12}") {
            let card = QualityScorer::default().score(&text);
            proptest::prop_assert_eq!(card.tier, QualityTier::from_score(card.score));
        }
    }
}
