// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword phrase normalization and containment matching.

/// Normalizes a trigger phrase: trims and lower-cases it.
///
/// Returns `None` for phrases that are empty after trimming.
pub fn normalize_phrase(phrase: &str) -> Option<String> {
    let normalized = phrase.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// An ordered set of normalized trigger phrases.
///
/// An empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    phrases: Vec<String>,
}

impl KeywordSet {
    /// Builds a set from raw phrases, normalizing and dropping duplicates
    /// while keeping first-seen order.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for phrase in phrases {
            if let Some(normalized) = normalize_phrase(phrase.as_ref()) {
                if !set.phrases.contains(&normalized) {
                    set.phrases.push(normalized);
                }
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Every phrase contained in the lower-cased text, in set order.
    pub fn matching(&self, text: &str) -> Vec<&str> {
        if self.phrases.is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .filter(|phrase| lower.contains(phrase.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn matches(&self, text: &str) -> bool {
        !self.matching(text).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(
            normalize_phrase("  Ищу Видеопродюсера "),
            Some("ищу видеопродюсера".to_string())
        );
        assert_eq!(normalize_phrase("   "), None);
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = KeywordSet::default();
        assert!(!set.matches("ищу видеопродюсера"));
        assert!(!set.matches(""));
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let set = KeywordSet::new(["ищу видеопродюсера", "нужен монтажер"]);
        assert!(set.matches("Привет! ИЩУ ВИДЕОПРОДЮСЕРА на проект"));
        assert!(!set.matches("ищу видео"));
    }

    #[test]
    fn all_matching_phrases_are_reported_in_order() {
        let set = KeywordSet::new(["видео", "монтаж", "оператор"]);
        assert_eq!(set.matching("Нужен оператор и монтаж видео"), ["видео", "монтаж", "оператор"]);
    }

    #[test]
    fn duplicates_collapse_after_normalization() {
        let set = KeywordSet::new(["Видео", "видео ", ""]);
        assert_eq!(set.len(), 1);
    }

    proptest::proptest! {
        #[test]
        fn match_iff_some_phrase_is_contained(
            phrases in proptest::collection::vec("[а-яa-z]{1,4}", 1..5),
            text in "[а-яА-Яa-zA-Z ]{0,40}",
        ) {
            let set = KeywordSet::new(&phrases);
            let lower = text.to_lowercase();
            let expected = set.phrases().iter().any(|p| lower.contains(p.as_str()));
            proptest::prop_assert_eq!(set.matches(&text), expected);
        }
    }
}
