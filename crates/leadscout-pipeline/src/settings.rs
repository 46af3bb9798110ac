// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime knobs for the ingestion pipeline, derived from configuration.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use leadscout_config::LeadscoutConfig;
use leadscout_core::QualityTier;
use rand::Rng;

/// Picks a uniformly random duration from a range of seconds.
///
/// An empty or zero range yields zero.
pub fn random_secs(range: &RangeInclusive<u64>) -> Duration {
    let (low, high) = (*range.start(), *range.end());
    if high == 0 || low > high {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::thread_rng().gen_range(low..=high))
}

/// How long a scheduled auto-reply waits, by lead tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDelays {
    pub hot: RangeInclusive<u64>,
    pub good: RangeInclusive<u64>,
    pub other: RangeInclusive<u64>,
}

impl Default for ReplyDelays {
    fn default() -> Self {
        Self {
            hot: 300..=900,
            good: 900..=1800,
            other: 1800..=3600,
        }
    }
}

impl ReplyDelays {
    /// Replies go out immediately.
    pub fn none() -> Self {
        Self {
            hot: 0..=0,
            good: 0..=0,
            other: 0..=0,
        }
    }

    pub fn range(&self, tier: QualityTier) -> &RangeInclusive<u64> {
        match tier {
            QualityTier::Hot => &self.hot,
            QualityTier::Good => &self.good,
            QualityTier::Normal | QualityTier::LowQuality => &self.other,
        }
    }

    pub fn pick(&self, tier: QualityTier) -> Duration {
        random_secs(self.range(tier))
    }
}

/// Everything the pipeline reads from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub min_length: usize,
    pub lookback: chrono::Duration,
    pub max_messages_per_chat: usize,
    pub enable_auto_reply: bool,
    /// Raw operator target (`env` already expanded).
    pub forward_to: String,
    pub pacing_secs: RangeInclusive<u64>,
    pub reply_delays: ReplyDelays,
    pub save_csv: bool,
    pub save_json: bool,
    pub export_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &LeadscoutConfig) -> Self {
        Self {
            min_length: config.scan.min_length,
            lookback: chrono::Duration::hours(config.scan.lookback_hours()),
            max_messages_per_chat: config.scan.max_messages_per_chat,
            enable_auto_reply: config.reply.enable_auto_reply,
            forward_to: config.telegram.resolved_forward_to(),
            pacing_secs: config.pipeline.pacing_min_secs..=config.pipeline.pacing_max_secs,
            reply_delays: ReplyDelays::default(),
            save_csv: config.export.save_csv,
            save_json: config.export.save_json,
            export_dir: PathBuf::from(&config.export.export_dir),
        }
    }

    /// No pacing and no reply delay.
    pub fn without_delays(mut self) -> Self {
        self.pacing_secs = 0..=0;
        self.reply_delays = ReplyDelays::none();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_delays_fall_in_their_ranges() {
        let delays = ReplyDelays::default();
        for _ in 0..50 {
            let hot = delays.pick(QualityTier::Hot).as_secs();
            assert!((300..=900).contains(&hot));
            let good = delays.pick(QualityTier::Good).as_secs();
            assert!((900..=1800).contains(&good));
            let low = delays.pick(QualityTier::LowQuality).as_secs();
            assert!((1800..=3600).contains(&low));
        }
    }

    #[test]
    fn zero_ranges_mean_no_wait() {
        assert_eq!(random_secs(&(0..=0)), Duration::ZERO);
        assert_eq!(ReplyDelays::none().pick(QualityTier::Hot), Duration::ZERO);
    }

    #[test]
    fn settings_follow_config() {
        let mut config = LeadscoutConfig::default();
        config.scan.hours_back = 6;
        config.pipeline.pacing_min_secs = 1;
        config.pipeline.pacing_max_secs = 2;
        config.telegram.forward_to = "@operator".into();

        let settings = PipelineSettings::from_config(&config);
        assert_eq!(settings.lookback, chrono::Duration::hours(6));
        assert_eq!(settings.pacing_secs, 1..=2);
        assert_eq!(settings.forward_to, "@operator");
        assert!(settings.save_csv);
        assert!(!settings.enable_auto_reply);

        let fast = settings.without_delays();
        assert_eq!(fast.pacing_secs, 0..=0);
        assert_eq!(fast.reply_delays, ReplyDelays::none());
    }
}
