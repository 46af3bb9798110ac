// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cheap pre-filters applied before keyword matching.

use chrono::{DateTime, Duration, Utc};

/// Consecutive out-of-window messages after which a newest-first scan
/// gives up on a chat.
pub const MAX_CONSECUTIVE_MISSES: u32 = 10;

/// Whether `date` lies in `[now - lookback, now]`.
///
/// Future-dated messages are rejected.
pub fn within_window(date: DateTime<Utc>, now: DateTime<Utc>, lookback: Duration) -> bool {
    date <= now && date >= now - lookback
}

/// Whether the text has at least `min_length` characters (not bytes).
pub fn long_enough(text: &str, min_length: usize) -> bool {
    text.chars().count() >= min_length
}

/// Counts consecutive out-of-window messages during a scan.
#[derive(Debug, Clone)]
pub struct MissCounter {
    misses: u32,
    limit: u32,
}

impl Default for MissCounter {
    fn default() -> Self {
        Self::new(MAX_CONSECUTIVE_MISSES)
    }
}

impl MissCounter {
    pub fn new(limit: u32) -> Self {
        Self { misses: 0, limit }
    }

    /// Records a miss. Returns `true` once the limit is reached.
    pub fn miss(&mut self) -> bool {
        self.misses += 1;
        self.misses >= self.limit
    }

    /// An in-window message resets the streak.
    pub fn hit(&mut self) {
        self.misses = 0;
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }
}
