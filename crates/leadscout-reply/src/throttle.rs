// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-reply throttle with a daily cap and an active-hours window.
//!
//! The throttle keeps an in-memory counter of replies sent today (local
//! date). The counter resets the first time a new date is observed. It is
//! not persisted: a restart starts the day from zero.
//!
//! Replies being drafted or sent hold a reservation that counts against the
//! cap until it is committed or released.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use leadscout_config::model::ReplyConfig;
use strum::Display;
use tracing::{debug, info};

/// Outcome of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReplyDecision {
    #[strum(serialize = "allow")]
    Allow,
    #[strum(serialize = "daily reply cap reached")]
    DailyCapReached,
    #[strum(serialize = "outside active hours")]
    OutsideActiveHours,
    #[strum(serialize = "negative lead score")]
    NegativeScore,
}

impl ReplyDecision {
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Per-day auto-reply limiter.
#[derive(Debug, Clone)]
pub struct ReplyThrottle {
    count: u32,
    /// Allowed replies not yet sent.
    reserved: u32,
    last_reset_date: Option<NaiveDate>,
    max_per_day: u32,
    hours_start: u32,
    hours_end: u32,
}

impl ReplyThrottle {
    pub fn new(config: &ReplyConfig) -> Self {
        Self::with_limits(
            config.max_replies_per_day,
            config.active_hours_start,
            config.active_hours_end,
        )
    }

    /// A throttle allowing `max_per_day` replies between `hours_start` and
    /// `hours_end` (both inclusive).
    pub fn with_limits(max_per_day: u32, hours_start: u32, hours_end: u32) -> Self {
        Self {
            count: 0,
            reserved: 0,
            last_reset_date: None,
            max_per_day,
            hours_start,
            hours_end,
        }
    }

    /// Decides whether a lead with `score` may be answered at `now`.
    ///
    /// Checks run in order: day rollover, daily cap, active hours, score.
    pub fn check(&mut self, now: NaiveDateTime, score: i32) -> ReplyDecision {
        self.roll_over(now.date());

        let decision = if self.count + self.reserved >= self.max_per_day {
            ReplyDecision::DailyCapReached
        } else if !(self.hours_start..=self.hours_end).contains(&now.hour()) {
            ReplyDecision::OutsideActiveHours
        } else if score < 0 {
            ReplyDecision::NegativeScore
        } else {
            ReplyDecision::Allow
        };

        if !decision.is_allowed() {
            debug!(
                %decision,
                count = self.count,
                reserved = self.reserved,
                max = self.max_per_day,
                score,
                "reply denied"
            );
        }
        decision
    }

    /// Like [`check`](Self::check), but an allowed reply also takes a slot
    /// under the cap. Settle it with [`commit`](Self::commit) or
    /// [`release`](Self::release).
    pub fn try_reserve(&mut self, now: NaiveDateTime, score: i32) -> ReplyDecision {
        let decision = self.check(now, score);
        if decision.is_allowed() {
            self.reserved += 1;
        }
        decision
    }

    /// Turns a reservation into a sent reply.
    pub fn commit(&mut self, now: NaiveDateTime) {
        self.reserved = self.reserved.saturating_sub(1);
        self.record_reply(now);
    }

    /// Gives a reservation back without counting a reply.
    pub fn release(&mut self) {
        self.reserved = self.reserved.saturating_sub(1);
    }

    /// Counts one sent reply. Call only after the send succeeded.
    pub fn record_reply(&mut self, now: NaiveDateTime) {
        self.roll_over(now.date());
        self.count += 1;
        debug!(count = self.count, max = self.max_per_day, "reply recorded");
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if self.last_reset_date != Some(today) {
            if self.last_reset_date.is_some() {
                info!(%today, previous = self.count, "daily reply counter reset");
            }
            self.count = 0;
            self.last_reset_date = Some(today);
        }
    }

    /// Replies sent today.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Replies allowed but not yet settled.
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn max_per_day(&self) -> u32 {
        self.max_per_day
    }

    /// Replies still allowed today.
    pub fn remaining(&self) -> u32 {
        self.max_per_day.saturating_sub(self.count + self.reserved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn allows_exactly_max_replies_per_day() {
        let mut throttle = ReplyThrottle::with_limits(3, 9, 21);
        for _ in 0..3 {
            assert_eq!(throttle.check(at(2, 12, 0), 5), ReplyDecision::Allow);
            throttle.record_reply(at(2, 12, 0));
        }
        assert_eq!(throttle.check(at(2, 12, 1), 5), ReplyDecision::DailyCapReached);
        assert_eq!(throttle.remaining(), 0);
    }

    #[test]
    fn counter_resets_on_new_date() {
        let mut throttle = ReplyThrottle::with_limits(1, 9, 21);
        throttle.check(at(2, 10, 0), 1);
        throttle.record_reply(at(2, 10, 0));
        assert_eq!(throttle.check(at(2, 20, 0), 1), ReplyDecision::DailyCapReached);

        assert_eq!(throttle.check(at(3, 9, 0), 1), ReplyDecision::Allow);
        assert_eq!(throttle.count(), 0);
    }

    #[test]
    fn reset_happens_once_per_date() {
        let mut throttle = ReplyThrottle::with_limits(5, 9, 21);
        throttle.check(at(3, 9, 0), 1);
        throttle.record_reply(at(3, 9, 0));
        throttle.check(at(3, 10, 0), 1);
        throttle.record_reply(at(3, 10, 0));
        assert_eq!(throttle.count(), 2);
    }

    #[test]
    fn hours_window_is_inclusive() {
        let mut throttle = ReplyThrottle::with_limits(30, 9, 21);
        assert_eq!(throttle.check(at(2, 8, 59), 5), ReplyDecision::OutsideActiveHours);
        assert_eq!(throttle.check(at(2, 9, 0), 5), ReplyDecision::Allow);
        assert_eq!(throttle.check(at(2, 21, 59), 5), ReplyDecision::Allow);
        assert_eq!(throttle.check(at(2, 22, 0), 5), ReplyDecision::OutsideActiveHours);
    }

    #[test]
    fn negative_score_is_denied_zero_is_allowed() {
        let mut throttle = ReplyThrottle::with_limits(30, 9, 21);
        assert_eq!(throttle.check(at(2, 12, 0), -1), ReplyDecision::NegativeScore);
        assert_eq!(throttle.check(at(2, 12, 0), 0), ReplyDecision::Allow);
    }

    #[test]
    fn cap_is_reported_before_hours() {
        let mut throttle = ReplyThrottle::with_limits(1, 9, 21);
        throttle.record_reply(at(2, 12, 0));
        assert_eq!(throttle.check(at(2, 23, 0), -5), ReplyDecision::DailyCapReached);
    }

    #[test]
    fn reservations_count_against_the_cap() {
        let mut throttle = ReplyThrottle::with_limits(2, 9, 21);
        assert_eq!(throttle.try_reserve(at(2, 12, 0), 5), ReplyDecision::Allow);
        assert_eq!(throttle.try_reserve(at(2, 12, 0), 5), ReplyDecision::Allow);
        assert_eq!(throttle.try_reserve(at(2, 12, 0), 5), ReplyDecision::DailyCapReached);
        assert_eq!(throttle.check(at(2, 12, 0), 5), ReplyDecision::DailyCapReached);
        assert_eq!(throttle.count(), 0);
        assert_eq!(throttle.reserved(), 2);

        throttle.commit(at(2, 12, 1));
        assert_eq!(throttle.count(), 1);
        assert_eq!(throttle.reserved(), 1);
        assert_eq!(throttle.remaining(), 0);
    }

    #[test]
    fn released_reservation_frees_the_slot() {
        let mut throttle = ReplyThrottle::with_limits(1, 9, 21);
        assert_eq!(throttle.try_reserve(at(2, 12, 0), 5), ReplyDecision::Allow);
        assert_eq!(throttle.check(at(2, 12, 0), 5), ReplyDecision::DailyCapReached);

        throttle.release();
        assert_eq!(throttle.count(), 0);
        assert_eq!(throttle.try_reserve(at(2, 12, 0), 5), ReplyDecision::Allow);
    }

    #[test]
    fn denied_reservation_takes_no_slot() {
        let mut throttle = ReplyThrottle::with_limits(3, 9, 21);
        assert_eq!(throttle.try_reserve(at(2, 12, 0), -2), ReplyDecision::NegativeScore);
        assert_eq!(throttle.try_reserve(at(2, 23, 0), 5), ReplyDecision::OutsideActiveHours);
        assert_eq!(throttle.reserved(), 0);
    }

    #[test]
    fn built_from_config() {
        let config = ReplyConfig {
            max_replies_per_day: 2,
            active_hours_start: 10,
            active_hours_end: 11,
            ..ReplyConfig::default()
        };
        let mut throttle = ReplyThrottle::new(&config);
        assert_eq!(throttle.max_per_day(), 2);
        assert_eq!(throttle.check(at(2, 9, 30), 1), ReplyDecision::OutsideActiveHours);
        assert_eq!(ReplyDecision::DailyCapReached.to_string(), "daily reply cap reached");
    }
}
