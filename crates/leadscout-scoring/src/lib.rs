// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead scoring and keyword matching for LeadScout.
//!
//! Scoring is a fixed, hand-authored signal table applied by substring
//! containment. Nothing here performs I/O, so every function is safe to call
//! concurrently without synchronization.

pub mod keywords;
pub mod scorer;
pub mod signals;

pub use keywords::{KeywordSet, normalize_phrase};
pub use scorer::{QualityScorer, ScoreCard};
pub use signals::{Signal, SignalTable};
