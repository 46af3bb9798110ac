// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-reply support for LeadScout.
//!
//! [`ReplyThrottle`] decides whether a lead may be answered right now;
//! [`ReplyGenerator`] drafts the answer through an OpenAI-compatible
//! completion endpoint and falls back to fixed templates when the oracle
//! is unavailable.

pub mod client;
pub mod generator;
pub mod prompt;
pub mod throttle;
pub mod types;

pub use client::OracleClient;
pub use generator::{ReplyGenerator, RetryPolicy};
pub use throttle::{ReplyDecision, ReplyThrottle};
