// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for LeadScout integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without Telegram or the oracle.
//!
//! # Components
//!
//! - [`MockChatClient`] - Mock chat account with history, live injection, and capture
//! - [`CannedDrafter`] - Reply drafter with pre-configured replies
//! - [`RecordingPublisher`] - Event publisher that records dashboard events
//! - [`FixedClock`] - Manually driven clock
//! - [`TestHarness`] - In-memory stores wired to all of the above

pub mod clock;
pub mod harness;
pub mod mock_chat;
pub mod mock_drafter;
pub mod publisher;

pub use clock::FixedClock;
pub use harness::{TestHarness, sender};
pub use mock_chat::{Forwarded, MockChatClient, broadcast_channel, group_chat};
pub use mock_drafter::{CannedDrafter, DraftCall};
pub use publisher::RecordingPublisher;
