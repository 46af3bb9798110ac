// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for LeadScout.
//!
//! This crate provides the error type, the shared domain types, and the
//! trait seams through which the ingestion pipeline talks to the chat
//! account, the dashboard, and the reply oracle.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::LeadscoutError;
pub use types::{
    AdapterType, ChatInfo, ChatKind, ChatMessage, ChatRef, ChatTarget, HealthStatus,
    OutboundMessage, QualityTier, Sender, TextFormat,
};

pub use traits::{
    ChatClient, EventPublisher, NoopPublisher, PluginAdapter, ReplyDrafter, StorageAdapter,
};
