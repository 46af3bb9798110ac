// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the pipeline and its collaborators.
//!
//! Adapters extend [`PluginAdapter`] and use `#[async_trait]` for dynamic
//! dispatch compatibility.

pub mod adapter;
pub mod chat;
pub mod drafter;
pub mod publisher;
pub mod storage;

pub use adapter::PluginAdapter;
pub use chat::ChatClient;
pub use drafter::ReplyDrafter;
pub use publisher::{EventPublisher, NoopPublisher};
pub use storage::StorageAdapter;
