// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for LeadScout.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for leads,
//! keywords, chat-source aggregates, daily rollups, the reply review queue,
//! and dashboard settings.

pub mod database;
pub mod keywords;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;
pub mod writer;

pub use database::Database;
pub use keywords::KeywordStore;
pub use models::*;
pub use store::LeadStore;
