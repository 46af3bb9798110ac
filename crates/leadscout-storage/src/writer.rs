// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-writer model.
//!
//! All writes in leadscout-storage are serialized through `tokio-rusqlite`'s
//! single background thread. The [`Database`](crate::Database) handle IS the
//! single writer; [`LeadStore`](crate::LeadStore) and
//! [`KeywordStore`](crate::KeywordStore) share clones of it.
//!
//! **Do NOT create additional Connection instances for writes.**

// How the model holds:
// - `Database` wraps one `tokio_rusqlite::Connection`; clones share its thread
// - every query function takes `&Database` and submits one closure via `call()`
// - multi-row updates (lead + chat source + daily rollup) run in a transaction
//   inside that one closure, so no other write can interleave
// - closures never await, so no network call can hold the writer
