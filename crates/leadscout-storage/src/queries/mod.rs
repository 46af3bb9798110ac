// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.
//!
//! Each function submits one closure to the connection thread; multi-row
//! writes run inside a transaction in that closure.

pub mod chat_sources;
pub mod keywords;
pub mod leads;
pub mod responses;
pub mod settings;
pub mod stats;
