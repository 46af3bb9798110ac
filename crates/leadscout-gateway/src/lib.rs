// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard gateway for LeadScout.
//!
//! Serves a JSON API over the lead store and a WebSocket that relays
//! `new_lead` events. The pipeline talks to it only through
//! [`BroadcastPublisher`], an [`EventPublisher`](leadscout_core::EventPublisher)
//! implementation, so the ingestion crates never depend on this one.

pub mod auth;
pub mod events;
pub mod export;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::AuthConfig;
pub use events::{BroadcastPublisher, DashboardEvent};
pub use export::ExportFormat;
pub use server::{GatewayState, RuntimeStatus, ServerConfig, build_router, start_server};
