// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead ingestion for LeadScout.
//!
//! [`IngestPipeline`] takes messages from a [`ChatClient`](leadscout_core::ChatClient),
//! matches them against the keyword set, scores and persists the hits,
//! delivers a card to the operator, and optionally schedules a drafted
//! reply. Two drivers feed it: [`IngestPipeline::scan`] walks recent
//! history once, [`IngestPipeline::watch`] follows live messages.

pub mod card;
pub mod export;
pub mod filters;
pub mod pipeline;
pub mod reply;
pub mod scan;
pub mod settings;
pub mod sources;
pub mod watch;

pub use export::ScanRow;
pub use pipeline::{IngestPipeline, LeadOutcome, Outcome, PipelineDeps, SkipReason};
pub use reply::{ReplyJob, ReplyOutcome, ReplyWorker};
pub use scan::ScanReport;
pub use settings::{PipelineSettings, ReplyDelays};
pub use sources::load_chat_refs;
pub use watch::WatchReport;
