// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for LeadScout.

use thiserror::Error;

/// The primary error type used across all LeadScout crates.
#[derive(Debug, Error)]
pub enum LeadscoutError {
    /// Configuration errors (missing files, invalid values, absent credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat client errors (send failure, forward failure, unsupported operation).
    #[error("chat error: {message}")]
    Chat {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion oracle errors (HTTP failure, bad status, malformed body).
    #[error("oracle error: {message}")]
    Oracle {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A chat reference or forward target could not be resolved.
    #[error("could not resolve {reference}: {message}")]
    Resolution { reference: String, message: String },

    /// Writing a scan export artifact failed.
    #[error("export error: {source}")]
    Export {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadscoutError {
    /// Shorthand for a [`LeadscoutError::Chat`] without an underlying source.
    pub fn chat(message: impl Into<String>) -> Self {
        Self::Chat {
            message: message.into(),
            source: None,
        }
    }
}
