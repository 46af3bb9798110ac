// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by chat clients and storage backends.

use async_trait::async_trait;

use crate::error::LeadscoutError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for LeadScout adapters.
///
/// Provides identity, lifecycle, and health check capabilities so the
/// binary and the dashboard can report on collaborators uniformly.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the type of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, LeadscoutError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), LeadscoutError>;
}
