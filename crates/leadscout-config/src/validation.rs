// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as ordered hour windows, non-empty model lists, and positive limits.

use crate::diagnostic::ConfigError;
use crate::model::LeadscoutConfig;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &LeadscoutConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let scan = &config.scan;
    if scan.hours_back < 1 {
        errors.push(invalid("scan.hours_back must be at least 1"));
    }
    if scan.days_back < 1 {
        errors.push(invalid("scan.days_back must be at least 1"));
    }
    if scan.max_messages_per_chat < 1 {
        errors.push(invalid("scan.max_messages_per_chat must be at least 1"));
    }

    let reply = &config.reply;
    if reply.max_replies_per_day < 1 {
        errors.push(invalid("reply.max_replies_per_day must be at least 1"));
    }
    for (key, hour) in [
        ("active_hours_start", reply.active_hours_start),
        ("active_hours_end", reply.active_hours_end),
    ] {
        if hour > 23 {
            errors.push(invalid(format!("reply.{key} must be within 0..=23, got {hour}")));
        }
    }
    if reply.active_hours_start > reply.active_hours_end {
        errors.push(invalid(format!(
            "reply.active_hours_start ({}) must not be after reply.active_hours_end ({})",
            reply.active_hours_start, reply.active_hours_end
        )));
    }
    if reply.models.iter().all(|m| m.trim().is_empty()) {
        errors.push(invalid("reply.models must name at least one model"));
    }
    if reply.request_timeout_secs == 0 {
        errors.push(invalid("reply.request_timeout_secs must be positive"));
    }

    if config.pipeline.pacing_min_secs > config.pipeline.pacing_max_secs {
        errors.push(invalid(format!(
            "pipeline.pacing_min_secs ({}) must not exceed pipeline.pacing_max_secs ({})",
            config.pipeline.pacing_min_secs, config.pipeline.pacing_max_secs
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(invalid("storage.database_path must not be empty"));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(invalid("gateway.host must not be empty"));
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(invalid(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
