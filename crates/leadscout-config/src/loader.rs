// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./leadscout.toml` > `~/.config/leadscout/leadscout.toml`
//! > `/etc/leadscout/leadscout.toml`, with overrides via `LEADSCOUT_` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LeadscoutConfig;

/// Top-level sections, used to turn `LEADSCOUT_SCAN_HOURS_BACK` into `scan.hours_back`.
const SECTIONS: &[&str] = &[
    "scan", "sources", "export", "reply", "telegram", "pipeline", "storage", "gateway", "logging",
];

pub const SYSTEM_CONFIG_PATH: &str = "/etc/leadscout/leadscout.toml";
pub const LOCAL_CONFIG_PATH: &str = "leadscout.toml";

/// `$XDG_CONFIG_HOME/leadscout/leadscout.toml`, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leadscout/leadscout.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadscout/leadscout.toml`
/// 3. `~/.config/leadscout/leadscout.toml`
/// 4. `./leadscout.toml`
/// 5. `LEADSCOUT_*` environment variables
pub fn load_config() -> Result<LeadscoutConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from TOML text only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadscoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadscoutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadscoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadscoutConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadscoutConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Maps `LEADSCOUT_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the section prefix is split, so keys that contain underscores
/// (`max_replies_per_day`) survive intact.
fn env_provider() -> Env {
    Env::prefixed("LEADSCOUT_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_at_section() {
        assert_eq!(env_key_to_path("scan_hours_back"), "scan.hours_back");
        assert_eq!(
            env_key_to_path("reply_max_replies_per_day"),
            "reply.max_replies_per_day"
        );
        assert_eq!(env_key_to_path("export_export_dir"), "export.export_dir");
        assert_eq!(env_key_to_path("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(env_key_to_path("unrelated"), "unrelated");
    }
}
