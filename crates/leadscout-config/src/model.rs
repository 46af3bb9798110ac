// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for LeadScout.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level LeadScout configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadscoutConfig {
    /// History lookback and per-chat limits.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Keyword and chat list files.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Scan result export.
    #[serde(default)]
    pub export: ExportConfig,

    /// Auto-reply throttle and completion oracle.
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Telegram account and operator target.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Ingestion pacing.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dashboard server.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the scan lookback window is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSearchMode {
    #[default]
    Hours,
    Days,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    #[serde(default = "default_days_back")]
    pub days_back: u32,

    #[serde(default = "default_hours_back")]
    pub hours_back: u32,

    /// Minimum message length in characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_max_messages_per_chat")]
    pub max_messages_per_chat: usize,

    #[serde(default)]
    pub time_search_mode: TimeSearchMode,
}

impl ScanConfig {
    /// Length of the lookback window in hours.
    pub fn lookback_hours(&self) -> i64 {
        match self.time_search_mode {
            TimeSearchMode::Hours => i64::from(self.hours_back),
            TimeSearchMode::Days => i64::from(self.days_back) * 24,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            days_back: default_days_back(),
            hours_back: default_hours_back(),
            min_length: default_min_length(),
            max_messages_per_chat: default_max_messages_per_chat(),
            time_search_mode: TimeSearchMode::default(),
        }
    }
}

fn default_days_back() -> u32 {
    1
}

fn default_hours_back() -> u32 {
    24
}

fn default_min_length() -> usize {
    1
}

fn default_max_messages_per_chat() -> usize {
    500
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    /// Newline-delimited trigger phrases seeded at startup.
    #[serde(default = "default_keywords_file")]
    pub keywords_file: String,

    /// Newline-delimited chat references to monitor.
    #[serde(default = "default_chats_file")]
    pub chats_file: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            keywords_file: default_keywords_file(),
            chats_file: default_chats_file(),
        }
    }
}

fn default_keywords_file() -> String {
    "keywords.txt".to_string()
}

fn default_chats_file() -> String {
    "chats.txt".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub save_csv: bool,

    #[serde(default)]
    pub save_json: bool,

    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            save_csv: true,
            save_json: false,
            export_dir: default_export_dir(),
        }
    }
}

fn default_export_dir() -> String {
    "data/exports".to_string()
}

/// Auto-reply configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyConfig {
    /// Master switch for drafted replies in source chats.
    #[serde(default)]
    pub enable_auto_reply: bool,

    #[serde(default = "default_max_replies_per_day")]
    pub max_replies_per_day: u32,

    /// When off, replies always use the built-in templates.
    #[serde(default = "default_true")]
    pub enable_together_ai: bool,

    /// Oracle API key. Falls back to `TOGETHER_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Models tried in order.
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// First local hour (inclusive) in which replies may be sent.
    #[serde(default = "default_active_hours_start")]
    pub active_hours_start: u32,

    /// Last local hour (inclusive) in which replies may be sent.
    #[serde(default = "default_active_hours_end")]
    pub active_hours_end: u32,
}

impl ReplyConfig {
    /// The configured key, or `TOGETHER_API_KEY` from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("TOGETHER_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            enable_auto_reply: false,
            max_replies_per_day: default_max_replies_per_day(),
            enable_together_ai: true,
            api_key: None,
            api_url: default_api_url(),
            models: default_models(),
            request_timeout_secs: default_request_timeout_secs(),
            active_hours_start: default_active_hours_start(),
            active_hours_end: default_active_hours_end(),
        }
    }
}

fn default_max_replies_per_day() -> u32 {
    30
}

fn default_api_url() -> String {
    "https://api.together.xyz/v1/chat/completions".to_string()
}

fn default_models() -> Vec<String> {
    vec!["deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free".to_string()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_active_hours_start() -> u32 {
    9
}

fn default_active_hours_end() -> u32 {
    21
}

/// Telegram integration configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Where lead cards go. `"env"` reads `FORWARD_TO` (default `me`).
    #[serde(default = "default_forward_to")]
    pub forward_to: String,

    /// Bot API token. Falls back to `TELEGRAM_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: Option<String>,
}

impl TelegramConfig {
    /// The configured token, or `TELEGRAM_BOT_TOKEN` from the environment.
    pub fn resolved_bot_token(&self) -> Option<String> {
        self.bot_token
            .clone()
            .or_else(|| std::env::var("TELEGRAM_BOT_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// The operator target reference with `"env"` expanded.
    pub fn resolved_forward_to(&self) -> String {
        if self.forward_to == "env" {
            std::env::var("FORWARD_TO")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "me".to_string())
        } else {
            self.forward_to.clone()
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            forward_to: default_forward_to(),
            bot_token: None,
        }
    }
}

fn default_forward_to() -> String {
    "env".to_string()
}

/// Delay inserted after each matched message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_pacing_min_secs")]
    pub pacing_min_secs: u64,

    #[serde(default = "default_pacing_max_secs")]
    pub pacing_max_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_min_secs: default_pacing_min_secs(),
            pacing_max_secs: default_pacing_max_secs(),
        }
    }
}

fn default_pacing_min_secs() -> u64 {
    3
}

fn default_pacing_max_secs() -> u64 {
    15
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "data/leadscout.sqlite".to_string()
}

/// Dashboard gateway configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// When set, `/api/*` requires `Authorization: Bearer <token>`.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Raises the default filter to `debug`.
    #[serde(default)]
    pub verbose_logs: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            verbose_logs: false,
            level: default_level(),
        }
    }
}

fn default_log_dir() -> String {
    "data/logs".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookback_follows_search_mode() {
        let mut scan = ScanConfig {
            hours_back: 6,
            days_back: 3,
            ..ScanConfig::default()
        };
        assert_eq!(scan.lookback_hours(), 6);
        scan.time_search_mode = TimeSearchMode::Days;
        assert_eq!(scan.lookback_hours(), 72);
    }

    #[test]
    fn explicit_forward_target_is_kept() {
        let telegram = TelegramConfig {
            forward_to: "@operator".into(),
            bot_token: None,
        };
        assert_eq!(telegram.resolved_forward_to(), "@operator");
    }

    #[test]
    fn configured_secrets_win_over_environment() {
        let reply = ReplyConfig {
            api_key: Some("from-file".into()),
            ..ReplyConfig::default()
        };
        assert_eq!(reply.resolved_api_key().as_deref(), Some("from-file"));

        let blank = ReplyConfig {
            api_key: Some("  ".into()),
            ..ReplyConfig::default()
        };
        assert!(blank.resolved_api_key().is_none());
    }
}
