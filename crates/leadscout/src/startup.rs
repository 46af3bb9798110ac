// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup requirement checks for the selected run mode.

use std::path::Path;

use leadscout_config::{ConfigError, LeadscoutConfig};

use crate::Mode;

/// One thing a run mode depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub label: &'static str,
    pub satisfied: bool,
    pub detail: String,
    pub hint: String,
}

fn file_requirement(label: &'static str, path: &str, key: &str) -> Requirement {
    let satisfied = Path::new(path).is_file();
    Requirement {
        label,
        satisfied,
        detail: if satisfied {
            path.to_string()
        } else {
            format!("{path} not found")
        },
        hint: format!("create {path} (one entry per line) or point `{key}` at an existing file"),
    }
}

/// Everything `mode` needs, satisfied or not.
pub fn requirements(config: &LeadscoutConfig, mode: Mode) -> Vec<Requirement> {
    if !mode.needs_telegram() {
        return Vec::new();
    }

    let token = config.telegram.resolved_bot_token();
    vec![
        file_requirement(
            "keywords file",
            &config.sources.keywords_file,
            "sources.keywords_file",
        ),
        file_requirement("chats file", &config.sources.chats_file, "sources.chats_file"),
        Requirement {
            label: "telegram bot token",
            satisfied: token.is_some(),
            detail: if token.is_some() {
                "set".to_string()
            } else {
                "missing".to_string()
            },
            hint: "set TELEGRAM_BOT_TOKEN in the environment or .env, or `telegram.bot_token`"
                .to_string(),
        },
    ]
}

/// The unmet requirements of `mode` as diagnostics.
pub fn check_requirements(config: &LeadscoutConfig, mode: Mode) -> Vec<ConfigError> {
    requirements(config, mode)
        .into_iter()
        .filter(|r| !r.satisfied)
        .map(|r| ConfigError::Requirement {
            what: format!("{}: {}", r.label, r.detail),
            hint: r.hint,
        })
        .collect()
}
