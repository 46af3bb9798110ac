// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadscout --mode status` implementation.
//!
//! Prints the startup requirements, the oracle key, the database and
//! whether a dashboard is answering on the configured port.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use leadscout_config::LeadscoutConfig;
use leadscout_core::{Clock, StorageAdapter, SystemClock};
use leadscout_storage::LeadStore;
use serde::Deserialize;

use crate::Mode;
use crate::startup;

/// Health endpoint response from the dashboard.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Ok,
    Warn,
    Fail,
}

struct Printer {
    use_color: bool,
}

impl Printer {
    fn line(&self, mark: Mark, label: &str, detail: &str) {
        if self.use_color {
            use colored::Colorize;
            let symbol = match mark {
                Mark::Ok => "✓".green(),
                Mark::Warn => "!".yellow(),
                Mark::Fail => "✗".red(),
            };
            println!("    {symbol} {label:<20} {detail}");
        } else {
            let tag = match mark {
                Mark::Ok => "[OK]  ",
                Mark::Warn => "[WARN]",
                Mark::Fail => "[FAIL]",
            };
            println!("    {tag} {label:<20} {detail}");
        }
    }
}

/// Counts leads in an existing database without creating one.
async fn database_check(config: &LeadscoutConfig) -> (Mark, String) {
    let path = &config.storage.database_path;
    if !Path::new(path).exists() {
        return (Mark::Warn, format!("{path} not created yet"));
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = LeadStore::new(config.storage.clone(), clock);
    if let Err(e) = store.initialize().await {
        return (Mark::Fail, format!("{path}: {e}"));
    }
    let result = match store.count_leads().await {
        Ok(count) => (Mark::Ok, format!("{path} ({count} leads)")),
        Err(e) => (Mark::Fail, format!("{path}: {e}")),
    };
    let _ = store.close().await;
    result
}

async fn dashboard_check(config: &LeadscoutConfig) -> (Mark, String) {
    let url = format!(
        "http://{}:{}/health",
        config.gateway.host, config.gateway.port
    );
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
    {
        Ok(client) => client,
        Err(e) => return (Mark::Warn, format!("cannot build HTTP client: {e}")),
    };

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => match resp.json::<HealthResponse>().await {
            Ok(health) => (
                Mark::Ok,
                format!("{} (uptime: {})", health.status, format_uptime(health.uptime_secs)),
            ),
            Err(e) => (Mark::Warn, format!("unexpected health response: {e}")),
        },
        _ => (Mark::Warn, format!("not running ({url})")),
    }
}

/// Prints every check. Returns `false` when a requirement of the default
/// mode or the database check failed.
pub async fn run_status(config: &LeadscoutConfig) -> bool {
    let printer = Printer {
        use_color: std::io::stdout().is_terminal(),
    };
    let mut healthy = true;

    println!();
    println!("  leadscout status");
    println!("  {}", "-".repeat(35));

    for requirement in startup::requirements(config, Mode::Both) {
        let mark = if requirement.satisfied {
            Mark::Ok
        } else {
            healthy = false;
            Mark::Fail
        };
        printer.line(mark, requirement.label, &requirement.detail);
    }

    let (mark, detail) = match (
        config.reply.enable_together_ai,
        config.reply.resolved_api_key(),
    ) {
        (false, _) => (Mark::Ok, "disabled, templates only".to_string()),
        (true, Some(_)) => (Mark::Ok, "set".to_string()),
        (true, None) => (Mark::Warn, "TOGETHER_API_KEY missing, templates only".to_string()),
    };
    printer.line(mark, "oracle api key", &detail);

    let (mark, detail) = database_check(config).await;
    healthy &= mark != Mark::Fail;
    printer.line(mark, "database", &detail);

    let (mark, detail) = dashboard_check(config).await;
    printer.line(mark, "dashboard", &detail);

    println!();
    healthy
}
