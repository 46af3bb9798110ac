// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LeadScout - keyword-driven lead scouting for Telegram chats.
//!
//! This is the binary entry point. It parses the run mode, loads
//! configuration, installs logging, checks that the selected mode has what
//! it needs, and hands off to [`serve`].

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod logging;
mod serve;
mod shutdown;
mod startup;
mod status;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// LeadScout - finds leads in Telegram chats.
#[derive(Parser, Debug)]
#[command(name = "leadscout", version, about, long_about = None)]
struct Cli {
    /// What to run.
    #[arg(long, value_enum, default_value_t = Mode::Both)]
    mode: Mode,

    /// Read only this TOML file instead of the XDG hierarchy.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Run modes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Scan recent history once, export, and exit.
    Scan,
    /// Follow new messages until interrupted.
    Watch,
    /// Scan, then watch, with the dashboard running.
    Both,
    /// Serve only the dashboard.
    Api,
    /// Print environment checks and exit.
    Status,
}

impl Mode {
    /// Modes that log in to Telegram.
    pub fn needs_telegram(self) -> bool {
        matches!(self, Self::Scan | Self::Watch | Self::Both)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config = match leadscout_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            leadscout_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if cli.mode == Mode::Status {
        let healthy = status::run_status(&config).await;
        std::process::exit(if healthy { 0 } else { 1 });
    }

    if let Err(e) = logging::init_tracing(&config.logging) {
        eprintln!("leadscout: file logging disabled: {e}");
    }

    let unmet = startup::check_requirements(&config, cli.mode);
    if !unmet.is_empty() {
        leadscout_config::render_errors(&unmet);
        std::process::exit(1);
    }

    if let Err(e) = serve::run(config, cli.mode).await {
        tracing::error!(error = %e, mode = ?cli.mode, "leadscout stopped with an error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn mode_defaults_to_both() {
        let cli = Cli::try_parse_from(["leadscout"]).unwrap();
        assert_eq!(cli.mode, Mode::Both);
        assert!(cli.config.is_none());
    }

    #[test]
    fn mode_and_config_are_parsed() {
        let cli =
            Cli::try_parse_from(["leadscout", "--mode", "scan", "--config", "/tmp/ls.toml"]).unwrap();
        assert_eq!(cli.mode, Mode::Scan);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ls.toml")));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["leadscout", "--mode", "crawl"]).is_err());
    }

    #[test]
    fn only_chat_modes_need_telegram() {
        assert!(Mode::Scan.needs_telegram());
        assert!(Mode::Watch.needs_telegram());
        assert!(Mode::Both.needs_telegram());
        assert!(!Mode::Api.needs_telegram());
        assert!(!Mode::Status.needs_telegram());
    }
}
