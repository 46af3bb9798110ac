// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run modes.
//!
//! Wires SQLite storage, the Telegram client, the reply generator and the
//! dashboard around one [`IngestPipeline`], then drives it according to the
//! selected [`Mode`]. Every long-running part stops on the shared shutdown
//! token installed by [`shutdown::install_signal_handler`].

use std::path::Path;
use std::sync::Arc;

use leadscout_config::LeadscoutConfig;
use leadscout_core::{
    ChatRef, Clock, EventPublisher, LeadscoutError, PluginAdapter, StorageAdapter, SystemClock,
};
use leadscout_gateway::{BroadcastPublisher, GatewayState, RuntimeStatus, ServerConfig, start_server};
use leadscout_pipeline::{
    IngestPipeline, PipelineDeps, PipelineSettings, ScanReport, load_chat_refs,
};
use leadscout_reply::{ReplyGenerator, ReplyThrottle};
use leadscout_storage::{KeywordStore, LeadStore};
use leadscout_telegram::TelegramClient;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::Mode;
use crate::shutdown;

/// Long-lived services shared by every mode.
struct Services {
    config: Arc<LeadscoutConfig>,
    clock: Arc<dyn Clock>,
    store: Arc<LeadStore>,
    keywords: Arc<KeywordStore>,
    events: BroadcastPublisher,
    runtime: Arc<RuntimeStatus>,
    shutdown: CancellationToken,
}

/// Runs `mode` to completion.
pub async fn run(config: LeadscoutConfig, mode: Mode) -> Result<(), LeadscoutError> {
    info!(?mode, "starting leadscout");

    let shutdown = shutdown::install_signal_handler();
    let config = Arc::new(config);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (store, keywords) = open_storage(&config, Arc::clone(&clock)).await?;

    let services = Services {
        config,
        clock,
        store,
        keywords,
        events: BroadcastPublisher::default(),
        runtime: Arc::new(RuntimeStatus::default()),
        shutdown,
    };

    let result = match mode {
        Mode::Scan => run_scan(&services).await,
        Mode::Watch => run_watch(&services).await,
        Mode::Both => run_both(&services).await,
        Mode::Api => run_api(&services).await,
        // Answered in main before any service starts.
        Mode::Status => Ok(()),
    };

    services.shutdown.cancel();
    if let Err(e) = services.store.close().await {
        warn!(error = %e, "failed to checkpoint database on shutdown");
    }
    info!("leadscout stopped");
    result
}

/// Opens the database and loads the keyword set, seeding it from the
/// keywords file when one exists.
async fn open_storage(
    config: &LeadscoutConfig,
    clock: Arc<dyn Clock>,
) -> Result<(Arc<LeadStore>, Arc<KeywordStore>), LeadscoutError> {
    let store = LeadStore::new(config.storage.clone(), Arc::clone(&clock));
    store.initialize().await?;
    let keywords = KeywordStore::open(store.database()?.clone(), clock).await?;

    let keywords_file = &config.sources.keywords_file;
    if Path::new(keywords_file).is_file() {
        keywords.seed_from_file(keywords_file).await?;
    } else {
        info!(path = %keywords_file, "no keywords file, using stored keywords only");
    }
    if keywords.is_empty() {
        warn!("keyword set is empty, no message will match");
    }

    Ok((Arc::new(store), Arc::new(keywords)))
}

async fn connect_chat(services: &Services) -> Result<Arc<TelegramClient>, LeadscoutError> {
    let chat = TelegramClient::new(&services.config.telegram)?;
    chat.connect().await?;
    services.runtime.set_telegram_connected(true);
    Ok(Arc::new(chat))
}

fn build_pipeline(
    services: &Services,
    chat: Arc<TelegramClient>,
) -> Result<Arc<IngestPipeline>, LeadscoutError> {
    let config = &services.config;
    let drafter = ReplyGenerator::from_config(&config.reply)?;
    services.runtime.set_ai_connected(drafter.is_available());

    let publisher: Arc<dyn EventPublisher> = Arc::new(services.events.clone());
    let deps = PipelineDeps {
        chat,
        store: Arc::clone(&services.store),
        keywords: Arc::clone(&services.keywords),
        publisher,
        drafter: Arc::new(drafter),
        clock: Arc::clone(&services.clock),
    };

    let pipeline = IngestPipeline::new(
        deps,
        PipelineSettings::from_config(config),
        ReplyThrottle::new(&config.reply),
    )
    .with_shutdown(services.shutdown.clone());
    Ok(Arc::new(pipeline))
}

fn spawn_gateway(
    services: &Services,
    scan_trigger: Option<mpsc::Sender<()>>,
) -> JoinHandle<Result<(), LeadscoutError>> {
    let mut state = GatewayState::new(
        Arc::clone(&services.store),
        Arc::clone(&services.keywords),
        Arc::clone(&services.config),
        Arc::clone(&services.clock),
    )
    .with_events(services.events.clone())
    .with_runtime(Arc::clone(&services.runtime));
    if let Some(trigger) = scan_trigger {
        state = state.with_scan_trigger(trigger);
    }

    let server_config = ServerConfig::from(&services.config.gateway);
    let shutdown = services.shutdown.clone();
    tokio::spawn(async move { start_server(&server_config, state, shutdown).await })
}

async fn join_gateway(handle: JoinHandle<Result<(), LeadscoutError>>) -> Result<(), LeadscoutError> {
    handle
        .await
        .map_err(|e| LeadscoutError::Internal(format!("dashboard task failed: {e}")))?
}

fn log_scan_report(report: &ScanReport) {
    info!(
        chats = report.chats_scanned,
        skipped = report.chats_skipped,
        messages = report.messages_seen,
        leads = report.leads,
        rows = report.rows.len(),
        csv = ?report.csv_path,
        json = ?report.json_path,
        "scan finished"
    );
}

/// Lets scheduled replies finish unless shutdown is requested first.
async fn finish_replies(pipeline: &IngestPipeline, shutdown: &CancellationToken) {
    let pending = pipeline.pending_replies();
    if pending == 0 {
        return;
    }
    info!(pending, "waiting for scheduled replies");
    tokio::select! {
        _ = pipeline.wait_for_replies() => {}
        _ = shutdown.cancelled() => {}
    }
}

async fn release_chat(chat: &TelegramClient) {
    if let Err(e) = chat.shutdown().await {
        warn!(error = %e, "telegram client shutdown failed");
    }
}

async fn run_scan(services: &Services) -> Result<(), LeadscoutError> {
    let chat = connect_chat(services).await?;
    let pipeline = build_pipeline(services, Arc::clone(&chat))?;
    let refs = load_chat_refs(&services.config.sources.chats_file).await?;

    let result = pipeline.scan(&refs).await;
    if let Ok(report) = &result {
        log_scan_report(report);
        finish_replies(&pipeline, &services.shutdown).await;
    }

    pipeline.shutdown().await;
    release_chat(&chat).await;
    result.map(|_| ())
}

async fn run_watch(services: &Services) -> Result<(), LeadscoutError> {
    let chat = connect_chat(services).await?;
    let pipeline = build_pipeline(services, Arc::clone(&chat))?;
    let refs = load_chat_refs(&services.config.sources.chats_file).await?;

    services.runtime.set_monitoring_active(true);
    let result = pipeline.watch(&refs, services.shutdown.clone()).await;
    services.runtime.set_monitoring_active(false);

    if let Ok(report) = &result {
        info!(messages = report.messages_seen, leads = report.leads, "watch finished");
    }
    pipeline.shutdown().await;
    release_chat(&chat).await;
    result.map(|_| ())
}

/// Scans once, then watches with the dashboard running. Dashboard scan
/// requests are served while watching.
async fn run_both(services: &Services) -> Result<(), LeadscoutError> {
    let (trigger_tx, trigger_rx) = mpsc::channel(1);
    let gateway = spawn_gateway(services, Some(trigger_tx));

    let chat = connect_chat(services).await?;
    let pipeline = build_pipeline(services, Arc::clone(&chat))?;
    let refs = load_chat_refs(&services.config.sources.chats_file).await?;

    match pipeline.scan(&refs).await {
        Ok(report) => log_scan_report(&report),
        Err(e) => error!(error = %e, "initial scan failed, continuing with watch"),
    }

    let rescans = tokio::spawn(rescan_on_demand(
        Arc::clone(&pipeline),
        refs.clone(),
        trigger_rx,
        services.shutdown.clone(),
    ));

    services.runtime.set_monitoring_active(true);
    let watched = pipeline.watch(&refs, services.shutdown.clone()).await;
    services.runtime.set_monitoring_active(false);

    match &watched {
        Ok(report) => info!(messages = report.messages_seen, leads = report.leads, "watch finished"),
        Err(e) => error!(error = %e, "watch stopped"),
    }

    services.shutdown.cancel();
    pipeline.shutdown().await;
    let _ = rescans.await;
    let served = join_gateway(gateway).await;
    release_chat(&chat).await;

    watched?;
    served
}

async fn run_api(services: &Services) -> Result<(), LeadscoutError> {
    join_gateway(spawn_gateway(services, None)).await
}

/// Runs a scan for every dashboard request until shutdown.
async fn rescan_on_demand(
    pipeline: Arc<IngestPipeline>,
    refs: Vec<ChatRef>,
    mut requests: mpsc::Receiver<()>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            request = requests.recv() => {
                if request.is_none() {
                    break;
                }
                info!("scan requested from dashboard");
                match pipeline.scan(&refs).await {
                    Ok(report) => log_scan_report(&report),
                    Err(e) => error!(error = %e, "requested scan failed"),
                }
            }
        }
    }
}
