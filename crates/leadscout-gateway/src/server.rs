// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the dashboard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use dashmap::DashMap;
use leadscout_config::LeadscoutConfig;
use leadscout_config::model::GatewayConfig;
use leadscout_core::{Clock, LeadscoutError};
use leadscout_scoring::QualityScorer;
use leadscout_storage::{KeywordStore, LeadStore};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::events::BroadcastPublisher;
use crate::handlers;
use crate::ws;

/// Liveness flags owned by the running modes and reported by `/api/status`.
#[derive(Debug, Default)]
pub struct RuntimeStatus {
    telegram_connected: AtomicBool,
    ai_connected: AtomicBool,
    monitoring_active: AtomicBool,
}

impl RuntimeStatus {
    pub fn set_telegram_connected(&self, value: bool) {
        self.telegram_connected.store(value, Ordering::Relaxed);
    }

    pub fn set_ai_connected(&self, value: bool) {
        self.ai_connected.store(value, Ordering::Relaxed);
    }

    pub fn set_monitoring_active(&self, value: bool) {
        self.monitoring_active.store(value, Ordering::Relaxed);
    }

    pub fn telegram_connected(&self) -> bool {
        self.telegram_connected.load(Ordering::Relaxed)
    }

    pub fn ai_connected(&self) -> bool {
        self.ai_connected.load(Ordering::Relaxed)
    }

    pub fn monitoring_active(&self) -> bool {
        self.monitoring_active.load(Ordering::Relaxed)
    }
}

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<LeadStore>,
    pub keywords: Arc<KeywordStore>,
    pub scorer: Arc<QualityScorer>,
    /// Effective configuration, as loaded at startup.
    pub config: Arc<LeadscoutConfig>,
    pub clock: Arc<dyn Clock>,
    pub runtime: Arc<RuntimeStatus>,
    pub events: BroadcastPublisher,
    /// Map of ws_id -> mpsc sender for WebSocket fan-out.
    pub ws_senders: Arc<DashMap<String, mpsc::Sender<String>>>,
    /// Requests an on-demand scan. `None` when no scanner runs in-process.
    pub scan_trigger: Option<mpsc::Sender<()>>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(
        store: Arc<LeadStore>,
        keywords: Arc<KeywordStore>,
        config: Arc<LeadscoutConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let auth = AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        };
        Self {
            store,
            keywords,
            scorer: Arc::new(QualityScorer::default()),
            config,
            clock,
            runtime: Arc::new(RuntimeStatus::default()),
            events: BroadcastPublisher::default(),
            ws_senders: Arc::new(DashMap::new()),
            scan_trigger: None,
            auth,
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }

    pub fn with_events(mut self, events: BroadcastPublisher) -> Self {
        self.events = events;
        self
    }

    pub fn with_runtime(mut self, runtime: Arc<RuntimeStatus>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_scan_trigger(mut self, trigger: mpsc::Sender<()>) -> Self {
        self.scan_trigger = Some(trigger);
        self
    }
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Builds the dashboard router.
///
/// - `GET /health` is public
/// - `/api/*` goes through [`auth_middleware`]
/// - `GET /ws` streams lead updates
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/status", get(handlers::get_status))
        .route(
            "/api/settings",
            get(handlers::get_settings).post(handlers::post_settings),
        )
        .route("/api/leads", get(handlers::get_leads))
        .route(
            "/api/keywords",
            get(handlers::get_keywords)
                .post(handlers::post_keyword)
                .delete(handlers::delete_keyword),
        )
        .route("/api/test-keyword", post(handlers::test_keyword))
        .route(
            "/api/chat-sources",
            get(handlers::get_chat_sources)
                .post(handlers::post_chat_source)
                .delete(handlers::delete_chat_source),
        )
        .route("/api/pending-responses", get(handlers::get_pending_responses))
        .route("/api/response-action", post(handlers::post_response_action))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/export", get(handlers::get_export))
        .route("/api/scan-leads", post(handlers::post_scan_leads))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the dashboard until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), LeadscoutError> {
    if state.auth.bearer_token.is_none() {
        tracing::warn!("dashboard API has no bearer token configured");
    }

    let relay = tokio::spawn(ws::relay_events(
        state.events.subscribe(),
        Arc::clone(&state.ws_senders),
        shutdown.clone(),
    ));

    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadscoutError::Internal(format!("failed to bind dashboard to {addr}: {e}")))?;

    tracing::info!(%addr, "dashboard listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .map_err(|e| LeadscoutError::Internal(format!("dashboard server error: {e}")));

    shutdown.cancel();
    let _ = relay.await;
    tracing::info!("dashboard stopped");
    result
}
