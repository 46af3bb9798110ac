// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the dashboard API.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use leadscout_core::{LeadscoutError, PluginAdapter};
use leadscout_scoring::normalize_phrase;
use leadscout_storage::{LeadStats, ResponseStatus, SettingValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;

use crate::export::{self, ExportFormat};
use crate::server::GatewayState;

/// Most leads a single export returns.
pub const EXPORT_LIMIT: i64 = 10_000;

// --- Errors ---

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A handler failure with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl From<LeadscoutError> for ApiError {
    fn from(e: LeadscoutError) -> Self {
        tracing::error!(error = %e, "dashboard request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn success(message: &str) -> Json<Value> {
    Json(serde_json::json!({"status": "success", "message": message}))
}

// --- Health and status ---

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
///
/// Unauthenticated. Degraded when the database does not answer.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let status = match state.store.health_check().await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            "degraded"
        }
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// Response body for GET /api/status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub telegram_connected: bool,
    pub ai_connected: bool,
    pub monitoring_active: bool,
    #[serde(flatten)]
    pub stats: LeadStats,
}

/// GET /api/status
pub async fn get_status(State(state): State<GatewayState>) -> ApiResult<Json<StatusResponse>> {
    let stats = state.store.stats_since(1).await?;
    Ok(Json(StatusResponse {
        telegram_connected: state.runtime.telegram_connected(),
        ai_connected: state.runtime.ai_connected(),
        monitoring_active: state.runtime.monitoring_active(),
        stats,
    }))
}

// --- Settings ---

fn setting_json(value: SettingValue) -> Value {
    match value {
        SettingValue::Bool(b) => Value::Bool(b),
        SettingValue::Int(i) => Value::from(i),
        SettingValue::String(s) => Value::String(s),
        SettingValue::Json(v) => v,
    }
}

fn setting_value(value: Value) -> SettingValue {
    match value {
        Value::Bool(b) => SettingValue::Bool(b),
        Value::Number(n) if n.is_i64() => n
            .as_i64()
            .map(SettingValue::Int)
            .unwrap_or(SettingValue::Json(Value::Number(n))),
        Value::String(s) => SettingValue::String(s),
        other => SettingValue::Json(other),
    }
}

/// GET /api/settings
///
/// The effective configuration with secrets removed, plus every stored
/// dashboard setting.
pub async fn get_settings(State(state): State<GatewayState>) -> ApiResult<Json<Value>> {
    let mut effective = (*state.config).clone();
    effective.reply.api_key = None;
    effective.telegram.bot_token = None;
    effective.gateway.bearer_token = None;
    let config = serde_json::to_value(&effective)
        .map_err(|e| LeadscoutError::Internal(format!("cannot encode config: {e}")))?;

    let stored: serde_json::Map<String, Value> = state
        .store
        .settings()
        .await?
        .into_iter()
        .map(|(key, value)| (key, setting_json(value)))
        .collect();

    Ok(Json(serde_json::json!({"config": config, "stored": stored})))
}

/// POST /api/settings
///
/// Stores each top-level key as a typed setting.
pub async fn post_settings(
    State(state): State<GatewayState>,
    Json(body): Json<serde_json::Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let mut updated = 0;
    for (key, value) in body {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        state.store.set_setting(key, &setting_value(value)).await?;
        updated += 1;
    }
    tracing::info!(updated, "dashboard settings stored");
    Ok(Json(serde_json::json!({"status": "success", "updated": updated})))
}

// --- Leads ---

#[derive(Debug, Deserialize)]
pub struct LeadsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default = "default_hours")]
    pub hours: i64,
}

fn default_limit() -> i64 {
    20
}

fn default_hours() -> i64 {
    24
}

/// GET /api/leads?limit=20&hours=24
pub async fn get_leads(
    State(state): State<GatewayState>,
    Query(query): Query<LeadsQuery>,
) -> ApiResult<impl IntoResponse> {
    let leads = state
        .store
        .recent_leads(query.limit.clamp(1, 1000), query.hours.max(1))
        .await?;
    Ok(Json(leads))
}

// --- Keywords ---

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    pub phrase: String,
}

#[derive(Debug, Deserialize)]
pub struct PhraseQuery {
    pub phrase: String,
}

/// GET /api/keywords
pub async fn get_keywords(State(state): State<GatewayState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.keywords.list_all().await?))
}

/// POST /api/keywords
pub async fn post_keyword(
    State(state): State<GatewayState>,
    Json(body): Json<KeywordRequest>,
) -> ApiResult<Response> {
    let Some(phrase) = normalize_phrase(&body.phrase) else {
        return Err(ApiError::bad_request("empty keyword"));
    };
    if !state.keywords.add(&phrase).await? {
        return Err(ApiError::conflict("keyword already exists"));
    }
    tracing::info!(phrase = %phrase, "keyword added from dashboard");
    Ok((StatusCode::CREATED, success("keyword added")).into_response())
}

/// DELETE /api/keywords?phrase=
pub async fn delete_keyword(
    State(state): State<GatewayState>,
    Query(query): Query<PhraseQuery>,
) -> ApiResult<Json<Value>> {
    if !state.keywords.remove(&query.phrase).await? {
        return Err(ApiError::not_found("keyword not found"));
    }
    tracing::info!(phrase = %query.phrase, "keyword removed from dashboard");
    Ok(success("keyword removed"))
}

#[derive(Debug, Deserialize)]
pub struct TestKeywordRequest {
    #[serde(default)]
    pub message: String,
}

/// Scoring result shown by the keyword tester.
#[derive(Debug, Serialize)]
pub struct QualityReport {
    pub score: i32,
    pub tier: &'static str,
    pub quality: &'static str,
    pub reasons: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TestKeywordResponse {
    pub hit: bool,
    pub matched: Vec<String>,
    pub quality: QualityReport,
}

/// POST /api/test-keyword
///
/// Dry run of the keyword and scoring stages; nothing is stored.
pub async fn test_keyword(
    State(state): State<GatewayState>,
    Json(body): Json<TestKeywordRequest>,
) -> ApiResult<Json<TestKeywordResponse>> {
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("message must not be empty"));
    }
    let matched = state.keywords.matching(&body.message);
    let card = state.scorer.score(&body.message);
    Ok(Json(TestKeywordResponse {
        hit: !matched.is_empty(),
        matched,
        quality: QualityReport {
            score: card.score,
            tier: card.tier.code(),
            quality: card.tier.display(),
            reasons: card.reasons,
        },
    }))
}

// --- Chat sources ---

#[derive(Debug, Deserialize)]
pub struct ChatSourceRequest {
    pub chat_id: String,
    #[serde(default)]
    pub chat_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatIdQuery {
    pub chat_id: String,
}

/// GET /api/chat-sources
pub async fn get_chat_sources(State(state): State<GatewayState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store.chat_sources().await?))
}

/// POST /api/chat-sources
pub async fn post_chat_source(
    State(state): State<GatewayState>,
    Json(body): Json<ChatSourceRequest>,
) -> ApiResult<Response> {
    let chat_id = body.chat_id.trim();
    if chat_id.is_empty() {
        return Err(ApiError::bad_request("empty chat id"));
    }
    let name = body
        .chat_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(chat_id);
    if !state.store.add_chat_source(chat_id, Some(name), None).await? {
        return Err(ApiError::conflict("chat source already exists"));
    }
    Ok((StatusCode::CREATED, success("chat source added")).into_response())
}

/// DELETE /api/chat-sources?chat_id=
pub async fn delete_chat_source(
    State(state): State<GatewayState>,
    Query(query): Query<ChatIdQuery>,
) -> ApiResult<Json<Value>> {
    if !state.store.remove_chat_source(&query.chat_id).await? {
        return Err(ApiError::not_found("chat source not found"));
    }
    Ok(success("chat source removed"))
}

// --- Review queue ---

/// GET /api/pending-responses
pub async fn get_pending_responses(
    State(state): State<GatewayState>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store.pending_responses().await?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAction {
    Approve,
    Reject,
    Edit,
}

#[derive(Debug, Deserialize)]
pub struct ResponseActionRequest {
    pub response_id: i64,
    pub action: ResponseAction,
    #[serde(default)]
    pub edited_text: Option<String>,
}

/// POST /api/response-action
///
/// `approve` and `reject` settle a drafted reply; `edit` replaces its text
/// and keeps it pending.
pub async fn post_response_action(
    State(state): State<GatewayState>,
    Json(body): Json<ResponseActionRequest>,
) -> ApiResult<Json<Value>> {
    let edited = body.edited_text.as_deref().map(str::trim);
    let (status, edited) = match body.action {
        ResponseAction::Approve => (ResponseStatus::Approved, None),
        ResponseAction::Reject => (ResponseStatus::Rejected, None),
        ResponseAction::Edit => match edited.filter(|t| !t.is_empty()) {
            Some(text) => (ResponseStatus::Pending, Some(text)),
            None => return Err(ApiError::bad_request("edit requires edited_text")),
        },
    };

    if !state
        .store
        .update_response_status(body.response_id, status, edited)
        .await?
    {
        return Err(ApiError::not_found("response not found"));
    }
    tracing::info!(response_id = body.response_id, %status, "review action applied");
    Ok(Json(serde_json::json!({
        "status": "success",
        "response_id": body.response_id,
        "response_status": status.to_string(),
    })))
}

// --- Analytics and export ---

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}

/// GET /api/analytics?days=7
pub async fn get_analytics(
    State(state): State<GatewayState>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.store.analytics(query.days.clamp(1, 365)).await?))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_days")]
    pub days: i64,
}

/// GET /api/export?format=csv|json&days=7
///
/// Returns the leads of the last `days` days as a file attachment.
pub async fn get_export(
    State(state): State<GatewayState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let hours = query.days.clamp(1, 365) * 24;
    let leads = state.store.recent_leads(EXPORT_LIMIT, hours).await?;
    let body = export::render(query.format, &leads)?;

    let filename = format!(
        "leads_export_{}.{}",
        state.clock.local_now().format("%Y%m%d_%H%M%S"),
        query.format.extension()
    );
    tracing::info!(leads = leads.len(), file = %filename, "dashboard export");
    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}

// --- Scan trigger ---

/// POST /api/scan-leads
///
/// Queues one on-demand scan. A second request while one is queued is
/// accepted without queueing another.
pub async fn post_scan_leads(State(state): State<GatewayState>) -> ApiResult<Response> {
    let Some(trigger) = state.scan_trigger.as_ref() else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "no scanner is running",
        ));
    };
    let status = match trigger.try_send(()) {
        Ok(()) => "accepted",
        Err(TrySendError::Full(())) => "already_queued",
        Err(TrySendError::Closed(())) => {
            return Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "scanner has stopped",
            ));
        }
    };
    tracing::info!(status, "scan requested from dashboard");
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": status})),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_values_round_trip_through_json() {
        for value in [
            serde_json::json!(true),
            serde_json::json!(42),
            serde_json::json!("text"),
            serde_json::json!({"nested": [1, 2]}),
            serde_json::json!(1.5),
        ] {
            assert_eq!(setting_json(setting_value(value.clone())), value);
        }
        assert_eq!(setting_value(serde_json::json!(7)), SettingValue::Int(7));
    }

    #[test]
    fn response_actions_parse_lowercase() {
        let body: ResponseActionRequest =
            serde_json::from_str(r#"{"response_id": 3, "action": "edit", "edited_text": "Hi"}"#)
                .unwrap();
        assert_eq!(body.action, ResponseAction::Edit);
        assert_eq!(body.edited_text.as_deref(), Some("Hi"));
        assert!(serde_json::from_str::<ResponseActionRequest>(
            r#"{"response_id": 3, "action": "delete"}"#
        )
        .is_err());
    }
}
