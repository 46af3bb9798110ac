// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the completion oracle.
//!
//! [`OracleClient`] performs exactly one request per call. Retry and
//! fallback policy live in the generator, which needs to see the raw
//! status of each attempt.

use std::time::Duration;

use leadscout_core::LeadscoutError;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::debug;

use crate::types::{CompletionRequest, CompletionResponse};

/// Why a single oracle call did not produce a body.
#[derive(Debug, Error)]
pub enum CallError {
    /// The oracle answered with a non-success status.
    #[error("oracle returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    /// The request did not complete within the client timeout.
    #[error("oracle request timed out")]
    Timeout,
    /// Connection, TLS, or body decoding failure.
    #[error("oracle transport error: {0}")]
    Transport(String),
}

/// Bearer-authenticated chat-completions client.
#[derive(Debug, Clone)]
pub struct OracleClient {
    client: reqwest::Client,
    api_url: String,
}

impl OracleClient {
    pub fn new(api_key: &str, api_url: &str, timeout: Duration) -> Result<Self, LeadscoutError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| LeadscoutError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LeadscoutError::Oracle {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sends one request and returns the first choice's raw content.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, CallError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        debug!(%status, model = %request.model, "oracle response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CallError::Status { status, body });
        }

        let parsed: CompletionResponse = response.json().await.map_err(classify)?;
        Ok(parsed.first_content().to_string())
    }
}

fn classify(e: reqwest::Error) -> CallError {
    if e.is_timeout() {
        CallError::Timeout
    } else {
        CallError::Transport(e.to_string())
    }
}
