// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply drafting with bounded retries and template fallback.

use std::time::Duration;

use async_trait::async_trait;
use leadscout_config::model::ReplyConfig;
use leadscout_core::{LeadscoutError, QualityTier, ReplyDrafter};
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::client::{CallError, OracleClient};
use crate::prompt::{build_prompt, clean_response, fallback_reply, is_substantial};
use crate::types::CompletionRequest;

/// Waits applied between oracle attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per model.
    pub max_attempts: u32,
    /// A 429 on attempt `n` waits `n * rate_limit_step`.
    pub rate_limit_step: Duration,
    /// Wait after any other non-success status.
    pub server_error_wait: Duration,
    /// Wait after a timeout or transport failure.
    pub transport_wait: Duration,
    /// Pause before moving to the next model.
    pub model_gap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_step: Duration::from_secs(15),
            server_error_wait: Duration::from_secs(10),
            transport_wait: Duration::from_secs(5),
            model_gap: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget with every wait set to zero.
    pub fn immediate() -> Self {
        Self {
            rate_limit_step: Duration::ZERO,
            server_error_wait: Duration::ZERO,
            transport_wait: Duration::ZERO,
            model_gap: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// What to do after one model's attempts.
enum ModelOutcome {
    Reply(String),
    NextModel,
    Fallback,
}

/// Drafts replies via the oracle, falling back to fixed templates.
///
/// [`ReplyGenerator::generate`] never fails: every error path ends in a
/// template for the lead's tier.
#[derive(Debug, Clone)]
pub struct ReplyGenerator {
    client: Option<OracleClient>,
    models: Vec<String>,
    policy: RetryPolicy,
}

impl ReplyGenerator {
    pub fn new(client: Option<OracleClient>, models: Vec<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            models,
            policy,
        }
    }

    /// Builds the generator from config.
    ///
    /// With the oracle disabled or no API key, the generator only serves
    /// templates.
    pub fn from_config(config: &ReplyConfig) -> Result<Self, LeadscoutError> {
        let client = match (config.enable_together_ai, config.resolved_api_key()) {
            (true, Some(key)) => Some(OracleClient::new(
                &key,
                &config.api_url,
                Duration::from_secs(config.request_timeout_secs),
            )?),
            (true, None) => {
                warn!("TOGETHER_API_KEY not set, replies will use templates");
                None
            }
            (false, _) => {
                info!("oracle disabled, replies will use templates");
                None
            }
        };
        Ok(Self::new(client, config.models.clone(), RetryPolicy::default()))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether drafts can come from the oracle rather than templates only.
    pub fn is_available(&self) -> bool {
        self.client.is_some() && !self.models.is_empty()
    }

    /// Drafts a reply to `message_text`.
    pub async fn generate(&self, message_text: &str, tier: QualityTier, sender_name: &str) -> String {
        let Some(client) = &self.client else {
            return fallback_reply(tier);
        };

        let prompt = build_prompt(message_text, tier, sender_name);
        for (index, model) in self.models.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.policy.model_gap).await;
            }
            match self.try_model(client, model, &prompt).await {
                ModelOutcome::Reply(reply) => {
                    info!(model = %model, tier = %tier, "oracle reply drafted");
                    return reply;
                }
                ModelOutcome::NextModel => continue,
                ModelOutcome::Fallback => break,
            }
        }

        warn!(tier = %tier, "using template reply");
        fallback_reply(tier)
    }

    async fn try_model(&self, client: &OracleClient, model: &str, prompt: &str) -> ModelOutcome {
        let request = CompletionRequest::user_prompt(model, prompt);

        for attempt in 1..=self.policy.max_attempts {
            let wait = match client.complete(&request).await {
                Ok(raw) => {
                    if !is_substantial(raw.trim()) {
                        warn!(model, "oracle returned an empty reply, trying next model");
                        return ModelOutcome::NextModel;
                    }
                    let cleaned = clean_response(&raw);
                    return if is_substantial(&cleaned) {
                        ModelOutcome::Reply(cleaned)
                    } else {
                        debug!(model, raw = %raw, "nothing left after cleaning");
                        ModelOutcome::Fallback
                    };
                }
                Err(CallError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED => {
                    error!(model, "oracle rejected the API key");
                    return ModelOutcome::Fallback;
                }
                Err(CallError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                    warn!(model, "model not found, trying next model");
                    return ModelOutcome::NextModel;
                }
                Err(CallError::Status { status, .. })
                    if status == StatusCode::TOO_MANY_REQUESTS =>
                {
                    self.policy.rate_limit_step * attempt
                }
                Err(e @ CallError::Status { .. }) => {
                    warn!(model, attempt, error = %e, "oracle error");
                    self.policy.server_error_wait
                }
                Err(e) => {
                    warn!(model, attempt, error = %e, "oracle unreachable");
                    self.policy.transport_wait
                }
            };

            if attempt < self.policy.max_attempts {
                debug!(model, attempt, wait_ms = wait.as_millis() as u64, "retrying oracle");
                tokio::time::sleep(wait).await;
            }
        }

        warn!(model, attempts = self.policy.max_attempts, "oracle attempts exhausted");
        ModelOutcome::NextModel
    }
}

#[async_trait]
impl ReplyDrafter for ReplyGenerator {
    async fn draft(&self, message_text: &str, tier: QualityTier, sender_name: &str) -> String {
        self.generate(message_text, tier, sender_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::fallback_templates;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer, models: &[&str]) -> ReplyGenerator {
        let client = OracleClient::new(
            "key",
            &format!("{}/v1/chat/completions", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap();
        ReplyGenerator::new(
            Some(client),
            models.iter().map(|m| m.to_string()).collect(),
            RetryPolicy::immediate(),
        )
    }

    fn reply_body(content: &str) -> serde_json::Value {
        serde_json::json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn successful_reply_is_cleaned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
                "<think>\nплан ответа\n</think>\nОтвет: Здравствуйте, Анна!  Готов помочь 🎬",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(&server, &["m1"])
            .generate("Ищу видеопродюсера", QualityTier::Good, "Анна")
            .await;
        assert_eq!(reply, "Здравствуйте, Анна! Готов помочь 🎬");
    }

    #[tokio::test]
    async fn three_rate_limits_fall_back_to_tier_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let reply = generator(&server, &["m1"])
            .generate("Срочно нужен монтаж", QualityTier::Hot, "Клиент")
            .await;
        assert!(fallback_templates(QualityTier::Hot).contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn unauthorized_falls_back_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(&server, &["m1", "m2"])
            .generate("text", QualityTier::Normal, "")
            .await;
        assert!(fallback_templates(QualityTier::Normal).contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn missing_model_moves_to_next() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"model": "gone"})))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"model": "live"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
                "Привет! Пишите в ЛС, обсудим проект.",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(&server, &["gone", "live"])
            .generate("text", QualityTier::Good, "Олег")
            .await;
        assert_eq!(reply, "Привет! Пишите в ЛС, обсудим проект.");
    }

    #[tokio::test]
    async fn server_errors_retry_then_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
                "Добрый день! Готов снять ваш ролик.",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(&server, &["m1"])
            .generate("text", QualityTier::Hot, "Ира")
            .await;
        assert_eq!(reply, "Добрый день! Готов снять ваш ролик.");
    }

    #[tokio::test]
    async fn short_raw_reply_tries_next_model_then_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Ок")))
            .expect(2)
            .mount(&server)
            .await;

        let reply = generator(&server, &["m1", "m2"])
            .generate("text", QualityTier::Good, "x")
            .await;
        assert!(fallback_templates(QualityTier::Good).contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn reply_that_is_only_reasoning_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_body(
                "<think>long internal reasoning about the lead</think>",
            )))
            .expect(1)
            .mount(&server)
            .await;

        let reply = generator(&server, &["m1", "m2"])
            .generate("text", QualityTier::Hot, "x")
            .await;
        assert!(fallback_templates(QualityTier::Hot).contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn disabled_oracle_serves_templates() {
        let config = ReplyConfig {
            enable_together_ai: false,
            api_key: Some("key".into()),
            ..ReplyConfig::default()
        };
        let generator = ReplyGenerator::from_config(&config).unwrap();
        assert!(!generator.is_available());
        let reply = generator.draft("text", QualityTier::LowQuality, "x").await;
        assert!(fallback_templates(QualityTier::LowQuality).contains(&reply.as_str()));
    }

    #[test]
    fn default_policy_matches_documented_waits() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.rate_limit_step * 2, Duration::from_secs(30));
        assert_eq!(RetryPolicy::immediate().max_attempts, 3);
    }
}
