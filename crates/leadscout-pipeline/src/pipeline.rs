// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message processing: filter, match, score, persist, notify, forward,
//! decide on a reply, pace.

use std::sync::Arc;

use leadscout_core::{
    ChatClient, ChatMessage, ChatTarget, Clock, EventPublisher, OutboundMessage, ReplyDrafter,
};
use leadscout_reply::{ReplyDecision, ReplyThrottle};
use leadscout_scoring::{QualityScorer, ScoreCard};
use leadscout_storage::{KeywordStore, LeadStore, NewLead};
use tokio::sync::{Mutex, OnceCell};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::card::{self, LeadCard};
use crate::filters;
use crate::reply::{ReplyJob, ReplyWorker};
use crate::settings::{PipelineSettings, random_secs};

/// Collaborators the pipeline is wired to.
#[derive(Clone)]
pub struct PipelineDeps {
    pub chat: Arc<dyn ChatClient>,
    pub store: Arc<LeadStore>,
    pub keywords: Arc<KeywordStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub drafter: Arc<dyn ReplyDrafter>,
    pub clock: Arc<dyn Clock>,
}

/// Why a message did not become a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutsideWindow,
    TooShort,
    NoKeywords,
    NoMatch,
}

/// A message that became a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadOutcome {
    /// `0` when the lead could not be persisted.
    pub lead_id: i64,
    pub score: ScoreCard,
    pub matched: Vec<String>,
    /// Whether the card reached the operator.
    pub delivered: bool,
    /// `None` when auto-replies are disabled.
    pub reply: Option<ReplyDecision>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Lead(LeadOutcome),
}

impl Outcome {
    pub fn lead(&self) -> Option<&LeadOutcome> {
        match self {
            Self::Lead(lead) => Some(lead),
            Self::Skipped(_) => None,
        }
    }
}

/// The lead ingestion pipeline.
///
/// One instance serves both scan and watch modes. Messages are processed one
/// at a time by the caller; only delayed replies run concurrently, tracked so
/// that shutdown can cancel them.
pub struct IngestPipeline {
    pub(crate) deps: PipelineDeps,
    pub(crate) settings: PipelineSettings,
    scorer: QualityScorer,
    throttle: Arc<Mutex<ReplyThrottle>>,
    target: OnceCell<ChatTarget>,
    tracker: TaskTracker,
    pub(crate) cancel: CancellationToken,
}

impl IngestPipeline {
    pub fn new(deps: PipelineDeps, settings: PipelineSettings, throttle: ReplyThrottle) -> Self {
        Self {
            deps,
            settings,
            scorer: QualityScorer::default(),
            throttle: Arc::new(Mutex::new(throttle)),
            target: OnceCell::new(),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the default video-production scorer.
    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Ties pacing and pending replies to an external shutdown token.
    pub fn with_shutdown(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn throttle(&self) -> &Arc<Mutex<ReplyThrottle>> {
        &self.throttle
    }

    /// Number of reply tasks still sleeping or in flight.
    pub fn pending_replies(&self) -> usize {
        self.tracker.len()
    }

    /// Resolves the operator target once.
    ///
    /// An unresolvable target falls back to saved messages.
    pub async fn forward_target(&self) -> &ChatTarget {
        self.target
            .get_or_init(|| async {
                let raw = self.settings.forward_to.as_str();
                match self.deps.chat.resolve_target(raw).await {
                    Ok(target) => {
                        info!(target = %target, "forwarding leads");
                        target
                    }
                    Err(e) => {
                        warn!(target = raw, error = %e, "forward target unresolved, using saved messages");
                        ChatTarget::SavedMessages
                    }
                }
            })
            .await
    }

    /// Runs one message through every stage after the timeframe check.
    pub async fn process(&self, message: &ChatMessage) -> Outcome {
        if !filters::long_enough(&message.text, self.settings.min_length) {
            return Outcome::Skipped(SkipReason::TooShort);
        }

        if self.deps.keywords.is_empty() {
            warn!("no active keywords, nothing can match");
            return Outcome::Skipped(SkipReason::NoKeywords);
        }
        let matched = self.deps.keywords.matching(&message.text);
        if matched.is_empty() {
            return Outcome::Skipped(SkipReason::NoMatch);
        }
        for phrase in &matched {
            if let Err(e) = self.deps.keywords.record_hit(phrase).await {
                warn!(phrase = phrase.as_str(), error = %e, "failed to record keyword hit");
            }
        }

        let score = self.scorer.score(&message.text);
        let lead_id = self.persist(message, &score).await;
        info!(
            lead_id,
            chat = %message.chat.display_title(),
            sender = %message.sender_display(),
            score = score.score,
            tier = score.tier.code(),
            "lead found"
        );

        self.notify_dashboard(message, &score, lead_id).await;

        let target = self.forward_target().await.clone();
        let delivered = self.deliver_card(&target, message, &score, lead_id).await;
        if let Err(e) = self.deps.chat.forward(&target, message).await {
            error!(lead_id, error = %e, "failed to forward original message");
        }
        if delivered
            && lead_id > 0
            && let Err(e) = self.deps.store.mark_forwarded(lead_id).await
        {
            warn!(lead_id, error = %e, "failed to mark lead forwarded");
        }

        let reply = if self.settings.enable_auto_reply {
            Some(self.decide_reply(message, &score, lead_id, target).await)
        } else {
            debug!(lead_id, "auto-replies disabled");
            None
        };

        self.pace().await;

        Outcome::Lead(LeadOutcome {
            lead_id,
            score,
            matched,
            delivered,
            reply,
        })
    }

    async fn persist(&self, message: &ChatMessage, score: &ScoreCard) -> i64 {
        let chat_source = message.chat.source_key();
        let lead = NewLead {
            chat_source: chat_source.clone(),
            chat_title: Some(message.chat.display_title()),
            sender_id: message.sender_id(),
            sender_name: message.sender_display(),
            message_text: message.text.clone(),
            message_id: Some(message.message_id),
            quality_score: score.score,
            quality_reasons: score.reasons.clone(),
        };
        match self.deps.store.create_lead(lead).await {
            Ok(id) => id,
            Err(e) => {
                error!(
                    chat_source = chat_source.as_str(),
                    sender_id = ?message.sender_id(),
                    error = %e,
                    "failed to persist lead"
                );
                0
            }
        }
    }

    async fn notify_dashboard(&self, message: &ChatMessage, score: &ScoreCard, lead_id: i64) {
        let payload = serde_json::json!({
            "id": lead_id,
            "chat_source": message.chat.display_title(),
            "sender_name": message.sender_display(),
            "message_text": message.text,
            "quality_label": score.tier.code(),
            "quality_score": score.score,
            "timestamp": self.deps.clock.now().to_rfc3339(),
            "responded": false,
        });
        if let Err(e) = self.deps.publisher.publish("new_lead", payload).await {
            warn!(lead_id, error = %e, "failed to notify dashboard");
        }
    }

    /// Sends the card as markdown, then as plain text. Returns whether
    /// either attempt succeeded.
    async fn deliver_card(
        &self,
        target: &ChatTarget,
        message: &ChatMessage,
        score: &ScoreCard,
        lead_id: i64,
    ) -> bool {
        let text = LeadCard {
            message,
            score,
            lead_id,
            auto_reply_enabled: self.settings.enable_auto_reply,
        }
        .render();

        let markdown = OutboundMessage::markdown(target.clone(), text.clone());
        let Err(e) = self.deps.chat.send(markdown).await else {
            return true;
        };
        debug!(lead_id, error = %e, "markdown card failed, retrying as plain text");

        let plain = OutboundMessage::plain(target.clone(), card::plain_variant(&text));
        match self.deps.chat.send(plain).await {
            Ok(_) => true,
            Err(e) => {
                error!(lead_id, error = %e, "failed to send lead card");
                false
            }
        }
    }

    async fn decide_reply(
        &self,
        message: &ChatMessage,
        score: &ScoreCard,
        lead_id: i64,
        operator: ChatTarget,
    ) -> ReplyDecision {
        let decision = self
            .throttle
            .lock()
            .await
            .check(self.deps.clock.local_now(), score.score);
        if !decision.is_allowed() {
            info!(lead_id, reason = %decision, "auto-reply not scheduled");
            return decision;
        }

        let job = ReplyJob {
            lead_id,
            message: message.clone(),
            score: score.score,
            tier: score.tier,
            delay: self.settings.reply_delays.pick(score.tier),
            operator,
        };
        let worker = ReplyWorker {
            chat: self.deps.chat.clone(),
            store: self.deps.store.clone(),
            drafter: self.deps.drafter.clone(),
            clock: self.deps.clock.clone(),
            throttle: self.throttle.clone(),
        };
        self.tracker.spawn(worker.run(job, self.cancel.clone()));
        decision
    }

    /// Waits a random interval between matched messages.
    async fn pace(&self) {
        let delay = random_secs(&self.settings.pacing_secs);
        if delay.is_zero() {
            return;
        }
        debug!(secs = delay.as_secs(), "pacing before next lead");
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }

    /// Waits for in-flight replies to finish.
    pub async fn wait_for_replies(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Cancels pending replies and waits for their tasks to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("ingest pipeline stopped");
    }
}
