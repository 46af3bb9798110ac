// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed lead store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tokio::sync::OnceCell;
use tracing::debug;

use leadscout_config::model::StorageConfig;
use leadscout_core::{
    AdapterType, Clock, HealthStatus, LeadscoutError, PluginAdapter, StorageAdapter,
};

use crate::database::{Database, map_tr_err};
use crate::models::{
    Analytics, ChatSource, Lead, LeadStats, NewLead, PendingResponse, ResponseStatus,
    ResponseType, SettingValue,
};
use crate::queries;

/// Leads, chat-source aggregates, daily rollups, the review queue, and
/// settings behind one connection.
///
/// The database is opened by [`StorageAdapter::initialize`]. Every write goes
/// through the connection's background thread, so callers may share the store
/// freely behind an `Arc`.
pub struct LeadStore {
    config: StorageConfig,
    clock: Arc<dyn Clock>,
    db: OnceCell<Database>,
}

impl LeadStore {
    pub fn new(config: StorageConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            db: OnceCell::new(),
        }
    }

    /// An initialized store over a private in-memory database.
    pub async fn in_memory(clock: Arc<dyn Clock>) -> Result<Self, LeadscoutError> {
        let store = Self::new(
            StorageConfig {
                database_path: ":memory:".into(),
            },
            clock,
        );
        let db = Database::open_in_memory().await?;
        store.install(db)?;
        Ok(store)
    }

    fn install(&self, db: Database) -> Result<(), LeadscoutError> {
        self.db.set(db).map_err(|_| LeadscoutError::Storage {
            source: "storage already initialized".into(),
        })
    }

    /// The underlying database, or an error before [`StorageAdapter::initialize`].
    pub fn database(&self) -> Result<&Database, LeadscoutError> {
        self.db.get().ok_or_else(|| LeadscoutError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn today(&self) -> NaiveDate {
        self.clock.local_now().date()
    }

    // --- Leads ---

    /// Persists a lead together with its aggregate and rollup updates.
    pub async fn create_lead(&self, lead: NewLead) -> Result<i64, LeadscoutError> {
        let id =
            queries::leads::create_lead(self.database()?, lead, self.clock.now(), self.today())
                .await?;
        debug!(lead_id = id, "lead stored");
        Ok(id)
    }

    pub async fn get_lead(&self, id: i64) -> Result<Option<Lead>, LeadscoutError> {
        queries::leads::get_lead(self.database()?, id).await
    }

    /// Up to `limit` leads from the last `hours_back` hours, newest first.
    pub async fn recent_leads(
        &self,
        limit: i64,
        hours_back: i64,
    ) -> Result<Vec<Lead>, LeadscoutError> {
        let since = self.clock.now() - Duration::hours(hours_back);
        queries::leads::recent_leads(self.database()?, since, limit).await
    }

    /// Lead statistics over the last `days_back` days.
    pub async fn stats_since(&self, days_back: i64) -> Result<LeadStats, LeadscoutError> {
        let since = self.clock.now() - Duration::days(days_back);
        queries::leads::stats_since(self.database()?, since).await
    }

    /// Records a reply. Returns `false` when the lead does not exist.
    pub async fn mark_responded(
        &self,
        lead_id: i64,
        text: &str,
        response_type: ResponseType,
    ) -> Result<bool, LeadscoutError> {
        queries::leads::mark_responded(
            self.database()?,
            lead_id,
            text,
            response_type,
            self.clock.now(),
            self.today(),
        )
        .await
    }

    pub async fn mark_forwarded(&self, lead_id: i64) -> Result<bool, LeadscoutError> {
        queries::leads::mark_forwarded(self.database()?, lead_id, self.clock.now()).await
    }

    pub async fn count_leads(&self) -> Result<i64, LeadscoutError> {
        queries::leads::count_leads(self.database()?).await
    }

    /// Daily rollups for the last `days` local dates plus response totals.
    pub async fn analytics(&self, days: i64) -> Result<Analytics, LeadscoutError> {
        let since = self.today() - Duration::days(days);
        queries::stats::analytics(self.database()?, since).await
    }

    // --- Chat sources ---

    pub async fn chat_sources(&self) -> Result<Vec<ChatSource>, LeadscoutError> {
        queries::chat_sources::list(self.database()?).await
    }

    pub async fn add_chat_source(
        &self,
        chat_id: &str,
        chat_name: Option<&str>,
        chat_type: Option<&str>,
    ) -> Result<bool, LeadscoutError> {
        let chat_id = chat_id.trim().trim_start_matches('@');
        if chat_id.is_empty() {
            return Ok(false);
        }
        queries::chat_sources::add(self.database()?, chat_id, chat_name, chat_type).await
    }

    pub async fn remove_chat_source(&self, chat_id: &str) -> Result<bool, LeadscoutError> {
        let chat_id = chat_id.trim().trim_start_matches('@');
        queries::chat_sources::remove(self.database()?, chat_id).await
    }

    pub async fn touch_scan(
        &self,
        chat_id: &str,
        chat_name: &str,
        chat_type: &str,
    ) -> Result<(), LeadscoutError> {
        queries::chat_sources::touch_scan(
            self.database()?,
            chat_id,
            chat_name,
            chat_type,
            self.clock.now(),
        )
        .await
    }

    // --- Review queue ---

    pub async fn add_pending_response(
        &self,
        lead_id: i64,
        text: &str,
    ) -> Result<i64, LeadscoutError> {
        queries::responses::add(self.database()?, lead_id, text, self.clock.now()).await
    }

    pub async fn pending_responses(&self) -> Result<Vec<PendingResponse>, LeadscoutError> {
        queries::responses::list_pending(self.database()?).await
    }

    pub async fn update_response_status(
        &self,
        id: i64,
        status: ResponseStatus,
        edited_text: Option<&str>,
    ) -> Result<bool, LeadscoutError> {
        queries::responses::update_status(
            self.database()?,
            id,
            status,
            edited_text,
            self.clock.now(),
        )
        .await
    }

    // --- Settings ---

    pub async fn get_setting(&self, key: &str) -> Result<Option<SettingValue>, LeadscoutError> {
        queries::settings::get(self.database()?, key).await
    }

    pub async fn set_setting(&self, key: &str, value: &SettingValue) -> Result<(), LeadscoutError> {
        queries::settings::set(self.database()?, key, value, self.clock.now()).await
    }

    pub async fn settings(&self) -> Result<Vec<(String, SettingValue)>, LeadscoutError> {
        queries::settings::all(self.database()?).await
    }
}

#[async_trait]
impl PluginAdapter for LeadStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadscoutError> {
        self.database()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadscoutError> {
        if self.db.get().is_some() {
            self.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for LeadStore {
    async fn initialize(&self) -> Result<(), LeadscoutError> {
        let db = Database::open(&self.config.database_path).await?;
        self.install(db)?;
        debug!(path = %self.config.database_path, "lead store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadscoutError> {
        self.database()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use leadscout_core::QualityTier;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Clock that can be moved by tests.
    struct StepClock(Mutex<DateTime<Utc>>);

    impl StepClock {
        fn at(ts: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(ts)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }

        fn local_now(&self) -> chrono::NaiveDateTime {
            self.now().naive_utc()
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn new_lead(source: &str, score: i32, reasons: &[&str]) -> NewLead {
        NewLead {
            chat_source: source.into(),
            chat_title: None,
            sender_id: Some(7),
            sender_name: "@ivan".into(),
            message_text: format!("ищу видеопродюсера ({score})"),
            message_id: Some(100),
            quality_score: score,
            quality_reasons: reasons.iter().map(|r| r.to_string()).collect(),
        }
    }

    async fn store_at(ts: DateTime<Utc>) -> (LeadStore, Arc<StepClock>) {
        let clock = StepClock::at(ts);
        let store = LeadStore::in_memory(clock.clone()).await.unwrap();
        (store, clock)
    }

    #[tokio::test]
    async fn store_reports_adapter_identity() {
        let (store, _) = store_at(noon()).await;
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Storage);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn uninitialized_store_fails_closed() {
        let store = LeadStore::new(
            StorageConfig {
                database_path: "unused.sqlite".into(),
            },
            StepClock::at(noon()),
        );
        assert!(store.health_check().await.is_err());
        assert!(store.count_leads().await.is_err());
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn initialize_opens_file_and_rejects_second_call() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leads.sqlite");
        let store = LeadStore::new(
            StorageConfig {
                database_path: path.to_string_lossy().into_owned(),
            },
            StepClock::at(noon()),
        );
        store.initialize().await.unwrap();
        assert!(path.exists());
        assert!(store.initialize().await.is_err());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn created_lead_round_trips_with_reason_order() {
        let (store, _) = store_at(noon()).await;
        let reasons = ["⚡ Нужно быстро", "💰 Упоминает бюджет", "⚡ Нужно быстро"];
        let id = store.create_lead(new_lead("videomakers", 5, &reasons)).await.unwrap();
        assert!(id > 0);

        let recent = store.recent_leads(10, 24).await.unwrap();
        assert_eq!(recent.len(), 1);
        let lead = &recent[0];
        assert_eq!(lead.id, id);
        assert_eq!(lead.quality_reasons, reasons);
        assert_eq!(lead.quality_label, QualityTier::Hot);
        assert_eq!(lead.chat_title, "videomakers");
        assert!(!lead.responded);
        assert!(!lead.forwarded);
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_recent_is_newest_first() {
        let (store, clock) = store_at(noon()).await;
        let first = store.create_lead(new_lead("a", 0, &[])).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = store.create_lead(new_lead("b", 0, &[])).await.unwrap();
        assert!(second > first);

        let recent = store.recent_leads(10, 24).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|l| l.id).collect();
        assert_eq!(ids, [second, first]);
        assert_eq!(store.recent_leads(1, 24).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recent_leads_respects_lookback() {
        let (store, clock) = store_at(noon()).await;
        store.create_lead(new_lead("old", 0, &[])).await.unwrap();
        clock.advance(Duration::hours(30));
        store.create_lead(new_lead("fresh", 0, &[])).await.unwrap();

        let recent = store.recent_leads(10, 24).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].chat_source, "fresh");
    }

    #[tokio::test]
    async fn daily_buckets_sum_to_total() {
        let (store, _) = store_at(noon()).await;
        for score in [7, 5, 3, 2, 1, 0, -1, -7] {
            store.create_lead(new_lead("chat", score, &[])).await.unwrap();
        }
        let day = queries::stats::daily_stat(store.database().unwrap(), noon().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(day.total_leads, 8);
        assert_eq!(day.hot_leads, 2);
        assert_eq!(day.good_leads, 2);
        assert_eq!(day.normal_leads, 2);
        assert_eq!(day.low_quality_leads, 2);
        assert_eq!(
            day.total_leads,
            day.hot_leads + day.good_leads + day.normal_leads + day.low_quality_leads
        );
    }

    #[tokio::test]
    async fn chat_source_counts_every_lead() {
        let (store, _) = store_at(noon()).await;
        for _ in 0..3 {
            store.create_lead(new_lead("busy", 1, &[])).await.unwrap();
        }
        store.create_lead(new_lead("quiet", 1, &[])).await.unwrap();

        let sources = store.chat_sources().await.unwrap();
        assert_eq!(sources[0].chat_id, "busy");
        assert_eq!(sources[0].leads_count, 3);
        assert!(sources[0].last_lead_time.is_some());
        assert_eq!(sources[1].leads_count, 1);
    }

    #[tokio::test]
    async fn responses_sent_equals_ai_plus_manual() {
        let (store, _) = store_at(noon()).await;
        let a = store.create_lead(new_lead("c", 5, &[])).await.unwrap();
        let b = store.create_lead(new_lead("c", 2, &[])).await.unwrap();
        let c = store.create_lead(new_lead("c", 0, &[])).await.unwrap();

        assert!(store.mark_responded(a, "Привет!", ResponseType::Ai).await.unwrap());
        assert!(store.mark_responded(b, "Здравствуйте", ResponseType::Manual).await.unwrap());
        assert!(store.mark_responded(c, "Правка", ResponseType::Edited).await.unwrap());
        // A second reply to the same lead updates the text but not the counters.
        assert!(store.mark_responded(a, "Ещё раз", ResponseType::Ai).await.unwrap());
        assert!(!store.mark_responded(9999, "nobody", ResponseType::Ai).await.unwrap());

        let day = queries::stats::daily_stat(store.database().unwrap(), noon().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(day.responses_sent, 3);
        assert_eq!(day.ai_responses, 1);
        assert_eq!(day.manual_responses, 2);
        assert_eq!(day.responses_sent, day.ai_responses + day.manual_responses);

        let lead = store.get_lead(a).await.unwrap().unwrap();
        assert!(lead.responded);
        assert_eq!(lead.response_text.as_deref(), Some("Ещё раз"));
        assert_eq!(lead.response_type, Some(ResponseType::Ai));
    }

    #[tokio::test]
    async fn stats_report_rounded_response_rate() {
        let (store, _) = store_at(noon()).await;
        let ids = [
            store.create_lead(new_lead("s", 6, &[])).await.unwrap(),
            store.create_lead(new_lead("s", 3, &[])).await.unwrap(),
            store.create_lead(new_lead("s", -2, &[])).await.unwrap(),
        ];
        store.mark_responded(ids[0], "ok", ResponseType::Ai).await.unwrap();

        let stats = store.stats_since(1).await.unwrap();
        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.hot_leads, 1);
        assert_eq!(stats.good_leads, 1);
        assert_eq!(stats.low_quality_leads, 1);
        assert_eq!(stats.responded, 1);
        assert_eq!(stats.response_rate, 33.3);

        let (empty, _) = store_at(noon()).await;
        assert_eq!(empty.stats_since(1).await.unwrap().response_rate, 0.0);
    }

    #[tokio::test]
    async fn mark_forwarded_stamps_lead() {
        let (store, _) = store_at(noon()).await;
        let id = store.create_lead(new_lead("f", 1, &[])).await.unwrap();
        assert!(store.mark_forwarded(id).await.unwrap());
        assert!(!store.mark_forwarded(id + 100).await.unwrap());
        let lead = store.get_lead(id).await.unwrap().unwrap();
        assert!(lead.forwarded);
        assert!(lead.forwarded_at.is_some());
    }

    #[tokio::test]
    async fn analytics_covers_requested_days() {
        let (store, clock) = store_at(noon()).await;
        let first = store.create_lead(new_lead("x", 5, &[])).await.unwrap();
        store.mark_responded(first, "r", ResponseType::Ai).await.unwrap();
        clock.advance(Duration::days(1));
        store.create_lead(new_lead("x", 0, &[])).await.unwrap();
        store.create_lead(new_lead("x", 0, &[])).await.unwrap();

        let analytics = store.analytics(7).await.unwrap();
        assert_eq!(analytics.daily_data.len(), 2);
        assert!(analytics.daily_data[0].date < analytics.daily_data[1].date);
        assert_eq!(analytics.response_efficiency.total_responses, 1);
        assert_eq!(analytics.response_efficiency.ai_responses, 1);
        assert_eq!(analytics.response_efficiency.not_responded, 2);

        let today_only = store.analytics(0).await.unwrap();
        assert_eq!(today_only.daily_data.len(), 1);
    }

    #[tokio::test]
    async fn explicit_chat_sources_are_idempotent() {
        let (store, _) = store_at(noon()).await;
        assert!(store.add_chat_source("@films", Some("Films"), None).await.unwrap());
        assert!(!store.add_chat_source("films", None, None).await.unwrap());
        assert!(!store.add_chat_source("  ", None, None).await.unwrap());
        store.touch_scan("films", "Films", "supergroup").await.unwrap();

        let sources = store.chat_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].chat_name.as_deref(), Some("Films"));
        assert!(sources[0].last_scan_time.is_some());

        assert!(store.remove_chat_source("@films").await.unwrap());
        assert!(!store.remove_chat_source("films").await.unwrap());
    }

    #[tokio::test]
    async fn review_queue_transitions() {
        let (store, clock) = store_at(noon()).await;
        let lead = store.create_lead(new_lead("q", 5, &[])).await.unwrap();
        let first = store.add_pending_response(lead, "Черновик 1").await.unwrap();
        clock.advance(Duration::seconds(5));
        let second = store.add_pending_response(lead, "Черновик 2").await.unwrap();

        let pending = store.pending_responses().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, second);
        assert_eq!(pending[0].quality_label, QualityTier::Hot);
        assert_eq!(pending[0].chat_source, "q");

        assert!(
            store
                .update_response_status(first, ResponseStatus::Pending, Some("Исправлено"))
                .await
                .unwrap()
        );
        assert!(
            store
                .update_response_status(second, ResponseStatus::Rejected, None)
                .await
                .unwrap()
        );
        assert!(!store.update_response_status(999, ResponseStatus::Approved, None).await.unwrap());

        let pending = store.pending_responses().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].edited_response.as_deref(), Some("Исправлено"));
    }

    #[tokio::test]
    async fn settings_read_back_typed() {
        let (store, _) = store_at(noon()).await;
        assert!(store.get_setting("max_replies_per_day").await.unwrap().is_none());
        store
            .set_setting("max_replies_per_day", &SettingValue::Int(30))
            .await
            .unwrap();
        store
            .set_setting("enable_auto_reply", &SettingValue::Bool(true))
            .await
            .unwrap();
        store
            .set_setting("max_replies_per_day", &SettingValue::Int(12))
            .await
            .unwrap();

        assert_eq!(
            store.get_setting("max_replies_per_day").await.unwrap(),
            Some(SettingValue::Int(12))
        );
        let all = store.settings().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "enable_auto_reply");
    }
}
