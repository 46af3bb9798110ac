// SPDX-FileCopyrightText: 2026 LeadScout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent trigger phrases with an in-memory active snapshot.

use std::path::Path;
use std::sync::{Arc, RwLock};

use leadscout_core::{Clock, LeadscoutError};
use leadscout_scoring::{KeywordSet, normalize_phrase};
use tracing::{debug, info, warn};

use crate::database::Database;
use crate::models::Keyword;
use crate::queries;

/// Trigger phrases stored in SQLite.
///
/// The active set is cached and rebuilt after every mutation, so
/// [`KeywordStore::matching`] never touches the database.
pub struct KeywordStore {
    db: Database,
    clock: Arc<dyn Clock>,
    active: RwLock<Arc<KeywordSet>>,
}

impl KeywordStore {
    /// Opens the store and loads the current active set.
    pub async fn open(db: Database, clock: Arc<dyn Clock>) -> Result<Self, LeadscoutError> {
        let store = Self {
            db,
            clock,
            active: RwLock::new(Arc::new(KeywordSet::default())),
        };
        store.refresh().await?;
        Ok(store)
    }

    async fn refresh(&self) -> Result<(), LeadscoutError> {
        let rows = queries::keywords::list(&self.db, true).await?;
        let set = Arc::new(KeywordSet::new(rows.iter().map(|k| k.phrase.as_str())));
        let mut active = self.active.write().unwrap_or_else(|poisoned| {
            warn!("keyword snapshot lock poisoned, recovering");
            poisoned.into_inner()
        });
        *active = set;
        Ok(())
    }

    /// Current active set, in `hits_count DESC, phrase ASC` order.
    pub fn snapshot(&self) -> Arc<KeywordSet> {
        let active = self.active.read().unwrap_or_else(|poisoned| {
            warn!("keyword snapshot lock poisoned, recovering");
            poisoned.into_inner()
        });
        Arc::clone(&active)
    }

    /// Adds a phrase. Returns `false` for duplicates and blank input.
    pub async fn add(&self, phrase: &str) -> Result<bool, LeadscoutError> {
        let Some(phrase) = normalize_phrase(phrase) else {
            return Ok(false);
        };
        let inserted = queries::keywords::insert(&self.db, &phrase).await?;
        if inserted {
            self.refresh().await?;
            debug!(phrase, "keyword added");
        }
        Ok(inserted)
    }

    pub async fn remove(&self, phrase: &str) -> Result<bool, LeadscoutError> {
        let Some(phrase) = normalize_phrase(phrase) else {
            return Ok(false);
        };
        let removed = queries::keywords::delete(&self.db, &phrase).await?;
        if removed {
            self.refresh().await?;
            debug!(phrase, "keyword removed");
        }
        Ok(removed)
    }

    pub async fn set_active(&self, phrase: &str, active: bool) -> Result<bool, LeadscoutError> {
        let Some(phrase) = normalize_phrase(phrase) else {
            return Ok(false);
        };
        let changed = queries::keywords::set_active(&self.db, &phrase, active).await?;
        if changed {
            self.refresh().await?;
        }
        Ok(changed)
    }

    pub async fn list_active(&self) -> Result<Vec<Keyword>, LeadscoutError> {
        queries::keywords::list(&self.db, true).await
    }

    pub async fn list_all(&self) -> Result<Vec<Keyword>, LeadscoutError> {
        queries::keywords::list(&self.db, false).await
    }

    /// Credits a phrase with one hit.
    ///
    /// The cached order is left as is until the next mutation.
    pub async fn record_hit(&self, phrase: &str) -> Result<bool, LeadscoutError> {
        queries::keywords::record_hit(&self.db, phrase, self.clock.now()).await
    }

    /// Every active phrase contained in the text.
    pub fn matching(&self, text: &str) -> Vec<String> {
        self.snapshot()
            .matching(text)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.snapshot().matches(text)
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Loads a newline-delimited phrase file, skipping blank lines and `#`
    /// comments. Returns how many phrases were new.
    pub async fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<usize, LeadscoutError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LeadscoutError::Config(format!("cannot read keywords file {}: {e}", path.display()))
        })?;

        let mut added = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(phrase) = normalize_phrase(line) {
                if queries::keywords::insert(&self.db, &phrase).await? {
                    added += 1;
                }
            }
        }
        self.refresh().await?;
        info!(path = %path.display(), added, total = self.snapshot().len(), "keywords seeded");
        Ok(added)
    }
}
