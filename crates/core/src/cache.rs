// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Expiring key/value cache.
//!
//! Entries carry an absolute expiry instant. Expired entries are evicted
//! lazily when read; [`CacheManager::clear_expired`] sweeps them in bulk.

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::Result;
use crate::store::LocalStore;

/// Default lifetime of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime used for subject, lesson and quiz reads.
pub const CONTENT_TTL: Duration = Duration::from_secs(30 * 60);

/// A stored cache row.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub data: Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

pub fn subject_key(subject_id: i64) -> String {
    format!("subject-{subject_id}")
}

pub fn lessons_key(subject_id: i64) -> String {
    format!("lessons-subject-{subject_id}")
}

pub fn lesson_key(lesson_id: i64) -> String {
    format!("lesson-{lesson_id}")
}

pub fn quiz_key(quiz_id: i64) -> String {
    format!("quiz-{quiz_id}")
}

/// Compute `now + ttl`, saturating at the latest representable instant.
fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Read-through cache over the local store.
#[derive(Clone)]
pub struct CacheManager {
    store: LocalStore,
    default_ttl: Duration,
}

impl CacheManager {
    pub fn new(store: LocalStore) -> Self {
        CacheManager {
            store,
            default_ttl: DEFAULT_TTL,
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store `value` under `key` for `ttl` (or the default TTL).
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let expires_at = expiry(Utc::now(), ttl.unwrap_or(self.default_ttl));
        self.set_until(key, value, expires_at).await
    }

    /// Store `value` under `key` until `expires_at`.
    pub async fn set_until<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let data = serde_json::to_value(value)?;
        self.store
            .with(|db| db.cache_put(key, &data, expires_at))
            .await
    }

    /// Fetch a live entry. Expired or undecodable rows are deleted and
    /// reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let now = Utc::now();
        self.store
            .with(|db| {
                let Some(entry) = db.cache_get(key)? else {
                    return Ok(None);
                };
                if entry.is_expired(now) {
                    tracing::debug!(key, "cache entry expired");
                    db.cache_delete(key)?;
                    return Ok(None);
                }
                match serde_json::from_value(entry.data) {
                    Ok(value) => Ok(Some(value)),
                    Err(e) => {
                        tracing::warn!(key, error = %e, "evicting undecodable cache entry");
                        db.cache_delete(key)?;
                        Ok(None)
                    }
                }
            })
            .await
    }

    /// Delete one entry. Returns true if it existed.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        self.store.with(|db| db.cache_delete(key)).await
    }

    pub async fn clear(&self) -> Result<usize> {
        self.store.with(|db| db.cache_clear()).await
    }

    /// Delete every expired entry. Returns how many were removed.
    pub async fn clear_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let removed = self.store.with(|db| db.cache_delete_expired(now)).await?;
        if removed > 0 {
            tracing::debug!(removed, "swept expired cache entries");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
