// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable FIFO of mutations awaiting delivery.

use chrono::Utc;

use crate::error::Result;
use crate::mutation::{NewSyncItem, SyncQueueItem};
use crate::store::LocalStore;

/// Sync queue over the local store.
///
/// Items are never deduplicated: two identical mutations are both delivered.
#[derive(Clone)]
pub struct SyncQueue {
    store: LocalStore,
}

impl SyncQueue {
    pub fn new(store: LocalStore) -> Self {
        SyncQueue { store }
    }

    /// Append a mutation stamped with the current time. Returns its id.
    pub async fn add(&self, item: NewSyncItem) -> Result<i64> {
        let now = Utc::now();
        let id = self.store.with(|db| db.queue_insert(&item, now)).await?;
        tracing::debug!(id, kind = %item.kind, endpoint = %item.endpoint, "queued mutation");
        Ok(id)
    }

    /// Snapshot of every pending item, oldest first.
    pub async fn get_all(&self) -> Result<Vec<SyncQueueItem>> {
        self.store.with(|db| db.queue_all()).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<SyncQueueItem>> {
        self.store.with(|db| db.queue_get(id)).await
    }

    /// Delete an item. Removing an absent id is not an error.
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.store.with(|db| db.queue_delete(id)).await?;
        Ok(())
    }

    /// Record a failed delivery. No-op if the item was already removed.
    pub async fn increment_retry(&self, id: i64) -> Result<()> {
        let found = self.store.with(|db| db.queue_bump_retries(id)).await?;
        if !found {
            tracing::debug!(id, "retry bump skipped, item already removed");
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.with(|db| db.queue_count()).await
    }

    pub async fn clear(&self) -> Result<usize> {
        self.store.with(|db| db.queue_clear()).await
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
