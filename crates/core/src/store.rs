// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared async handle to the local store.
//!
//! Every component (cache, queue, sync engine, bundle manager) holds a clone
//! of the same [`LocalStore`]. Access goes through [`LocalStore::with`], which
//! holds the lock for the whole closure, so a read-modify-write sequence is
//! never interleaved with other tasks.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::bundle::StorageInfo;
use crate::cache::CacheManager;
use crate::db::Database;
use crate::error::Result;
use crate::queue::SyncQueue;

/// Cloneable handle to the client's SQLite database.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
}

impl LocalStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_database(Database::open(path)?))
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    pub fn from_database(db: Database) -> Self {
        LocalStore {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run `f` with exclusive access to the database.
    pub async fn with<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T>,
    {
        let mut db = self.db.lock().await;
        f(&mut *db)
    }

    /// Expiring cache backed by this store.
    pub fn cache(&self) -> CacheManager {
        CacheManager::new(self.clone())
    }

    /// Sync queue backed by this store.
    pub fn queue(&self) -> SyncQueue {
        SyncQueue::new(self.clone())
    }

    pub async fn storage_usage(&self) -> Result<StorageInfo> {
        self.with(|db| db.storage_usage()).await
    }

    /// Empty every table. Used on logout.
    pub async fn clear_all(&self) -> Result<()> {
        tracing::debug!("clearing local store");
        self.with(|db| db.clear_all()).await
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
