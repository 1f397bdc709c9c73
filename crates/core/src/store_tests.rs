// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::mutation::NewSyncItem;
use serde_json::json;

#[tokio::test]
async fn clones_share_one_database() {
    let store = LocalStore::open_in_memory().unwrap();
    let other = store.clone();

    store.queue().add(NewSyncItem::enroll(1)).await.unwrap();
    assert_eq!(other.queue().count().await.unwrap(), 1);
}

#[tokio::test]
async fn with_returns_closure_result() {
    let store = LocalStore::open_in_memory().unwrap();
    let count = store.with(|db| db.queue_count()).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn clear_all_resets_usage() {
    let store = LocalStore::open_in_memory().unwrap();
    store.queue().add(NewSyncItem::enroll(1)).await.unwrap();
    store.cache().set("k", &json!(1), None).await.unwrap();

    store.clear_all().await.unwrap();
    assert_eq!(store.storage_usage().await.unwrap(), StorageInfo::default());
}

#[tokio::test]
async fn open_on_disk_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learnmate.db");
    {
        let store = LocalStore::open(&path).unwrap();
        store.queue().add(NewSyncItem::enroll(4)).await.unwrap();
    }

    let store = LocalStore::open(&path).unwrap();
    let items = store.queue().get_all().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].endpoint, "/students/enroll/4");
}
