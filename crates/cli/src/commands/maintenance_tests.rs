// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::content::download_impl;
use crate::commands::testing::TestContext;
use crate::sync::test_helpers::{lesson, FakeRemote};
use lm_core::NewSyncItem;
use std::time::Duration;

#[tokio::test]
async fn test_logout_clears_everything() {
    let ctx = TestContext::online(FakeRemote::new().with_subject(3, vec![lesson(30, 3)]));
    download_impl(&ctx.app, 3, |_| {}).await.unwrap();
    ctx.app.connectivity.set_online(false);
    ctx.app
        .engine
        .queue()
        .add(NewSyncItem::enroll(3))
        .await
        .unwrap();
    ctx.app
        .store
        .cache()
        .set("subject-3", &"cached", None)
        .await
        .unwrap();

    let discarded = logout_impl(&ctx.app).await.unwrap();

    assert_eq!(discarded, 1);
    let info = ctx.app.bundles.storage_info().await.unwrap();
    assert_eq!(info.offline_subjects, 0);
    assert_eq!(info.pending_mutations, 0);
    assert_eq!(info.cache_entries, 0);
}

#[tokio::test]
async fn test_logout_forgets_token() {
    let ctx = TestContext::offline(FakeRemote::new());
    let config = Config {
        token: Some("secret".to_string()),
        ..Config::default()
    };
    config.save(&ctx.app.data_dir).unwrap();

    logout_impl(&ctx.app).await.unwrap();

    let saved = Config::load(&ctx.app.data_dir).unwrap();
    assert_eq!(saved.token, None);
    assert_eq!(saved.api_url, config.api_url);
}

#[tokio::test]
async fn test_logout_without_config_file_writes_nothing() {
    let ctx = TestContext::offline(FakeRemote::new());

    logout_impl(&ctx.app).await.unwrap();

    assert!(!crate::config::config_path(&ctx.app.data_dir).exists());
}

#[tokio::test]
async fn test_cache_prune_keeps_live_entries() {
    let ctx = TestContext::offline(FakeRemote::new());
    let cache = ctx.app.store.cache();
    cache
        .set("live", &1, Some(Duration::from_secs(3600)))
        .await
        .unwrap();
    cache
        .set_until("stale", &2, chrono::Utc::now() - chrono::Duration::minutes(1))
        .await
        .unwrap();

    cache_prune(&ctx.app).await.unwrap();

    assert_eq!(cache.get::<i32>("live").await.unwrap(), Some(1));
    assert_eq!(ctx.app.store.storage_usage().await.unwrap().cache_entries, 1);
}
