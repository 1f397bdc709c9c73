// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::commands::testing::TestContext;
use crate::sync::test_helpers::{Call, FakeRemote};
use lm_core::NewSyncItem;

#[tokio::test]
async fn test_sync_offline_returns_none() {
    let ctx = TestContext::offline(FakeRemote::new());
    ctx.app
        .engine
        .queue()
        .add(NewSyncItem::enroll(1))
        .await
        .unwrap();

    assert_eq!(sync_impl(&ctx.app).await.unwrap(), None);
    assert_eq!(ctx.pending().await, 1);
}

#[tokio::test]
async fn test_sync_online_drains() {
    let ctx = TestContext::online(FakeRemote::new());
    let queue = ctx.app.engine.queue();
    queue.add(NewSyncItem::enroll(1)).await.unwrap();
    queue.add(NewSyncItem::enroll(2)).await.unwrap();

    let report = sync_impl(&ctx.app).await.unwrap().unwrap();

    assert_eq!(report.synced, 2);
    assert_eq!(report.pending, 0);
    assert_eq!(ctx.remote.calls(), vec![Call::Enroll(1), Call::Enroll(2)]);
}

#[tokio::test]
async fn test_clear_discards_pending() {
    let ctx = TestContext::offline(FakeRemote::new());
    ctx.app
        .engine
        .queue()
        .add(NewSyncItem::enroll(1))
        .await
        .unwrap();

    clear(&ctx.app).await.unwrap();

    assert_eq!(ctx.pending().await, 0);
}
