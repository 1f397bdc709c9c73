// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of offline mutations to the LearnMate server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  SyncEngine │────►│  RemoteApi  │────►│   Server    │
//! │             │     │   (trait)   │     │   (HTTP)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   ▲
//!        ▼                   │
//! ┌─────────────┐     ┌─────────────┐
//! │  SyncQueue  │     │ Connectivity│
//! │  (SQLite)   │     │   Monitor   │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - FIFO delivery with bounded retries
//! - Periodic drains and drains on reconnect
//! - Read-through caching of content reads
//! - Injectable remote trait for testing

mod cached;
mod connectivity;
mod engine;
mod http;
mod remote;

pub use cached::CachedRemote;
pub use connectivity::{check_health, spawn_health_check, ConnectivityMonitor, StatusSubscription};
pub use engine::{
    QueueStatus, SyncConfig, SyncEngine, SyncError, SyncReport, SyncResult, SyncState,
    SyncStatus, DEFAULT_MAX_RETRIES, DEFAULT_SYNC_INTERVAL,
};
pub use http::{HttpRemote, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT};
pub use remote::{RemoteApi, RemoteError, RemoteFuture, RemoteResult};

#[cfg(test)]
pub(crate) mod test_helpers;
