// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: drains the sync queue to the remote API.
//!
//! A drain takes a snapshot of the queue and delivers each item in order.
//! Delivered items are removed; failed items have their retry count bumped
//! until they exceed the retry limit, at which point they are dropped.
//! Only one drain runs at a time; triggers that arrive mid-drain are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use lm_core::{NewSyncItem, ProgressUpdate, QuizSubmission, SyncKind, SyncQueue, SyncQueueItem};

use super::connectivity::ConnectivityMonitor;
use super::remote::{RemoteApi, RemoteError};

/// Default time between periodic drains.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Default retry limit; an item that fails with this many retries is dropped.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Time between periodic drains.
    pub interval: Duration,
    /// Failures tolerated before an item is dropped.
    pub max_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval: DEFAULT_SYNC_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote rejected a call.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The local store failed.
    #[error("store error: {0}")]
    Store(#[from] lm_core::Error),

    /// A queued item could not be interpreted.
    #[error("invalid queued item: {0}")]
    InvalidItem(lm_core::Error),

    /// The item's type has no delivery sequence.
    #[error("unknown sync type '{0}'")]
    UnknownKind(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Phase of the engine as seen by status subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Syncing,
    Error,
}

/// Status published to subscribers during a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Percentage of the current snapshot processed.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl SyncStatus {
    fn idle() -> Self {
        SyncStatus {
            state: SyncState::Idle,
            progress: 100,
            current: None,
            total: None,
        }
    }

    fn started() -> Self {
        SyncStatus {
            state: SyncState::Syncing,
            progress: 0,
            current: None,
            total: None,
        }
    }

    fn item(current: usize, total: usize) -> Self {
        let progress = (current * 100 + total / 2) / total.max(1);
        SyncStatus {
            state: SyncState::Syncing,
            progress: progress.min(100) as u8,
            current: Some(current),
            total: Some(total),
        }
    }

    fn error() -> Self {
        SyncStatus {
            state: SyncState::Error,
            progress: 0,
            current: None,
            total: None,
        }
    }
}

/// Outcome of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// False when the drain was skipped or aborted by a store failure.
    pub success: bool,
    /// Items delivered and removed.
    pub synced: usize,
    /// Items dropped after exhausting their retries.
    pub failed: usize,
    /// Items in the queue after the drain.
    pub pending: usize,
}

impl SyncReport {
    /// Report for a drain that did not run.
    pub fn skipped() -> Self {
        SyncReport::default()
    }
}

/// Queue depth and whether a drain is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub syncing: bool,
}

/// Marks a drain as in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Delivers queued mutations to the remote API.
pub struct SyncEngine<R: RemoteApi> {
    queue: SyncQueue,
    remote: Arc<R>,
    connectivity: ConnectivityMonitor,
    config: SyncConfig,
    syncing: AtomicBool,
    status_tx: broadcast::Sender<SyncStatus>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<R: RemoteApi + 'static> SyncEngine<R> {
    pub fn new(
        queue: SyncQueue,
        remote: Arc<R>,
        connectivity: ConnectivityMonitor,
        config: SyncConfig,
    ) -> Self {
        let (status_tx, _) = broadcast::channel(64);
        SyncEngine {
            queue,
            remote,
            connectivity,
            config,
            syncing: AtomicBool::new(false),
            status_tx,
            worker: Mutex::new(None),
        }
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Receive status updates for every subsequent drain.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> SyncResult<QueueStatus> {
        Ok(QueueStatus {
            pending: self.queue.count().await?,
            syncing: self.is_syncing(),
        })
    }

    pub async fn clear_queue(&self) -> SyncResult<usize> {
        Ok(self.queue.clear().await?)
    }

    /// Queue a mutation and, when online and idle, start a drain in the
    /// background. Returns the new item's id.
    pub async fn enqueue(self: &Arc<Self>, item: NewSyncItem) -> SyncResult<i64> {
        let id = self.queue.add(item).await?;
        if self.connectivity.is_online() && !self.is_syncing() {
            self.trigger();
        }
        Ok(id)
    }

    /// Start a drain on its own task. The drain runs to completion even if
    /// the caller goes away.
    pub fn trigger(self: &Arc<Self>) -> JoinHandle<SyncReport> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.sync().await })
    }

    /// Run one drain over the current queue.
    ///
    /// Skipped drains (offline, or another drain running) and drains aborted
    /// by a store failure report `success = false` with zero counts.
    pub async fn sync(&self) -> SyncReport {
        if !self.connectivity.is_online() {
            tracing::debug!("offline, skipping sync");
            return SyncReport::skipped();
        }
        let Some(_in_flight) = InFlight::acquire(&self.syncing) else {
            tracing::debug!("sync already in progress");
            return SyncReport::skipped();
        };

        self.publish(SyncStatus::started());
        match self.drain().await {
            Ok(report) => {
                self.publish(SyncStatus::idle());
                if report.synced > 0 || report.failed > 0 {
                    tracing::info!(
                        synced = report.synced,
                        failed = report.failed,
                        pending = report.pending,
                        "sync finished"
                    );
                }
                report
            }
            Err(e) => {
                tracing::error!(error = %e, "sync aborted");
                self.publish(SyncStatus::error());
                SyncReport::skipped()
            }
        }
    }

    async fn drain(&self) -> SyncResult<SyncReport> {
        let items = self.queue.get_all().await?;
        let total = items.len();
        if total == 0 {
            return Ok(SyncReport {
                success: true,
                ..SyncReport::default()
            });
        }

        let mut synced = 0;
        let mut failed = 0;
        for (index, item) in items.iter().enumerate() {
            self.publish(SyncStatus::item(index + 1, total));

            match self.deliver(item).await {
                Ok(()) => {
                    self.queue.remove(item.id).await?;
                    synced += 1;
                    tracing::debug!(id = item.id, kind = %item.kind, "delivered");
                }
                Err(e) if item.retries >= self.config.max_retries => {
                    self.queue.remove(item.id).await?;
                    failed += 1;
                    tracing::error!(
                        id = item.id,
                        kind = %item.kind,
                        endpoint = %item.endpoint,
                        retries = item.retries,
                        error = %e,
                        "dropping mutation after exhausting retries"
                    );
                }
                Err(e) => {
                    self.queue.increment_retry(item.id).await?;
                    tracing::warn!(
                        id = item.id,
                        kind = %item.kind,
                        retries = item.retries + 1,
                        error = %e,
                        "delivery failed, will retry"
                    );
                }
            }
        }

        let pending = self.queue.count().await?;
        Ok(SyncReport {
            success: true,
            synced,
            failed,
            pending,
        })
    }

    /// Issue the remote calls for one queued item.
    async fn deliver(&self, item: &SyncQueueItem) -> SyncResult<()> {
        match &item.kind {
            SyncKind::QuizSubmit => {
                let quiz_id = item.target_id().map_err(SyncError::InvalidItem)?;
                let submission: QuizSubmission =
                    item.decode_payload().map_err(SyncError::InvalidItem)?;
                let attempt_id = self.remote.start_quiz_attempt(quiz_id).await?;
                self.remote
                    .submit_quiz(quiz_id, attempt_id, submission.answers)
                    .await?;
            }
            SyncKind::LessonProgress => {
                let lesson_id = item.target_id().map_err(SyncError::InvalidItem)?;
                let update: ProgressUpdate =
                    item.decode_payload().map_err(SyncError::InvalidItem)?;
                self.remote.update_lesson_progress(lesson_id, update).await?;
            }
            SyncKind::Enroll => {
                let subject_id = item.target_id().map_err(SyncError::InvalidItem)?;
                self.remote.enroll_in_subject(subject_id).await?;
            }
            SyncKind::Other(kind) => return Err(SyncError::UnknownKind(kind.clone())),
        }
        Ok(())
    }

    fn publish(&self, status: SyncStatus) {
        // No subscribers is fine
        let _ = self.status_tx.send(status);
    }

    /// Start background syncing: drain now, then on every interval tick
    /// while online and on every offline to online transition.
    ///
    /// Calling `start` while already running does nothing.
    pub fn start(self: &Arc<Self>) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let engine = Arc::clone(self);
        *worker = Some(tokio::spawn(async move { engine.run().await }));
        tracing::debug!(interval = ?self.config.interval, "sync engine started");
    }

    /// Stop background syncing. A drain already in progress still runs to
    /// completion.
    pub fn stop(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("sync engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn run(self: Arc<Self>) {
        let mut online_rx = self.connectivity.subscribe();
        let period = self.config.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.trigger();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.connectivity.is_online() {
                        self.trigger();
                    }
                }
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *online_rx.borrow_and_update();
                    if online {
                        tracing::info!("back online, syncing");
                        self.trigger();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
