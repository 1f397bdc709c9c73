// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline bundle manager.
//!
//! Downloads a subject's full content graph (subject, lessons, quizzes and
//! attachments) and commits it to the local store in one transaction. A
//! subject is available offline exactly when a committed bundle exists.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;

use lm_core::{Attachment, Lesson, LocalStore, OfflineSubject, Quiz, StorageInfo};

use crate::sync::{ConnectivityMonitor, RemoteApi, RemoteError};

/// Percent reported once the lesson list is known.
const LESSONS_LISTED: u8 = 20;
/// Percent at which per-lesson fetching starts.
const LESSONS_START: usize = 30;
/// Share of the progress bar spread across lessons.
const LESSONS_SPAN: usize = 50;
/// Percent reported before the commit.
const SAVING: u8 = 80;

/// Error type for bundle downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("subject {0} is already downloading")]
    AlreadyDownloading(i64),

    #[error("cannot download subject {0} while offline\n  hint: reconnect and try again")]
    Offline(i64),

    #[error("download failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("failed to save offline bundle: {0}")]
    Store(#[from] lm_core::Error),
}

/// Phase of a download as seen by progress subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Idle,
    Downloading,
    Completed,
    Error,
}

/// Progress event for one subject's download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadProgress {
    pub status: DownloadStatus,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadProgress {
    fn downloading(progress: u8, step: impl Into<String>) -> Self {
        DownloadProgress {
            status: DownloadStatus::Downloading,
            progress,
            current_step: Some(step.into()),
            error: None,
        }
    }

    fn completed() -> Self {
        DownloadProgress {
            status: DownloadStatus::Completed,
            progress: 100,
            current_step: Some("Download complete".to_string()),
            error: None,
        }
    }

    fn failed(error: &DownloadError) -> Self {
        DownloadProgress {
            status: DownloadStatus::Error,
            progress: 0,
            current_step: None,
            error: Some(error.to_string()),
        }
    }
}

/// Progress percent before fetching lesson `index` of `total`.
fn lesson_progress(index: usize, total: usize) -> u8 {
    let percent = LESSONS_START + index * LESSONS_SPAN / total.max(1);
    percent.min(SAVING as usize) as u8
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Membership in the in-flight set, released on drop.
struct Downloading<'a> {
    set: &'a Mutex<HashSet<i64>>,
    subject_id: i64,
}

impl<'a> Downloading<'a> {
    fn acquire(set: &'a Mutex<HashSet<i64>>, subject_id: i64) -> Option<Self> {
        lock(set)
            .insert(subject_id)
            .then_some(Downloading { set, subject_id })
    }
}

impl Drop for Downloading<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.subject_id);
    }
}

/// Downloads and serves offline subject bundles.
pub struct OfflineBundleManager<R: RemoteApi> {
    store: LocalStore,
    remote: Arc<R>,
    connectivity: ConnectivityMonitor,
    downloading: Mutex<HashSet<i64>>,
    listeners: Mutex<HashMap<i64, broadcast::Sender<DownloadProgress>>>,
}

impl<R: RemoteApi> OfflineBundleManager<R> {
    pub fn new(store: LocalStore, remote: Arc<R>, connectivity: ConnectivityMonitor) -> Self {
        OfflineBundleManager {
            store,
            remote,
            connectivity,
            downloading: Mutex::new(HashSet::new()),
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Receive progress events for downloads of `subject_id`.
    pub fn subscribe(&self, subject_id: i64) -> broadcast::Receiver<DownloadProgress> {
        lock(&self.listeners)
            .entry(subject_id)
            .or_insert_with(|| broadcast::channel(64).0)
            .subscribe()
    }

    fn notify(&self, subject_id: i64, progress: DownloadProgress) {
        let mut listeners = lock(&self.listeners);
        if let Some(tx) = listeners.get(&subject_id) {
            if tx.send(progress).is_err() {
                listeners.remove(&subject_id);
            }
        }
    }

    pub fn is_downloading(&self, subject_id: i64) -> bool {
        lock(&self.downloading).contains(&subject_id)
    }

    pub async fn is_available_offline(&self, subject_id: i64) -> lm_core::Result<bool> {
        self.store.with(|db| db.bundle_exists(subject_id)).await
    }

    /// Download `subject_id` and commit it as an offline bundle.
    ///
    /// Quiz and attachment failures for individual lessons are logged and
    /// skipped; any other failure leaves the store untouched.
    pub async fn download_subject(
        &self,
        subject_id: i64,
    ) -> Result<OfflineSubject, DownloadError> {
        let Some(_in_flight) = Downloading::acquire(&self.downloading, subject_id) else {
            tracing::debug!(subject_id, "download already in progress");
            return Err(DownloadError::AlreadyDownloading(subject_id));
        };

        if !self.connectivity.is_online() {
            let err = DownloadError::Offline(subject_id);
            self.notify(subject_id, DownloadProgress::failed(&err));
            return Err(err);
        }

        match self.fetch_and_commit(subject_id).await {
            Ok(bundle) => {
                tracing::info!(
                    subject_id,
                    lessons = bundle.lessons.len(),
                    quizzes = bundle.quizzes.len(),
                    "subject available offline"
                );
                self.notify(subject_id, DownloadProgress::completed());
                Ok(bundle)
            }
            Err(e) => {
                tracing::error!(subject_id, error = %e, "download failed");
                self.notify(subject_id, DownloadProgress::failed(&e));
                Err(e)
            }
        }
    }

    async fn fetch_and_commit(&self, subject_id: i64) -> Result<OfflineSubject, DownloadError> {
        self.notify(subject_id, DownloadProgress::downloading(0, "Starting download"));

        let subject = self.remote.fetch_subject(subject_id).await?;
        self.notify(
            subject_id,
            DownloadProgress::downloading(10, "Downloaded subject details"),
        );

        let summaries = self.remote.fetch_lessons_by_subject(subject_id).await?;
        let total = summaries.len();
        self.notify(
            subject_id,
            DownloadProgress::downloading(LESSONS_LISTED, format!("Found {total} lessons")),
        );

        let mut lessons = Vec::with_capacity(total);
        let mut quizzes = Vec::new();
        let mut attachments = Vec::new();
        for (index, summary) in summaries.iter().enumerate() {
            self.notify(
                subject_id,
                DownloadProgress::downloading(
                    lesson_progress(index, total),
                    format!("Downloading lesson {} of {total}", index + 1),
                ),
            );

            let mut lesson = self.remote.fetch_lesson(summary.id).await?;
            if let Some(quiz) = self.fetch_quiz(&lesson).await {
                quizzes.push(quiz);
            }
            if let Some(data) = self.fetch_attachment(&lesson).await {
                attachments.push(Attachment {
                    lesson_id: lesson.id,
                    subject_id,
                    data,
                });
                lesson.content_url = Some(lesson.offline_attachment_ref());
            }
            lessons.push(lesson);
        }

        self.notify(
            subject_id,
            DownloadProgress::downloading(SAVING, "Saving for offline use"),
        );
        let bundle = OfflineSubject::new(subject, lessons, quizzes);
        self.store
            .with(|db| db.commit_bundle(&bundle, &attachments))
            .await?;
        Ok(bundle)
    }

    async fn fetch_quiz(&self, lesson: &Lesson) -> Option<Quiz> {
        let quiz_id = lesson.quiz_ref()?;
        match self.remote.fetch_quiz(quiz_id).await {
            Ok(quiz) => Some(quiz),
            Err(e) => {
                tracing::warn!(lesson_id = lesson.id, quiz_id, error = %e, "skipping quiz");
                None
            }
        }
    }

    async fn fetch_attachment(&self, lesson: &Lesson) -> Option<Vec<u8>> {
        if !lesson.has_attachment() {
            return None;
        }
        match self.remote.fetch_attachment(lesson.id).await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(lesson_id = lesson.id, error = %e, "skipping attachment");
                None
            }
        }
    }

    /// Delete a subject's bundle and its attachments. Returns true if it existed.
    pub async fn remove_offline_subject(&self, subject_id: i64) -> lm_core::Result<bool> {
        let removed = self.store.with(|db| db.delete_bundle(subject_id)).await?;
        if removed {
            tracing::info!(subject_id, "removed offline subject");
        }
        Ok(removed)
    }

    pub async fn get_offline_subject(
        &self,
        subject_id: i64,
    ) -> lm_core::Result<Option<OfflineSubject>> {
        self.store.with(|db| db.get_bundle(subject_id)).await
    }

    pub async fn list_offline_subjects(&self) -> lm_core::Result<Vec<OfflineSubject>> {
        self.store.with(|db| db.list_bundles()).await
    }

    /// Lessons of an offline subject, in order. Empty if not downloaded.
    pub async fn offline_lessons(&self, subject_id: i64) -> lm_core::Result<Vec<Lesson>> {
        self.store
            .with(|db| {
                if !db.bundle_exists(subject_id)? {
                    return Ok(Vec::new());
                }
                db.lessons_for_subject(subject_id)
            })
            .await
    }

    /// A lesson whose subject is available offline.
    pub async fn offline_lesson(&self, lesson_id: i64) -> lm_core::Result<Option<Lesson>> {
        self.store
            .with(|db| {
                let Some(lesson) = db.get_lesson(lesson_id)? else {
                    return Ok(None);
                };
                Ok(db.bundle_exists(lesson.subject_id)?.then_some(lesson))
            })
            .await
    }

    /// A quiz whose lesson's subject is available offline.
    pub async fn offline_quiz(&self, quiz_id: i64) -> lm_core::Result<Option<Quiz>> {
        self.store
            .with(|db| {
                let Some(quiz) = db.get_quiz(quiz_id)? else {
                    return Ok(None);
                };
                let Some(lesson) = db.get_lesson(quiz.lesson_id)? else {
                    return Ok(None);
                };
                Ok(db.bundle_exists(lesson.subject_id)?.then_some(quiz))
            })
            .await
    }

    /// Stored attachment bytes for a lesson.
    pub async fn attachment(&self, lesson_id: i64) -> lm_core::Result<Option<Vec<u8>>> {
        self.store.with(|db| db.get_attachment(lesson_id)).await
    }

    pub async fn storage_info(&self) -> lm_core::Result<StorageInfo> {
        self.store.storage_usage().await
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
