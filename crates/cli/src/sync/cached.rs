// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-through cache in front of a [`RemoteApi`].

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use lm_core::cache::{self, CacheManager, CONTENT_TTL};
use lm_core::{Lesson, ProgressUpdate, Quiz, QuizAnswer, QuizOutcome, Subject};

use super::remote::{RemoteApi, RemoteFuture, RemoteResult};

/// Serves content reads from the cache while fresh and stores every
/// successful remote read. Mutations and attachments pass straight through.
pub struct CachedRemote<R> {
    inner: R,
    cache: CacheManager,
    ttl: Duration,
}

impl<R: RemoteApi> CachedRemote<R> {
    pub fn new(inner: R, cache: CacheManager) -> Self {
        CachedRemote {
            inner,
            cache,
            ttl: CONTENT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    async fn read_through<T, F>(&self, key: String, fetch: F) -> RemoteResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = RemoteResult<T>>,
    {
        match self.cache.get::<T>(&key).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, "cache hit");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key = %key, error = %e, "cache read failed"),
        }

        let value = fetch.await?;
        if let Err(e) = self.cache.set(&key, &value, Some(self.ttl)).await {
            tracing::warn!(key = %key, error = %e, "cache write failed");
        }
        Ok(value)
    }
}

impl<R: RemoteApi> RemoteApi for CachedRemote<R> {
    fn fetch_subject(&self, subject_id: i64) -> RemoteFuture<'_, Subject> {
        Box::pin(self.read_through(
            cache::subject_key(subject_id),
            self.inner.fetch_subject(subject_id),
        ))
    }

    fn fetch_lessons_by_subject(&self, subject_id: i64) -> RemoteFuture<'_, Vec<Lesson>> {
        Box::pin(self.read_through(
            cache::lessons_key(subject_id),
            self.inner.fetch_lessons_by_subject(subject_id),
        ))
    }

    fn fetch_lesson(&self, lesson_id: i64) -> RemoteFuture<'_, Lesson> {
        Box::pin(self.read_through(
            cache::lesson_key(lesson_id),
            self.inner.fetch_lesson(lesson_id),
        ))
    }

    fn fetch_quiz(&self, quiz_id: i64) -> RemoteFuture<'_, Quiz> {
        Box::pin(self.read_through(cache::quiz_key(quiz_id), self.inner.fetch_quiz(quiz_id)))
    }

    fn fetch_attachment(&self, lesson_id: i64) -> RemoteFuture<'_, Vec<u8>> {
        self.inner.fetch_attachment(lesson_id)
    }

    fn start_quiz_attempt(&self, quiz_id: i64) -> RemoteFuture<'_, i64> {
        self.inner.start_quiz_attempt(quiz_id)
    }

    fn submit_quiz(
        &self,
        quiz_id: i64,
        attempt_id: i64,
        answers: Vec<QuizAnswer>,
    ) -> RemoteFuture<'_, QuizOutcome> {
        self.inner.submit_quiz(quiz_id, attempt_id, answers)
    }

    fn update_lesson_progress(
        &self,
        lesson_id: i64,
        update: ProgressUpdate,
    ) -> RemoteFuture<'_, ()> {
        self.inner.update_lesson_progress(lesson_id, update)
    }

    fn enroll_in_subject(&self, subject_id: i64) -> RemoteFuture<'_, ()> {
        self.inner.enroll_in_subject(subject_id)
    }

    fn ping(&self) -> RemoteFuture<'_, ()> {
        self.inner.ping()
    }
}
