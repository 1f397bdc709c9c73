// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API abstraction.
//!
//! The sync engine and the bundle manager only talk to the server through
//! [`RemoteApi`], so tests can substitute a fake and the CLI can layer a
//! read-through cache over the HTTP client.

use std::future::Future;
use std::pin::Pin;

use lm_core::{Lesson, ProgressUpdate, Quiz, QuizAnswer, QuizOutcome, Subject};

/// Error type for remote API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a failure.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The operation is not possible in the current mode.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

/// Result type for remote API calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteApi`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// Operations the client needs from the LearnMate server.
pub trait RemoteApi: Send + Sync {
    fn fetch_subject(&self, subject_id: i64) -> RemoteFuture<'_, Subject>;

    /// Lesson summaries for a subject, in subject order.
    fn fetch_lessons_by_subject(&self, subject_id: i64) -> RemoteFuture<'_, Vec<Lesson>>;

    /// Full lesson detail.
    fn fetch_lesson(&self, lesson_id: i64) -> RemoteFuture<'_, Lesson>;

    fn fetch_quiz(&self, quiz_id: i64) -> RemoteFuture<'_, Quiz>;

    /// Raw bytes of a lesson's attachment.
    fn fetch_attachment(&self, lesson_id: i64) -> RemoteFuture<'_, Vec<u8>>;

    /// Start a new attempt and return its id.
    fn start_quiz_attempt(&self, quiz_id: i64) -> RemoteFuture<'_, i64>;

    fn submit_quiz(
        &self,
        quiz_id: i64,
        attempt_id: i64,
        answers: Vec<QuizAnswer>,
    ) -> RemoteFuture<'_, QuizOutcome>;

    fn update_lesson_progress(
        &self,
        lesson_id: i64,
        update: ProgressUpdate,
    ) -> RemoteFuture<'_, ()>;

    fn enroll_in_subject(&self, subject_id: i64) -> RemoteFuture<'_, ()>;

    /// Health check used to decide connectivity.
    fn ping(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}
