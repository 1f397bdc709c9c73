// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP implementation of [`RemoteApi`] against the LearnMate REST API.
//!
//! Every JSON response is wrapped in a `{success, message, data}` envelope;
//! [`decode_envelope`] unwraps it and turns failures into [`RemoteError`].
//! Content endpoints nest their record one level deeper, under a key naming
//! it (`data.lesson`, `data.lessons`); [`decode_keyed`] reads those.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use lm_core::{Lesson, ProgressUpdate, Quiz, QuizAnswer, QuizOutcome, Subject};

use super::remote::{RemoteApi, RemoteError, RemoteFuture, RemoteResult};

/// Default API root when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct AttemptStarted {
    attempt_id: i64,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Build the error for a non-2xx response, preferring the envelope's message.
fn status_error(status: u16, body: &[u8]) -> RemoteError {
    let message = serde_json::from_slice::<Envelope<Value>>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    RemoteError::Status { status, message }
}

fn rejected(status: u16, message: Option<String>) -> RemoteError {
    RemoteError::Status {
        status,
        message: message.unwrap_or_else(|| "request failed".to_string()),
    }
}

/// Unwrap a response body into its `data` payload.
///
/// Non-2xx statuses and `success: false` envelopes become
/// [`RemoteError::Status`] carrying the server's message when present.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &[u8]) -> RemoteResult<T> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }

    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| RemoteError::Decode(e.to_string()))?;
    if !envelope.success {
        return Err(rejected(status, envelope.message));
    }
    envelope
        .data
        .ok_or_else(|| RemoteError::Decode("response has no data".to_string()))
}

/// Unwrap a response body into the record stored under `data[key]`.
pub fn decode_keyed<T: DeserializeOwned>(status: u16, body: &[u8], key: &str) -> RemoteResult<T> {
    let mut data: Map<String, Value> = decode_envelope(status, body)?;
    let value = data
        .remove(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| RemoteError::Decode(format!("response has no '{key}'")))?;
    serde_json::from_value(value).map_err(|e| RemoteError::Decode(format!("{key}: {e}")))
}

/// Check a response whose body carries no data the client needs.
///
/// Empty or non-envelope 2xx bodies are accepted.
pub fn decode_ack(status: u16, body: &[u8]) -> RemoteResult<()> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    match serde_json::from_slice::<Envelope<Value>>(body) {
        Ok(envelope) if !envelope.success => Err(rejected(status, envelope.message)),
        _ => Ok(()),
    }
}

fn network(e: reqwest::Error) -> RemoteError {
    RemoteError::Network(e.to_string())
}

/// `reqwest` client bound to one API root.
pub struct HttpRemote {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRemote {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("learnmate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(network)?;
        Ok(HttpRemote {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/lessons/3`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> RemoteResult<(u16, Vec<u8>)> {
        let response = builder.send().await.map_err(network)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(network)?;
        Ok((status, body.to_vec()))
    }

    async fn get_keyed<T: DeserializeOwned>(&self, path: &str, key: &str) -> RemoteResult<T> {
        tracing::debug!(path, "GET");
        let (status, body) = self.send(self.request(Method::GET, path)).await?;
        decode_keyed(status, &body, key)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, payload: Value) -> RemoteResult<T> {
        tracing::debug!(path, "POST");
        let (status, body) = self
            .send(self.request(Method::POST, path).json(&payload))
            .await?;
        decode_envelope(status, &body)
    }

    async fn post_ack(&self, path: &str, payload: Option<Value>) -> RemoteResult<()> {
        tracing::debug!(path, "POST");
        let mut builder = self.request(Method::POST, path);
        if let Some(payload) = payload {
            builder = builder.json(&payload);
        }
        let (status, body) = self.send(builder).await?;
        decode_ack(status, &body)
    }
}

impl RemoteApi for HttpRemote {
    fn fetch_subject(&self, subject_id: i64) -> RemoteFuture<'_, Subject> {
        Box::pin(async move {
            self.get_keyed(&format!("/subjects/{subject_id}"), "subject")
                .await
        })
    }

    fn fetch_lessons_by_subject(&self, subject_id: i64) -> RemoteFuture<'_, Vec<Lesson>> {
        Box::pin(async move {
            self.get_keyed(&format!("/lessons/subject/{subject_id}"), "lessons")
                .await
        })
    }

    fn fetch_lesson(&self, lesson_id: i64) -> RemoteFuture<'_, Lesson> {
        Box::pin(async move { self.get_keyed(&format!("/lessons/{lesson_id}"), "lesson").await })
    }

    fn fetch_quiz(&self, quiz_id: i64) -> RemoteFuture<'_, Quiz> {
        Box::pin(async move { self.get_keyed(&format!("/quizzes/{quiz_id}"), "quiz").await })
    }

    fn fetch_attachment(&self, lesson_id: i64) -> RemoteFuture<'_, Vec<u8>> {
        Box::pin(async move {
            let path = format!("/lessons/{lesson_id}/download");
            tracing::debug!(path, "GET");
            let (status, body) = self.send(self.request(Method::GET, &path)).await?;
            if !is_success(status) {
                return Err(status_error(status, &body));
            }
            Ok(body)
        })
    }

    fn start_quiz_attempt(&self, quiz_id: i64) -> RemoteFuture<'_, i64> {
        Box::pin(async move {
            let started: AttemptStarted = self
                .post(&format!("/quizzes/{quiz_id}/start"), json!({}))
                .await?;
            Ok(started.attempt_id)
        })
    }

    fn submit_quiz(
        &self,
        quiz_id: i64,
        attempt_id: i64,
        answers: Vec<QuizAnswer>,
    ) -> RemoteFuture<'_, QuizOutcome> {
        Box::pin(async move {
            let payload = json!({ "attempt_id": attempt_id, "answers": answers });
            self.post(&format!("/quizzes/{quiz_id}/submit"), payload)
                .await
        })
    }

    fn update_lesson_progress(
        &self,
        lesson_id: i64,
        update: ProgressUpdate,
    ) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let payload = serde_json::to_value(update)
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
            self.post_ack(&format!("/lessons/{lesson_id}/progress"), Some(payload))
                .await
        })
    }

    fn enroll_in_subject(&self, subject_id: i64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            self.post_ack(&format!("/students/enroll/{subject_id}"), None)
                .await
        })
    }

    fn ping(&self) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let (status, _) = self.send(self.request(Method::GET, "/health")).await?;
            if is_success(status) {
                Ok(())
            } else {
                Err(RemoteError::Status {
                    status,
                    message: "health check failed".to_string(),
                })
            }
        })
    }
}
