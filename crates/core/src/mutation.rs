// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mutations produced while offline and queued for delivery.
//!
//! A queued item carries the kind of mutation, the endpoint it targets and a
//! kind-specific JSON payload. The endpoint is the only place the target's
//! id lives; [`SyncQueueItem::target_id`] recovers it at delivery time.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::content::{ProgressUpdate, QuizAnswer};
use crate::error::{Error, Result};

/// Kind of queued mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncKind {
    /// Quiz answers to submit as a fresh attempt.
    QuizSubmit,
    /// Completion flag and time spent on a lesson.
    LessonProgress,
    /// Enrollment in a subject.
    Enroll,
    /// A kind this client does not know how to deliver.
    Other(String),
}

impl SyncKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &str {
        match self {
            SyncKind::QuizSubmit => "quiz_submit",
            SyncKind::LessonProgress => "lesson_progress",
            SyncKind::Enroll => "enroll",
            SyncKind::Other(kind) => kind,
        }
    }

    /// Index of the endpoint segment holding the target id
    /// (`/quizzes/{id}/submit`, `/lessons/{id}/progress`, `/students/enroll/{id}`).
    fn target_segment(&self) -> Option<usize> {
        match self {
            SyncKind::QuizSubmit | SyncKind::LessonProgress => Some(1),
            SyncKind::Enroll => Some(2),
            SyncKind::Other(_) => None,
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncKind {
    fn from(s: &str) -> Self {
        match s {
            "quiz_submit" => SyncKind::QuizSubmit,
            "lesson_progress" => SyncKind::LessonProgress,
            "enroll" => SyncKind::Enroll,
            other => SyncKind::Other(other.to_string()),
        }
    }
}

impl Serialize for SyncKind {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SyncKind {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SyncKind::from(s.as_str()))
    }
}

/// HTTP verb the mutation was recorded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// Payload of a `quiz_submit` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<QuizAnswer>,
}

/// A mutation about to be queued; id, timestamp and retry count are assigned
/// by the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSyncItem {
    #[serde(rename = "type")]
    pub kind: SyncKind,
    pub endpoint: String,
    pub method: Method,
    #[serde(default)]
    pub payload: Value,
}

impl NewSyncItem {
    pub fn new(
        kind: SyncKind,
        endpoint: impl Into<String>,
        method: Method,
        payload: Value,
    ) -> Self {
        NewSyncItem {
            kind,
            endpoint: endpoint.into(),
            method,
            payload,
        }
    }

    /// Queue a quiz submission for `quiz_id`.
    pub fn quiz_submit(quiz_id: i64, answers: Vec<QuizAnswer>) -> Result<Self> {
        let payload = serde_json::to_value(QuizSubmission { answers })?;
        Ok(NewSyncItem::new(
            SyncKind::QuizSubmit,
            format!("/quizzes/{quiz_id}/submit"),
            Method::Post,
            payload,
        ))
    }

    /// Queue a progress update for `lesson_id`.
    pub fn lesson_progress(lesson_id: i64, update: ProgressUpdate) -> Result<Self> {
        let payload = serde_json::to_value(update)?;
        Ok(NewSyncItem::new(
            SyncKind::LessonProgress,
            format!("/lessons/{lesson_id}/progress"),
            Method::Post,
            payload,
        ))
    }

    /// Queue an enrollment in `subject_id`.
    pub fn enroll(subject_id: i64) -> Self {
        NewSyncItem::new(
            SyncKind::Enroll,
            format!("/students/enroll/{subject_id}"),
            Method::Post,
            Value::Object(Default::default()),
        )
    }
}

/// A mutation stored in the sync queue awaiting delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncQueueItem {
    /// Locally assigned, increasing, never reused.
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: SyncKind,
    pub endpoint: String,
    pub method: Method,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    /// Failed delivery attempts so far.
    pub retries: u32,
}

impl SyncQueueItem {
    /// Derive the id of the resource this mutation targets from its endpoint.
    pub fn target_id(&self) -> Result<i64> {
        let invalid = || Error::InvalidTarget {
            kind: self.kind.to_string(),
            endpoint: self.endpoint.clone(),
        };
        let index = self.kind.target_segment().ok_or_else(invalid)?;
        self.endpoint
            .split('/')
            .filter(|segment| !segment.is_empty())
            .nth(index)
            .and_then(|segment| segment.parse().ok())
            .ok_or_else(invalid)
    }

    /// Decode the payload into the shape expected for this kind.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.payload.clone()).map_err(|e| Error::InvalidPayload {
            kind: self.kind.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
