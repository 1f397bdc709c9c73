// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline bundles: a subject's full content graph stored for offline reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{Lesson, Quiz, Subject};

/// A complete offline snapshot of one subject.
///
/// The presence of a committed bundle keyed by subject id is the only thing
/// that makes a subject available offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineSubject {
    /// Subject id, also the bundle's key.
    pub id: i64,
    pub subject: Subject,
    /// Lessons in subject order.
    pub lessons: Vec<Lesson>,
    pub quizzes: Vec<Quiz>,
    /// When the bundle was assembled. Diagnostic only; bundles never expire.
    pub downloaded_at: DateTime<Utc>,
}

impl OfflineSubject {
    pub fn new(subject: Subject, lessons: Vec<Lesson>, quizzes: Vec<Quiz>) -> Self {
        OfflineSubject {
            id: subject.id,
            subject,
            lessons,
            quizzes,
            downloaded_at: Utc::now(),
        }
    }

    pub fn lesson(&self, lesson_id: i64) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }

    pub fn quiz(&self, quiz_id: i64) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == quiz_id)
    }
}

/// Attachment bytes fetched for a lesson, committed together with its bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub lesson_id: i64,
    pub subject_id: i64,
    pub data: Vec<u8>,
}

/// Aggregate footprint of everything stored for offline use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub offline_subjects: usize,
    pub total_lessons: usize,
    pub total_quizzes: usize,
    /// Bytes of serialized bundle records.
    pub bundle_bytes: u64,
    /// Bytes of materialized attachments.
    pub attachment_bytes: u64,
    /// Pending sync queue items.
    pub pending_mutations: usize,
    /// Rows in the expiring cache, expired or not.
    pub cache_entries: usize,
}

impl StorageInfo {
    pub fn total_bytes(&self) -> u64 {
        self.bundle_bytes + self.attachment_bytes
    }
}
