// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! lm-core: Offline storage for the LearnMate client
//!
//! This crate provides the content records, queued mutations, the SQLite
//! local store, the expiring cache and the sync queue shared by the sync
//! engine and the offline bundle manager.

pub mod bundle;
pub mod cache;
pub mod content;
pub mod db;
pub mod error;
pub mod mutation;
pub mod queue;
pub mod store;

pub use bundle::{Attachment, OfflineSubject, StorageInfo};
pub use cache::{CacheEntry, CacheManager};
pub use content::{
    AnswerFeedback, Lesson, ProgressUpdate, Question, QuestionType, Quiz, QuizAnswer, QuizOption,
    QuizOutcome, QuizSummary, Subject,
};
pub use db::Database;
pub use error::{Error, Result};
pub use mutation::{Method, NewSyncItem, QuizSubmission, SyncKind, SyncQueueItem};
pub use queue::SyncQueue;
pub use store::LocalStore;
