// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-subject offline bundles.
//!
//! A download walks subject, lessons, quizzes and attachments through the
//! [`RemoteApi`](crate::sync::RemoteApi) and commits everything at once, so a
//! subject is either fully available offline or not at all.

mod manager;

pub use manager::{DownloadError, DownloadProgress, DownloadStatus, OfflineBundleManager};
