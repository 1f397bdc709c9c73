// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::offline::DownloadError;
use crate::sync::{RemoteError, SyncError};

/// All possible errors that can occur in the lmrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("could not determine a data directory\n  hint: pass --data-dir or set LEARNMATE_DATA_DIR")]
    NoDataDir,

    #[error("{what} {id} is not available offline\n  hint: run 'learnmate download <subject>' while online")]
    NotAvailableOffline { what: &'static str, id: i64 },

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: i64 },

    #[error("invalid answer '{0}'\n  hint: answers are written as QUESTION_ID=ANSWER, e.g. 12=B")]
    InvalidAnswer(String),

    #[error("{0}")]
    Core(#[from] lm_core::Error),

    #[error("{0}")]
    Remote(#[from] RemoteError),

    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),

    #[error("{0}")]
    Download(#[from] DownloadError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for lmrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
