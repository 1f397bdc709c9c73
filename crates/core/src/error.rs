// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for lm-core operations.

use thiserror::Error;

/// All possible errors that can occur in lm-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid sync method: '{0}'\n  hint: valid methods are: POST, PUT")]
    InvalidMethod(String),

    #[error("cannot derive a target id for {kind} from endpoint '{endpoint}'")]
    InvalidTarget { kind: String, endpoint: String },

    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for lm-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
