// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store.
//!
//! The [`Database`] struct owns every persisted byte on the client: the
//! expiring cache, the sync queue, committed offline bundles with their
//! attachments, and denormalized copies of downloaded content.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::bundle::{Attachment, OfflineSubject, StorageInfo};
use crate::cache::CacheEntry;
use crate::content::{Lesson, Quiz, Subject};
use crate::error::{Error, Result};
use crate::mutation::{NewSyncItem, SyncKind, SyncQueueItem};

/// Current schema version, recorded in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
-- Read-through cache; timestamp is the absolute expiry in epoch ms
CREATE TABLE IF NOT EXISTS cached_data (
    key TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

-- Pending mutations; AUTOINCREMENT keeps ids from being reused
CREATE TABLE IF NOT EXISTS sync_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    endpoint TEXT NOT NULL,
    method TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    retries INTEGER NOT NULL DEFAULT 0
);

-- Committed offline bundles keyed by subject id
CREATE TABLE IF NOT EXISTS offline_subjects (
    id INTEGER PRIMARY KEY,
    data TEXT NOT NULL,
    downloaded_at INTEGER NOT NULL
);

-- Lesson attachments materialized with their bundle
CREATE TABLE IF NOT EXISTS offline_attachments (
    lesson_id INTEGER PRIMARY KEY,
    subject_id INTEGER NOT NULL,
    data BLOB NOT NULL,
    stored_at INTEGER NOT NULL
);

-- Denormalized content for per-record lookups
CREATE TABLE IF NOT EXISTS subjects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    id INTEGER PRIMARY KEY,
    subject_id INTEGER NOT NULL,
    order_number INTEGER NOT NULL DEFAULT 0,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quizzes (
    id INTEGER PRIMARY KEY,
    lesson_id INTEGER NOT NULL,
    data TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_cached_data_timestamp ON cached_data(timestamp);
CREATE INDEX IF NOT EXISTS idx_sync_queue_created ON sync_queue(created_at, id);
CREATE INDEX IF NOT EXISTS idx_offline_subjects_downloaded ON offline_subjects(downloaded_at);
CREATE INDEX IF NOT EXISTS idx_offline_attachments_subject ON offline_attachments(subject_id);
CREATE INDEX IF NOT EXISTS idx_lessons_subject ON lessons(subject_id, order_number);
CREATE INDEX IF NOT EXISTS idx_quizzes_lesson ON quizzes(lesson_id);
"#;

/// Build the conversion error rusqlite expects from a row mapper.
fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse a JSON document stored in a text column.
fn parse_json<T: DeserializeOwned>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    serde_json::from_str(value)
        .map_err(|e| corrupted(format!("invalid JSON in column '{column}': {e}")))
}

/// Parse an epoch-millisecond timestamp from the database.
fn parse_millis(value: i64, column: &str) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

fn to_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

/// Run schema creation on a database connection.
///
/// Idempotent; applied on every open so older files pick up new tables and
/// indexes.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
    }
    Ok(())
}

const QUEUE_COLUMNS: &str = "id, type, endpoint, method, payload, created_at, retries";

fn queue_item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SyncQueueItem> {
    let kind: String = row.get(1)?;
    let method: String = row.get(3)?;
    let payload: String = row.get(4)?;
    Ok(SyncQueueItem {
        id: row.get(0)?,
        kind: SyncKind::from(kind.as_str()),
        endpoint: row.get(2)?,
        method: parse_db(&method, "method")?,
        payload: parse_json(&payload, "payload")?,
        created_at: parse_millis(row.get(5)?, "created_at")?,
        retries: row.get(6)?,
    })
}

fn bundle_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OfflineSubject> {
    let data: String = row.get(0)?;
    parse_json(&data, "data")
}

/// SQLite connection with local store operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL keeps readers from blocking the sync writer
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // Cache

    /// Insert or overwrite a cache entry.
    pub fn cache_put(&self, key: &str, data: &Value, expires_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO cached_data (key, data, timestamp) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, timestamp = excluded.timestamp",
            params![key, serde_json::to_string(data)?, expires_at.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Get a cache entry regardless of expiry.
    pub fn cache_get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT key, data, timestamp FROM cached_data WHERE key = ?1",
                params![key],
                |row| {
                    let data: String = row.get(1)?;
                    Ok(CacheEntry {
                        key: row.get(0)?,
                        data: parse_json(&data, "data")?,
                        expires_at: parse_millis(row.get(2)?, "timestamp")?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Delete a cache entry. Returns true if it existed.
    pub fn cache_delete(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM cached_data WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    /// Delete every cache entry.
    pub fn cache_clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM cached_data", [])?)
    }

    /// Delete entries whose expiry is before `now`.
    pub fn cache_delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM cached_data WHERE timestamp < ?1",
            params![now.timestamp_millis()],
        )?)
    }

    pub fn cache_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cached_data", [], |row| row.get(0))?;
        Ok(to_count(count))
    }

    // Sync queue

    /// Append a mutation to the queue with zero retries. Returns the new id.
    pub fn queue_insert(&self, item: &NewSyncItem, created_at: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sync_queue (type, endpoint, method, payload, created_at, retries)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                item.kind.as_str(),
                item.endpoint,
                item.method.as_str(),
                serde_json::to_string(&item.payload)?,
                created_at.timestamp_millis(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All queued mutations, oldest first.
    pub fn queue_all(&self) -> Result<Vec<SyncQueueItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {QUEUE_COLUMNS} FROM sync_queue ORDER BY created_at ASC, id ASC"
        ))?;
        let items = stmt
            .query_map([], queue_item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn queue_get(&self, id: i64) -> Result<Option<SyncQueueItem>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {QUEUE_COLUMNS} FROM sync_queue WHERE id = ?1"),
                params![id],
                queue_item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    /// Delete a queued mutation. Returns true if it existed.
    pub fn queue_delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM sync_queue WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Increment the retry count in place. Returns false if the item is gone.
    pub fn queue_bump_retries(&self, id: i64) -> Result<bool> {
        let updated = self.conn.execute(
            "UPDATE sync_queue SET retries = retries + 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(updated > 0)
    }

    pub fn queue_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?;
        Ok(to_count(count))
    }

    pub fn queue_clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM sync_queue", [])?)
    }

    // Offline bundles

    /// Commit a bundle, its attachments and the denormalized content rows in
    /// one transaction. Replaces any earlier bundle for the same subject,
    /// including lessons and quizzes the new bundle no longer lists.
    pub fn commit_bundle(
        &mut self,
        bundle: &OfflineSubject,
        attachments: &[Attachment],
    ) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT OR REPLACE INTO offline_subjects (id, data, downloaded_at) VALUES (?1, ?2, ?3)",
            params![
                bundle.id,
                serde_json::to_string(bundle)?,
                bundle.downloaded_at.timestamp_millis(),
            ],
        )?;

        tx.execute(
            "DELETE FROM offline_attachments WHERE subject_id = ?1",
            params![bundle.id],
        )?;
        for attachment in attachments {
            tx.execute(
                "INSERT OR REPLACE INTO offline_attachments (lesson_id, subject_id, data, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![attachment.lesson_id, attachment.subject_id, attachment.data, now],
            )?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO subjects (id, name, data) VALUES (?1, ?2, ?3)",
            params![
                bundle.subject.id,
                bundle.subject.name,
                serde_json::to_string(&bundle.subject)?,
            ],
        )?;
        tx.execute(
            "DELETE FROM quizzes
             WHERE lesson_id IN (SELECT id FROM lessons WHERE subject_id = ?1)",
            params![bundle.id],
        )?;
        tx.execute(
            "DELETE FROM lessons WHERE subject_id = ?1",
            params![bundle.id],
        )?;
        for lesson in &bundle.lessons {
            tx.execute(
                "INSERT OR REPLACE INTO lessons (id, subject_id, order_number, data)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    lesson.id,
                    lesson.subject_id,
                    lesson.order_number,
                    serde_json::to_string(lesson)?,
                ],
            )?;
        }
        for quiz in &bundle.quizzes {
            tx.execute(
                "INSERT OR REPLACE INTO quizzes (id, lesson_id, data) VALUES (?1, ?2, ?3)",
                params![quiz.id, quiz.lesson_id, serde_json::to_string(quiz)?],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn get_bundle(&self, subject_id: i64) -> Result<Option<OfflineSubject>> {
        let bundle = self
            .conn
            .query_row(
                "SELECT data FROM offline_subjects WHERE id = ?1",
                params![subject_id],
                bundle_from_row,
            )
            .optional()?;
        Ok(bundle)
    }

    pub fn bundle_exists(&self, subject_id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM offline_subjects WHERE id = ?1)",
            params![subject_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// All committed bundles, oldest download first.
    pub fn list_bundles(&self) -> Result<Vec<OfflineSubject>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM offline_subjects ORDER BY downloaded_at ASC, id ASC")?;
        let bundles = stmt
            .query_map([], bundle_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(bundles)
    }

    /// Delete a bundle and its attachments. Denormalized content rows are
    /// left in place. Returns true if a bundle existed.
    pub fn delete_bundle(&mut self, subject_id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM offline_attachments WHERE subject_id = ?1",
            params![subject_id],
        )?;
        let deleted = tx.execute(
            "DELETE FROM offline_subjects WHERE id = ?1",
            params![subject_id],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    pub fn get_attachment(&self, lesson_id: i64) -> Result<Option<Vec<u8>>> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM offline_attachments WHERE lesson_id = ?1",
                params![lesson_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data)
    }

    // Denormalized content

    pub fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
        self.get_json("SELECT data FROM subjects WHERE id = ?1", id)
    }

    pub fn get_lesson(&self, id: i64) -> Result<Option<Lesson>> {
        self.get_json("SELECT data FROM lessons WHERE id = ?1", id)
    }

    pub fn get_quiz(&self, id: i64) -> Result<Option<Quiz>> {
        self.get_json("SELECT data FROM quizzes WHERE id = ?1", id)
    }

    /// Lessons stored for a subject, in lesson order.
    pub fn lessons_for_subject(&self, subject_id: i64) -> Result<Vec<Lesson>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM lessons WHERE subject_id = ?1 ORDER BY order_number ASC, id ASC",
        )?;
        let lessons = stmt
            .query_map(params![subject_id], |row| {
                let data: String = row.get(0)?;
                parse_json(&data, "data")
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lessons)
    }

    fn get_json<T: DeserializeOwned>(&self, sql: &str, id: i64) -> Result<Option<T>> {
        let value = self
            .conn
            .query_row(sql, params![id], |row| {
                let data: String = row.get(0)?;
                parse_json(&data, "data")
            })
            .optional()?;
        Ok(value)
    }

    // Maintenance

    /// Measure what is stored for offline use.
    pub fn storage_usage(&self) -> Result<StorageInfo> {
        let (subjects, lessons, quizzes, bundle_bytes) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(json_array_length(data, '$.lessons')), 0),
                    COALESCE(SUM(json_array_length(data, '$.quizzes')), 0),
                    COALESCE(SUM(length(data)), 0)
             FROM offline_subjects",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;
        let attachment_bytes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(data)), 0) FROM offline_attachments",
            [],
            |row| row.get(0),
        )?;

        Ok(StorageInfo {
            offline_subjects: to_count(subjects),
            total_lessons: to_count(lessons),
            total_quizzes: to_count(quizzes),
            bundle_bytes: u64::try_from(bundle_bytes).unwrap_or(0),
            attachment_bytes: u64::try_from(attachment_bytes).unwrap_or(0),
            pending_mutations: self.queue_count()?,
            cache_entries: self.cache_count()?,
        })
    }

    /// Empty every table (logout).
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM cached_data;
             DELETE FROM sync_queue;
             DELETE FROM offline_subjects;
             DELETE FROM offline_attachments;
             DELETE FROM subjects;
             DELETE FROM lessons;
             DELETE FROM quizzes;",
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
