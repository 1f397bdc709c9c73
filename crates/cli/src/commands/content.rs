// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Content commands: downloads, offline subjects, lessons and quizzes.

use std::io::Write;
use std::path::Path;

use lm_core::{Lesson, OfflineSubject, Quiz};

use crate::cli::OutputFormat;
use crate::display::{
    format_bundle_details, format_bundle_line, format_download_progress, format_lesson,
    format_quiz, format_storage,
};
use crate::error::{Error, Result};
use crate::offline::DownloadProgress;
use crate::sync::{RemoteApi, RemoteError, RemoteResult};

use super::{print_json, App};

/// Download a subject for offline use, reporting progress on stderr.
pub async fn download<R: RemoteApi + 'static>(
    app: &App<R>,
    subject_id: i64,
    format: OutputFormat,
) -> Result<()> {
    let bundle = download_impl(app, subject_id, |event| {
        if format == OutputFormat::Text {
            eprintln!("{}", format_download_progress(event));
        }
    })
    .await?;

    match format {
        OutputFormat::Json => print_json(&bundle),
        OutputFormat::Text => {
            println!("Downloaded {}", format_bundle_line(&bundle));
            Ok(())
        }
    }
}

/// Run a download while forwarding its progress events to `on_progress`.
pub(crate) async fn download_impl<R, F>(
    app: &App<R>,
    subject_id: i64,
    mut on_progress: F,
) -> Result<OfflineSubject>
where
    R: RemoteApi + 'static,
    F: FnMut(&DownloadProgress),
{
    let mut events = app.bundles.subscribe(subject_id);
    let download = app.bundles.download_subject(subject_id);
    tokio::pin!(download);

    let result = loop {
        tokio::select! {
            result = &mut download => break result,
            Ok(event) = events.recv() => on_progress(&event),
        }
    };
    while let Ok(event) = events.try_recv() {
        on_progress(&event);
    }
    Ok(result?)
}

pub async fn list_offline<R: RemoteApi + 'static>(
    app: &App<R>,
    format: OutputFormat,
) -> Result<()> {
    let bundles = app.bundles.list_offline_subjects().await?;
    match format {
        OutputFormat::Json => print_json(&bundles),
        OutputFormat::Text => {
            if bundles.is_empty() {
                println!("No subjects available offline");
            }
            for bundle in &bundles {
                println!("{}", format_bundle_line(bundle));
            }
            Ok(())
        }
    }
}

pub async fn show_offline<R: RemoteApi + 'static>(
    app: &App<R>,
    subject_id: i64,
    format: OutputFormat,
) -> Result<()> {
    let bundle = app
        .bundles
        .get_offline_subject(subject_id)
        .await?
        .ok_or(Error::NotFound {
            what: "offline subject",
            id: subject_id,
        })?;
    match format {
        OutputFormat::Json => print_json(&bundle),
        OutputFormat::Text => {
            println!("{}", format_bundle_details(&bundle));
            Ok(())
        }
    }
}

pub async fn remove_offline<R: RemoteApi + 'static>(
    app: &App<R>,
    subject_id: i64,
) -> Result<()> {
    if !app.bundles.remove_offline_subject(subject_id).await? {
        return Err(Error::NotFound {
            what: "offline subject",
            id: subject_id,
        });
    }
    println!("Removed subject {subject_id} from offline storage");
    Ok(())
}

pub async fn storage<R: RemoteApi + 'static>(
    app: &App<R>,
    format: OutputFormat,
) -> Result<()> {
    let info = app.bundles.storage_info().await?;
    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Text => {
            println!("{}", format_storage(&info));
            Ok(())
        }
    }
}

/// Write a lesson's stored attachment to `file`, or raw to stdout.
pub async fn save_attachment<R: RemoteApi + 'static>(
    app: &App<R>,
    lesson_id: i64,
    file: Option<&Path>,
) -> Result<()> {
    let data = offline_attachment(app, lesson_id).await?;
    match file {
        Some(path) => {
            std::fs::write(path, &data)?;
            println!(
                "Saved attachment for lesson {lesson_id} to {} ({} bytes)",
                path.display(),
                data.len()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Attachment bytes stored for a lesson by an offline download.
pub(crate) async fn offline_attachment<R: RemoteApi + 'static>(
    app: &App<R>,
    lesson_id: i64,
) -> Result<Vec<u8>> {
    app.bundles
        .attachment(lesson_id)
        .await?
        .ok_or(Error::NotAvailableOffline {
            what: "attachment",
            id: lesson_id,
        })
}

pub async fn lesson<R: RemoteApi + 'static>(
    app: &App<R>,
    lesson_id: i64,
    format: OutputFormat,
) -> Result<()> {
    let lesson = load_lesson(app, lesson_id).await?;
    match format {
        OutputFormat::Json => print_json(&lesson),
        OutputFormat::Text => {
            println!("{}", format_lesson(&lesson));
            Ok(())
        }
    }
}

pub async fn quiz<R: RemoteApi + 'static>(
    app: &App<R>,
    quiz_id: i64,
    format: OutputFormat,
) -> Result<()> {
    let quiz = load_quiz(app, quiz_id).await?;
    match format {
        OutputFormat::Json => print_json(&quiz),
        OutputFormat::Text => {
            println!("{}", format_quiz(&quiz));
            Ok(())
        }
    }
}

/// A lesson from the server, or from offline storage when disconnected.
pub(crate) async fn load_lesson<R: RemoteApi + 'static>(
    app: &App<R>,
    lesson_id: i64,
) -> Result<Lesson> {
    if app.is_online() {
        if let Some(lesson) = online_or_fallback(app, app.remote.fetch_lesson(lesson_id).await)? {
            return Ok(lesson);
        }
    }
    app.bundles
        .offline_lesson(lesson_id)
        .await?
        .ok_or(Error::NotAvailableOffline {
            what: "lesson",
            id: lesson_id,
        })
}

/// A quiz from the server, or from offline storage when disconnected.
pub(crate) async fn load_quiz<R: RemoteApi + 'static>(
    app: &App<R>,
    quiz_id: i64,
) -> Result<Quiz> {
    if app.is_online() {
        if let Some(quiz) = online_or_fallback(app, app.remote.fetch_quiz(quiz_id).await)? {
            return Ok(quiz);
        }
    }
    app.bundles
        .offline_quiz(quiz_id)
        .await?
        .ok_or(Error::NotAvailableOffline {
            what: "quiz",
            id: quiz_id,
        })
}

/// Unreachable servers switch the app offline and yield `None` so the caller
/// falls back to local data. Server rejections are returned as errors.
fn online_or_fallback<R: RemoteApi + 'static, T>(
    app: &App<R>,
    result: RemoteResult<T>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RemoteError::Network(reason)) => {
            tracing::warn!(%reason, "server unreachable, using offline copy");
            app.connectivity.set_online(false);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "content_tests.rs"]
mod tests;
