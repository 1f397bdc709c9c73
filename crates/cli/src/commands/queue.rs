// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-change inspection and delivery.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::cli::OutputFormat;
use crate::display::{format_queue_item, format_report, format_sync_status};
use crate::error::Result;
use crate::sync::{spawn_health_check, RemoteApi, SyncReport};

use super::{print_json, App};

pub async fn list<R: RemoteApi + 'static>(app: &App<R>, format: OutputFormat) -> Result<()> {
    let items = app.engine.queue().get_all().await?;
    match format {
        OutputFormat::Json => print_json(&items),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No pending changes");
            }
            for item in &items {
                println!("{}", format_queue_item(item));
            }
            Ok(())
        }
    }
}

pub async fn count<R: RemoteApi + 'static>(app: &App<R>) -> Result<()> {
    println!("{}", app.engine.queue().count().await?);
    Ok(())
}

pub async fn clear<R: RemoteApi + 'static>(app: &App<R>) -> Result<()> {
    let removed = app.engine.clear_queue().await?;
    println!("Discarded {removed} pending change(s)");
    Ok(())
}

/// Drain the queue once.
pub async fn sync<R: RemoteApi + 'static>(app: &App<R>) -> Result<()> {
    match sync_impl(app).await? {
        Some(report) => println!("{}", format_report(&report)),
        None => println!(
            "Offline: {} change(s) pending",
            app.engine.queue().count().await?
        ),
    }
    Ok(())
}

/// Run one drain if online. `None` when offline.
pub(crate) async fn sync_impl<R: RemoteApi + 'static>(
    app: &App<R>,
) -> Result<Option<SyncReport>> {
    if !app.is_online() {
        return Ok(None);
    }
    Ok(Some(app.engine.sync().await))
}

/// Run the engine until Ctrl-C, printing status updates on stderr.
///
/// Connectivity is re-checked on the sync interval unless offline mode was
/// forced, so reconnecting triggers a drain.
pub async fn watch<R: RemoteApi + 'static>(app: &App<R>, forced_offline: bool) -> Result<()> {
    let mut statuses = app.engine.subscribe();
    let health_check = (!forced_offline).then(|| {
        spawn_health_check(
            app.connectivity.clone(),
            Arc::clone(&app.remote),
            app.engine.config().interval,
        )
    });
    let _connectivity = app.connectivity.on_status_change(|online| {
        eprintln!("{}", if online { "online" } else { "offline" });
    });

    app.engine.start();
    eprintln!("Watching for changes, press Ctrl-C to stop");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            status = statuses.recv() => match status {
                Ok(status) => eprintln!("{}", format_sync_status(&status)),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    app.engine.stop();
    if let Some(health_check) = health_check {
        health_check.abort();
    }
    while app.engine.is_syncing() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
