// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache housekeeping and logout.

use crate::config::Config;
use crate::error::Result;
use crate::sync::RemoteApi;

use super::App;

pub async fn cache_prune<R: RemoteApi + 'static>(app: &App<R>) -> Result<()> {
    let removed = app.store.cache().clear_expired().await?;
    println!("Removed {removed} expired cache entries");
    Ok(())
}

pub async fn cache_clear<R: RemoteApi + 'static>(app: &App<R>) -> Result<()> {
    let removed = app.store.cache().clear().await?;
    println!("Removed {removed} cache entries");
    Ok(())
}

pub async fn logout<R: RemoteApi + 'static>(app: &App<R>) -> Result<()> {
    let discarded = logout_impl(app).await?;
    if discarded > 0 {
        eprintln!("warning: discarded {discarded} change(s) that were never synced");
    }
    println!("Logged out, local data removed");
    Ok(())
}

/// Empty the local store and forget the saved token. Returns how many
/// pending changes were discarded.
pub(crate) async fn logout_impl<R: RemoteApi + 'static>(app: &App<R>) -> Result<usize> {
    let pending = app.engine.queue().count().await?;
    app.store.clear_all().await?;

    // Environment overrides must not end up in the file
    let mut config = Config::load(&app.data_dir)?;
    if config.token.take().is_some() {
        config.save(&app.data_dir)?;
    }
    tracing::info!(pending, "logged out");
    Ok(pending)
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
