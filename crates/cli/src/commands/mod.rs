// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod activity;
pub mod content;
pub mod maintenance;
pub mod queue;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use lm_core::LocalStore;

use crate::config::{db_path, find_data_dir, Config};
use crate::error::Result;
use crate::offline::OfflineBundleManager;
use crate::sync::{
    check_health, CachedRemote, ConnectivityMonitor, HttpRemote, RemoteApi, SyncEngine,
};

/// Remote used by the binary: HTTP behind a read-through cache.
pub type LiveRemote = CachedRemote<HttpRemote>;

/// Everything a command needs, wired over one store and one remote.
pub struct App<R: RemoteApi + 'static> {
    pub config: Config,
    pub data_dir: PathBuf,
    pub store: LocalStore,
    pub remote: Arc<R>,
    pub connectivity: ConnectivityMonitor,
    pub engine: Arc<SyncEngine<R>>,
    pub bundles: OfflineBundleManager<R>,
}

impl<R: RemoteApi + 'static> App<R> {
    pub fn new(
        config: Config,
        data_dir: &Path,
        store: LocalStore,
        remote: Arc<R>,
        online: bool,
    ) -> Self {
        let connectivity = ConnectivityMonitor::new(online);
        let engine = Arc::new(SyncEngine::new(
            store.queue(),
            Arc::clone(&remote),
            connectivity.clone(),
            config.sync_config(),
        ));
        let bundles =
            OfflineBundleManager::new(store.clone(), Arc::clone(&remote), connectivity.clone());
        App {
            config,
            data_dir: data_dir.to_path_buf(),
            store,
            remote,
            connectivity,
            engine,
            bundles,
        }
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }
}

/// Open the local store and remote for the current invocation.
///
/// Connectivity is decided once up front: `offline` forces offline mode,
/// otherwise a single health check decides.
pub async fn open(data_dir: Option<PathBuf>, offline: bool) -> Result<App<LiveRemote>> {
    let data_dir = find_data_dir(data_dir)?;
    let config = Config::load(&data_dir)?.with_env_overrides();
    let store = LocalStore::open(&db_path(&data_dir))?;

    let http = HttpRemote::new(
        &config.api_url,
        config.token.clone(),
        config.request_timeout(),
    )?;
    let cache = store.cache().with_default_ttl(config.cache_ttl());
    let remote = Arc::new(CachedRemote::new(http, cache).with_ttl(config.content_ttl()));

    let online = !offline && check_health(remote.as_ref()).await;
    tracing::debug!(online, api_url = %config.api_url, "connectivity decided");

    Ok(App::new(config, &data_dir, store, remote, online))
}

/// Print `value` as a single line of JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
