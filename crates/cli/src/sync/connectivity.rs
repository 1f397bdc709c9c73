// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline status shared by the sync engine and bundle manager.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::remote::RemoteApi;

/// Current connectivity, observable through a watch channel.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        ConnectivityMonitor { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Record the current status. Subscribers are only notified on change.
    ///
    /// Returns true if the status changed.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!(online, "connectivity changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Invoke `callback` with the new status on every change until the
    /// returned subscription is dropped.
    pub fn on_status_change<F>(&self, mut callback: F) -> StatusSubscription
    where
        F: FnMut(bool) + Send + 'static,
    {
        let mut rx = self.subscribe();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                callback(online);
            }
        });
        StatusSubscription { handle }
    }
}

/// Handle for a status callback; dropping it detaches the callback.
pub struct StatusSubscription {
    handle: JoinHandle<()>,
}

impl StatusSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Returns true if the remote answers its health check.
pub async fn check_health<R: RemoteApi + ?Sized>(remote: &R) -> bool {
    match remote.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "health check failed");
            false
        }
    }
}

/// Poll the remote's health check every `every` and update `monitor`.
pub fn spawn_health_check<R>(
    monitor: ConnectivityMonitor,
    remote: Arc<R>,
    every: Duration,
) -> JoinHandle<()>
where
    R: RemoteApi + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let online = check_health(remote.as_ref()).await;
            monitor.set_online(online);
        }
    })
}
