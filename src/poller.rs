//! Fixed-interval refresh task.
//!
//! Polling is the only freshness mechanism; there is no push transport. The
//! first tick fires immediately so a fresh handle loads data right away, and
//! `refresh_now` is the focus-regained analogue that forces an extra pass
//! between ticks. Dropping the handle aborts the task so no timer leaks
//! past teardown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{ListStore, MemoryStore};
use crate::service::NotificationService;

pub struct Poller {
    handle: JoinHandle<()>,
    sweep: Option<JoinHandle<()>>,
    notify: Arc<Notify>,
}

impl Poller {
    pub fn spawn<S>(service: Arc<NotificationService<S>>, interval: Duration) -> Self
    where
        S: ListStore + 'static,
    {
        let notify = Arc::new(Notify::new());
        let trigger = notify.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = trigger.notified() => {
                        debug!("manual refresh requested");
                    }
                }
                match service.refresh().await {
                    Ok(()) => {}
                    Err(e) if e.is_transient() => {
                        // degrade to stale/empty data; next tick is the retry
                        warn!(error = %e, "notification refresh failed");
                    }
                    Err(e) => {
                        warn!(error = %e, "stopping poller after fatal refresh error");
                        break;
                    }
                }
            }
        });

        Self {
            handle,
            sweep: None,
            notify,
        }
    }

    /// Same poller with the periodic cache sweep the memory store wants.
    pub fn spawn_with_sweep(
        service: Arc<NotificationService<MemoryStore>>,
        interval: Duration,
    ) -> Self {
        let store = service.store().clone();
        let mut poller = Self::spawn(service, interval);
        poller.sweep = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(60));
            loop {
                ticker.tick().await;
                let evicted = store.evict_expired();
                if evicted > 0 {
                    debug!(evicted, "swept expired cache entries");
                }
            }
        }));
        poller
    }

    /// Force a refresh outside the schedule (tab-refocus equivalent).
    pub fn refresh_now(&self) {
        self.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
        if let Some(sweep) = &self.sweep {
            sweep.abort();
        }
    }
}
