//! Background eviction of idle sessions.

use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Periodically calls [`SessionStore::sweep`].
///
/// Each sweep runs entirely under the store's write lock, so cancelling the
/// task can only happen between sweeps and never leaves a half-swept map.
pub struct ExpirySweeper {
    store: Arc<SessionStore>,
    ttl: Duration,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(store: Arc<SessionStore>, ttl: Duration, interval: Duration) -> Self {
        Self {
            store,
            ttl,
            interval,
        }
    }

    /// Spawns the sweeper as a background task.
    ///
    /// The task exits promptly once `cancel` is triggered. Returns a join
    /// handle that can be awaited after cancelling.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run_loop(cancel).await;
        })
    }

    async fn run_loop(&self, cancel: CancellationToken) {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(ttl = ?self.ttl, interval = ?self.interval, "session sweeper started");

        // Skip the first tick (fires immediately)
        timer.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("session sweeper stopped");
                    break;
                }
                _ = timer.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// Runs a single sweep and returns the number of evicted sessions.
    pub async fn run_once(&self) -> usize {
        let evicted = self.store.sweep(self.ttl).await;
        if evicted > 0 {
            info!(evicted, "idle sessions evicted");
        } else {
            debug!("sweep found no idle sessions");
        }
        evicted
    }
}
