//! Background refresh loop.
//!
//! Rebuilds the snapshot cache on a fixed interval until its cancellation
//! token fires:
//! 1. Refresh the cache for the configured story count
//! 2. Log and count a failed cycle; the previous snapshot stays active
//! 3. Sleep for the interval, or stop on cancellation
//!
//! A cycle that has started always runs to completion.
//!
//! # Example
//!
//! ```ignore
//! let shutdown = CancellationToken::new();
//! let handle = RefreshLoop::new(cache, 30, DEFAULT_REFRESH_INTERVAL)
//!     .seed()
//!     .await
//!     .spawn(shutdown.clone());
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::SnapshotCache;

/// Default time between refreshes (15 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

pub struct RefreshLoop {
    cache: Arc<SnapshotCache>,
    num_stories: usize,
    interval: Duration,
    delay_first: bool,
}

impl RefreshLoop {
    pub fn new(cache: Arc<SnapshotCache>, num_stories: usize, interval: Duration) -> Self {
        Self {
            cache,
            num_stories,
            interval,
            delay_first: false,
        }
    }

    /// Wait one interval before the first cycle. Used when startup already seeded the cache.
    pub fn after_initial_interval(mut self) -> Self {
        self.delay_first = true;
        self
    }

    /// Refresh once before serving. If that works the loop waits one interval before
    /// its first cycle; if it fails the loop starts retrying right away.
    pub async fn seed(self) -> Self {
        match self.cache.begin_refresh(self.num_stories).await {
            Ok(snap) => {
                info!(target: "refresh", stories = snap.len(), "cache seeded");
                self.after_initial_interval()
            }
            Err(e) => {
                warn!(
                    target: "refresh",
                    error = %e,
                    "seed refresh failed; first cycle starts immediately"
                );
                Self {
                    delay_first: false,
                    ..self
                }
            }
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            target: "refresh",
            stories = self.num_stories,
            interval_secs = self.interval.as_secs(),
            "refresh loop started"
        );

        if self.delay_first && !self.pause(&shutdown).await {
            info!(target: "refresh", "refresh loop stopped");
            return;
        }

        loop {
            match self.cache.begin_refresh(self.num_stories).await {
                Ok(snap) => debug!(
                    target: "refresh",
                    generation = snap.generation,
                    stories = snap.len(),
                    "refresh cycle done"
                ),
                Err(e) => warn!(
                    target: "refresh",
                    error = %e,
                    "refresh cycle failed; keeping previous snapshot"
                ),
            }

            if !self.pause(&shutdown).await {
                break;
            }
        }

        info!(target: "refresh", "refresh loop stopped");
    }

    /// Sleep one interval. Returns false if cancelled first.
    async fn pause(&self, shutdown: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => false,
            _ = tokio::time::sleep(self.interval) => true,
        }
    }
}
