//! Double-buffered snapshot cache.
//!
//! Two slots hold immutable [`Snapshot`]s behind `Arc`s; one of them is active.
//! A refresh builds the next snapshot without holding any lock readers take, then
//! stores it into the inactive slot and flips the active index in one short
//! critical section. Readers clone the active `Arc` and never see a snapshot that
//! is still being built.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::feed::{self, types::FeedError, types::ItemSource, types::Story, Ranked};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("cache_refresh_total", "Successful snapshot refreshes.");
        describe_counter!(
            "cache_refresh_failures_total",
            "Refreshes abandoned because the id listing failed."
        );
        describe_histogram!("cache_refresh_ms", "Time to build a snapshot in milliseconds.");
        describe_gauge!("cache_last_refresh_ts", "Unix ts of the last successful refresh.");
        describe_gauge!("cache_snapshot_stories", "Stories in the active snapshot.");
    });
}

/// One refresh cycle's result. Never mutated after construction.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub built_at: Option<DateTime<Utc>>,
    pub partial: bool,
    pub stories: Vec<Story>,
}

impl Snapshot {
    fn from_ranked(generation: u64, ranked: Ranked) -> Self {
        Self {
            generation,
            built_at: Some(Utc::now()),
            partial: ranked.partial,
            stories: ranked.stories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }
}

#[derive(Debug)]
struct Slots {
    slots: [Arc<Snapshot>; 2],
    active: usize,
}

pub struct SnapshotCache {
    source: Arc<dyn ItemSource>,
    max_in_flight: usize,
    slots: Mutex<Slots>,
    // Serializes refreshes; readers never touch it.
    refresh_gate: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

impl SnapshotCache {
    /// Both slots start with an empty generation-0 snapshot, slot 0 active.
    pub fn new(source: Arc<dyn ItemSource>, max_in_flight: usize) -> Self {
        let empty = Arc::new(Snapshot::default());
        Self {
            source,
            max_in_flight: max_in_flight.max(1),
            slots: Mutex::new(Slots {
                slots: [Arc::clone(&empty), empty],
                active: 0,
            }),
            refresh_gate: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        // Slots are consistent between statements, so a poisoned guard is still usable.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active snapshot. Only waits for a concurrent flip, never for a fetch.
    pub fn read(&self) -> Arc<Snapshot> {
        let slots = self.lock_slots();
        Arc::clone(&slots.slots[slots.active])
    }

    pub fn active_slot(&self) -> usize {
        self.lock_slots().active
    }

    /// Build a fresh snapshot of the top `n` stories and make it the active one.
    ///
    /// On a listing failure nothing changes and the error is returned.
    pub async fn begin_refresh(&self, n: usize) -> Result<Arc<Snapshot>, FeedError> {
        ensure_metrics_described();
        let _gate = self.refresh_gate.lock().await;

        let t0 = Instant::now();
        let ranked = match feed::fetch_top_stories(&*self.source, n, self.max_in_flight).await {
            Ok(r) => r,
            Err(e) => {
                counter!("cache_refresh_failures_total").increment(1);
                return Err(e);
            }
        };
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let fresh = Arc::new(Snapshot::from_ranked(generation, ranked));

        let slot = {
            let mut slots = self.lock_slots();
            let inactive = 1 - slots.active;
            slots.slots[inactive] = Arc::clone(&fresh);
            slots.active = inactive;
            inactive
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("cache_refresh_ms").record(ms);
        counter!("cache_refresh_total").increment(1);
        gauge!("cache_snapshot_stories").set(fresh.len() as f64);
        if let Some(ts) = fresh.built_at {
            gauge!("cache_last_refresh_ts").set(ts.timestamp() as f64);
        }
        tracing::info!(
            target: "cache",
            generation,
            slot,
            stories = fresh.len(),
            partial = fresh.partial,
            elapsed_ms = ms as u64,
            "snapshot swapped in"
        );

        Ok(fresh)
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.lock_slots();
        f.debug_struct("SnapshotCache")
            .field("source", &self.source.name())
            .field("active", &slots.active)
            .field("generation", &slots.slots[slots.active].generation)
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}
