// src/feed/mod.rs
pub mod host;
pub mod providers;
pub mod types;

use crate::feed::types::{FeedError, ItemId, ItemSource, RawItem, Story};
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

/// Default cap on lookups in flight per batch.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_fetched_total", "Item lookups that returned an item.");
        describe_counter!("feed_item_errors_total", "Item lookups that failed and were dropped.");
        describe_counter!(
            "feed_stories_kept_total",
            "Fetched items that passed the story-link filter."
        );
        describe_counter!("feed_listing_errors_total", "Top id listing failures.");
    });
}

/// Outcome of a ranking pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranked {
    pub stories: Vec<Story>,
    /// Candidates ran out before `n` stories qualified.
    pub partial: bool,
    /// How many ids from the front of the listing were looked up.
    pub consumed: usize,
}

/// Batch size for `missing` outstanding stories: 25% over, rounded up.
/// Roughly a fifth of top items are text posts or jobs.
pub fn batch_size(missing: usize) -> usize {
    missing.saturating_mul(5).div_ceil(4)
}

/// Return the first `n` story links among `ids`, in `ids` order.
///
/// Looks ids up in over-sized batches until enough stories are found or the ids
/// run out. Lookups within a batch run concurrently (at most `max_in_flight` at
/// a time) and complete in any order; results are put back into id order before
/// filtering. Failed lookups are skipped.
pub async fn rank_ids<S>(source: &S, ids: &[ItemId], n: usize, max_in_flight: usize) -> Ranked
where
    S: ItemSource + ?Sized,
{
    ensure_metrics_described();

    // Never more stories than ids, whatever `n` asks for.
    let mut stories: Vec<Story> = Vec::with_capacity(n.min(ids.len()));
    let mut at = 0usize;
    while stories.len() < n && at < ids.len() {
        let need = batch_size(n - stories.len());
        let end = at.saturating_add(need).min(ids.len());
        let batch = &ids[at..end];
        at = end;

        let found = fetch_batch(source, batch, max_in_flight).await;
        tracing::debug!(
            target: "feed",
            batch = batch.len(),
            kept = found.len(),
            total = stories.len() + found.len(),
            "batch done"
        );
        stories.extend(found);
    }

    let partial = stories.len() < n;
    if partial {
        tracing::warn!(
            target: "feed",
            source = source.name(),
            wanted = n,
            found = stories.len(),
            candidates = ids.len(),
            "ran out of candidates"
        );
    }
    stories.truncate(n);

    Ranked {
        stories,
        partial,
        consumed: at,
    }
}

/// List the current top ids and rank them. Only the listing error is returned.
pub async fn fetch_top_stories<S>(
    source: &S,
    n: usize,
    max_in_flight: usize,
) -> Result<Ranked, FeedError>
where
    S: ItemSource + ?Sized,
{
    ensure_metrics_described();

    let ids = match source.top_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            counter!("feed_listing_errors_total").increment(1);
            return Err(e);
        }
    };
    Ok(rank_ids(source, &ids, n, max_in_flight).await)
}

async fn fetch_batch<S>(source: &S, batch: &[ItemId], max_in_flight: usize) -> Vec<Story>
where
    S: ItemSource + ?Sized,
{
    // Completion order is arbitrary; each result carries its position in the batch.
    let mut results: Vec<(usize, ItemId, Result<RawItem, FeedError>)> =
        stream::iter(batch.iter().copied().enumerate())
            .map(|(idx, id)| async move { (idx, id, source.item(id).await) })
            .buffer_unordered(max_in_flight.max(1))
            .collect()
            .await;
    results.sort_unstable_by_key(|(idx, _, _)| *idx);

    let mut out = Vec::with_capacity(results.len());
    for (_, id, res) in results {
        match res {
            Ok(item) => {
                counter!("feed_items_fetched_total").increment(1);
                if item.is_story_link() {
                    out.push(Story::from(item));
                }
            }
            Err(e) => {
                tracing::warn!(target: "feed", error = %e, id, source = source.name(), "item lookup failed");
                counter!("feed_item_errors_total").increment(1);
            }
        }
    }
    counter!("feed_stories_kept_total").increment(out.len() as u64);
    out
}
