// tests/common/mod.rs
// Scripted item source shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use quiet_news::{FeedError, ItemId, ItemSource, RawItem};
use tokio::sync::watch;

pub fn story(id: ItemId) -> RawItem {
    RawItem {
        id,
        kind: "story".into(),
        url: format!("https://www.site{id}.test/post"),
        title: format!("Story {id}"),
        by: "tester".into(),
        score: id as i64,
        ..Default::default()
    }
}

/// Even ids alternate between comments and url-less stories.
pub fn non_link(id: ItemId) -> RawItem {
    if id % 4 == 0 {
        RawItem {
            id,
            kind: "comment".into(),
            url: format!("https://www.site{id}.test/"),
            ..Default::default()
        }
    } else {
        RawItem {
            id,
            kind: "story".into(),
            title: format!("Ask {id}"),
            ..Default::default()
        }
    }
}

pub struct ScriptedSource {
    ids: Vec<ItemId>,
    items: HashMap<ItemId, RawItem>,
    failing: HashSet<ItemId>,
    delays: HashMap<ItemId, Duration>,
    fail_listing_calls: Mutex<HashSet<usize>>,
    gate: Option<watch::Receiver<bool>>,
    pub listings: AtomicUsize,
    pub lookups: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl ScriptedSource {
    /// Ids `1..=count`; odd ids are story links, even ids are filtered out.
    pub fn alternating(count: u64) -> Self {
        let items = (1..=count)
            .map(|id| (id, if id % 2 == 1 { story(id) } else { non_link(id) }))
            .collect();
        Self::new((1..=count).collect(), items)
    }

    pub fn new(ids: Vec<ItemId>, items: HashMap<ItemId, RawItem>) -> Self {
        Self {
            ids,
            items,
            failing: HashSet::new(),
            delays: HashMap::new(),
            fail_listing_calls: Mutex::new(HashSet::new()),
            gate: None,
            listings: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, ids: &[ItemId]) -> Self {
        self.failing.extend(ids.iter().copied());
        self
    }

    pub fn delay(mut self, id: ItemId, d: Duration) -> Self {
        self.delays.insert(id, d);
        self
    }

    pub fn delay_all(mut self, d: Duration) -> Self {
        for id in self.ids.clone() {
            self.delays.insert(id, d);
        }
        self
    }

    /// Fail the given listing calls (1-based).
    pub fn fail_listing_on(self, calls: &[usize]) -> Self {
        self.fail_listing_calls
            .lock()
            .unwrap()
            .extend(calls.iter().copied());
        self
    }

    /// Lookups wait until the returned sender publishes `true`.
    pub fn gated(mut self) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        self.gate = Some(rx);
        (self, tx)
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemSource for ScriptedSource {
    async fn top_ids(&self) -> Result<Vec<ItemId>, FeedError> {
        let call = self.listings.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_listing_calls.lock().unwrap().contains(&call) {
            return Err(FeedError::Upstream(format!("listing call {call} refused")));
        }
        Ok(self.ids.clone())
    }

    async fn item(&self, id: ItemId) -> Result<RawItem, FeedError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(rx) = &self.gate {
            let mut rx = rx.clone();
            let _ = rx.wait_for(|open| *open).await;
        }
        if let Some(d) = self.delays.get(&id) {
            tokio::time::sleep(*d).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.contains(&id) {
            return Err(FeedError::Upstream(format!("item {id} refused")));
        }
        self.items.get(&id).cloned().ok_or(FeedError::Missing(id))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn ids_of(stories: &[quiet_news::Story]) -> Vec<ItemId> {
    stories.iter().map(|s| s.item.id).collect()
}
