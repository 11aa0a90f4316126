// src/feed/types.rs
use serde::{Deserialize, Serialize};

use crate::feed::host::extract_host;

/// Upstream identifier; the order of ids in a listing is the upstream rank.
pub type ItemId = u64;

/// Record as returned by the item feed. Display fields are passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawItem {
    pub id: ItemId,
    #[serde(rename = "type", default)]
    pub kind: String, // "story", "comment", "job", "poll", ...
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub time: i64, // unix seconds
    #[serde(default)]
    pub descendants: u32,
    #[serde(default)]
    pub kids: Vec<ItemId>,
    #[serde(default)]
    pub text: String,
}

impl RawItem {
    /// A story that links somewhere. Text posts (Ask HN etc.) have no url.
    pub fn is_story_link(&self) -> bool {
        self.kind == "story" && !self.url.is_empty()
    }
}

/// An item accepted into the ranked result, with its display host.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Story {
    #[serde(flatten)]
    pub item: RawItem,
    pub host: String,
}

impl From<RawItem> for Story {
    fn from(item: RawItem) -> Self {
        let host = extract_host(&item.url);
        Self { item, host }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("item {0} does not exist upstream")]
    Missing(ItemId),
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// Supplier of ranked candidate ids and per-id item data.
///
/// Implementations must be callable concurrently from many tasks.
#[async_trait::async_trait]
pub trait ItemSource: Send + Sync {
    async fn top_ids(&self) -> Result<Vec<ItemId>, FeedError>;
    async fn item(&self, id: ItemId) -> Result<RawItem, FeedError>;
    fn name(&self) -> &'static str;
}
