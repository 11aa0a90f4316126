use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::feed::types::{FeedError, ItemId, ItemSource, RawItem};

pub const DEFAULT_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Hacker News Firebase API client.
///
/// Stateless apart from the pooled `reqwest::Client`, so one instance is shared by
/// every concurrent lookup. No timeout is set; a stuck lookup stalls its batch.
#[derive(Clone, Debug)]
pub struct HnClient {
    base: String,
    client: Client,
}

impl HnClient {
    pub fn new(base: &str) -> Result<Self> {
        Url::parse(base).with_context(|| format!("invalid item feed base url {base:?}"))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn top_url(&self) -> String {
        format!("{}/topstories.json", self.base)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}/item/{}.json", self.base, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FeedError> {
        let wrap = |source: reqwest::Error| FeedError::Http {
            url: url.clone(),
            source,
        };
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(wrap)?;
        resp.json::<T>().await.map_err(wrap)
    }
}

impl Default for HnClient {
    fn default() -> Self {
        Self {
            base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ItemSource for HnClient {
    async fn top_ids(&self) -> Result<Vec<ItemId>, FeedError> {
        self.get_json(self.top_url()).await
    }

    async fn item(&self, id: ItemId) -> Result<RawItem, FeedError> {
        // Deleted or never-existing items come back as JSON `null`.
        let item: Option<RawItem> = self.get_json(self.item_url(id)).await?;
        item.ok_or(FeedError::Missing(id))
    }

    fn name(&self) -> &'static str {
        "hacker-news"
    }
}
