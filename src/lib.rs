// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod feed;
pub mod metrics;
pub mod refresh;
pub mod render;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::{Snapshot, SnapshotCache};
pub use crate::feed::types::{FeedError, ItemId, ItemSource, RawItem, Story};
pub use crate::refresh::RefreshLoop;
