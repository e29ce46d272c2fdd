use crate::types::{ContentItem, Result};
use async_trait::async_trait;

pub mod reddit;
pub mod rss;

pub use reddit::{RedditCollector, RedditConfig};
pub use rss::RssCollector;

/// Trait for pulling content from a source type (RSS feeds, Reddit, ...).
///
/// A collector owns its full source configuration and produces one batch of
/// items per run. A failing collector is reported and skipped by the
/// pipeline; it never aborts the run.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Unique identifier for this collector
    fn source_id(&self) -> String;

    /// Human-readable name for this collector
    fn source_name(&self) -> String;

    /// Fetch one batch of items from the source
    async fn collect(&self) -> Result<Vec<ContentItem>>;
}
