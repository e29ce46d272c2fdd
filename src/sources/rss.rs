use crate::fetcher::{FetchConfig, Fetcher};
use crate::parser::FeedParser;
use crate::sources::Collector;
use crate::types::{ContentItem, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Collector over a list of RSS/Atom feed URLs.
///
/// Each feed is fetched and parsed independently; a broken feed is logged
/// and skipped so it cannot empty the whole batch.
pub struct RssCollector {
    feeds: Vec<String>,
    fetcher: Fetcher,
    parser: Mutex<FeedParser>,
}

impl RssCollector {
    pub fn new(feeds: Vec<String>, fetch_config: FetchConfig) -> Self {
        Self {
            feeds,
            fetcher: Fetcher::new(fetch_config),
            parser: Mutex::new(FeedParser::new()),
        }
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }
}

#[async_trait]
impl Collector for RssCollector {
    fn source_id(&self) -> String {
        "rss".to_string()
    }

    fn source_name(&self) -> String {
        "RSS feeds".to_string()
    }

    async fn collect(&self) -> Result<Vec<ContentItem>> {
        let mut items = Vec::new();

        for feed_url in &self.feeds {
            let content = match self.fetcher.fetch_text(feed_url).await {
                Ok(content) => content,
                Err(e) => {
                    error!("Error fetching RSS feed {}: {}", feed_url, e);
                    continue;
                }
            };

            let mut parser = self.parser.lock().await;
            match parser.parse_feed(feed_url, &content) {
                Ok(feed_items) => {
                    info!("Collected {} items from {}", feed_items.len(), feed_url);
                    items.extend(feed_items);
                }
                Err(e) => {
                    error!("Error parsing RSS feed {}: {}", feed_url, e);
                }
            }
        }

        Ok(items)
    }
}
