use crate::types::{ContentItem, PipelineError, Result, SourceKind};
use feed_rs::parser;
use std::collections::HashSet;
use tracing::{debug, info};

/// Parses RSS/Atom documents into `ContentItem`s, skipping entries already
/// seen during this run (same entry id or URL across feeds).
pub struct FeedParser {
    seen_ids: HashSet<String>,
    seen_urls: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
            seen_urls: HashSet::new(),
        }
    }

    pub fn parse_feed(&mut self, source_name: &str, content: &str) -> Result<Vec<ContentItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| PipelineError::Parse(format!("Failed to parse feed: {}", e)))?;

        let feed_title = feed
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| source_name.to_string());

        let mut items = Vec::new();

        for entry in feed.entries {
            if let Some(item) = self.parse_entry(&feed_title, entry) {
                items.push(item);
            }
        }

        info!("Parsed {} entries from feed '{}'", items.len(), feed_title);

        Ok(items)
    }

    fn parse_entry(&mut self, feed_title: &str, entry: feed_rs::model::Entry) -> Option<ContentItem> {
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());

        // Entries without a link cannot be referenced in the report
        let url = entry.links.first()?.href.clone();

        if !entry.id.is_empty() {
            if self.seen_ids.contains(&entry.id) {
                debug!("Skipping duplicate entry with id: {}", entry.id);
                return None;
            }
            self.seen_ids.insert(entry.id.clone());
        }

        if self.seen_urls.contains(&url) {
            debug!("Skipping duplicate entry with URL: {}", url);
            return None;
        }
        self.seen_urls.insert(url.clone());

        let summary = entry.summary.map(|s| s.content);

        // Prefer full content over the summary when present
        let body = entry
            .content
            .and_then(|c| c.body)
            .or(summary)
            .unwrap_or_default();

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&chrono::Utc));

        Some(ContentItem::new(
            SourceKind::Rss,
            feed_title,
            title,
            body,
            url,
            published_at,
        ))
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}
