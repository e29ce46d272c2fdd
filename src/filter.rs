use crate::types::ContentItem;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Keyword and age criteria applied to the collected batch.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub keywords: Vec<String>,
    pub max_age_days: u32,
}

/// Reduce a collected batch to the candidate list.
///
/// An item passes when its publish date is within `max_age_days` of `now`
/// and at least one keyword occurs (case-insensitively) in its title or
/// body. Items without a publish date are treated as stale and dropped.
/// An empty keyword list matches everything. Pure and deterministic for a
/// fixed `now`, so filtering twice changes nothing.
pub fn filter_items(
    items: Vec<ContentItem>,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<ContentItem> {
    items
        .into_iter()
        .filter(|item| {
            if !is_fresh(item, criteria.max_age_days, now) {
                debug!("Filtered out by date: {}", item.title);
                return false;
            }
            if !matches_keywords(item, &criteria.keywords) {
                debug!("Filtered out by keywords: {}", item.title);
                return false;
            }
            true
        })
        .collect()
}

fn is_fresh(item: &ContentItem, max_age_days: u32, now: DateTime<Utc>) -> bool {
    match item.published_at {
        Some(published_at) => now.signed_duration_since(published_at) <= Duration::days(max_age_days as i64),
        // Undated items cannot be proven fresh
        None => false,
    }
}

fn matches_keywords(item: &ContentItem, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }

    let title = item.title.to_lowercase();
    let body = item.body.to_lowercase();

    keywords.iter().any(|keyword| {
        let keyword = keyword.to_lowercase();
        title.contains(&keyword) || body.contains(&keyword)
    })
}
