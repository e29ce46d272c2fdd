use crate::sources::Collector;
use crate::types::{ContentItem, PipelineError, Result, SourceKind};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub channels: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub post_limit: u32,
    pub timeout_seconds: u64,
}

/// Collector over a list of subreddits, using Reddit's application-only
/// OAuth flow (client-credentials grant) and the `/new` listing endpoint.
pub struct RedditCollector {
    config: RedditConfig,
    client: reqwest::Client,
    token_url: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(default)]
    selftext: String,
    permalink: String,
    #[serde(default)]
    created_utc: Option<f64>,
    subreddit: String,
}

impl RedditCollector {
    pub fn new(config: RedditConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the Reddit endpoints (used by tests against a mock server).
    pub fn with_endpoints(mut self, token_url: impl Into<String>, api_base: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into();
        self
    }

    pub fn channel_count(&self) -> usize {
        self.config.channels.len()
    }

    async fn obtain_token(&self) -> Result<String> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::General(format!(
                "Reddit auth failed with {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_channel(&self, token: &str, channel: &str) -> Result<Vec<ContentItem>> {
        let url = format!(
            "{}/r/{}/new?limit={}",
            self.api_base, channel, self.config.post_limit
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PipelineError::General(format!(
                "Reddit listing for r/{} failed with {}",
                channel, status
            )));
        }

        let listing: Listing = response.json().await?;

        let items = listing
            .data
            .children
            .into_iter()
            .map(|child| {
                let post = child.data;
                let published_at = post
                    .created_utc
                    .and_then(|secs| DateTime::from_timestamp(secs as i64, 0));

                ContentItem::new(
                    SourceKind::Reddit,
                    format!("reddit/{}", post.subreddit),
                    post.title,
                    post.selftext,
                    format!("https://reddit.com{}", post.permalink),
                    published_at,
                )
            })
            .collect();

        Ok(items)
    }
}

#[async_trait]
impl Collector for RedditCollector {
    fn source_id(&self) -> String {
        "reddit".to_string()
    }

    fn source_name(&self) -> String {
        "Reddit channels".to_string()
    }

    async fn collect(&self) -> Result<Vec<ContentItem>> {
        // Auth failure takes the whole source down; the pipeline logs and
        // continues with the remaining collectors.
        let token = self.obtain_token().await?;
        debug!("Obtained Reddit access token");

        let mut items = Vec::new();

        for channel in &self.config.channels {
            match self.fetch_channel(&token, channel).await {
                Ok(channel_items) => {
                    info!("Collected {} posts from r/{}", channel_items.len(), channel);
                    items.extend(channel_items);
                }
                Err(e) => {
                    error!("Error collecting from r/{}: {}", channel, e);
                }
            }
        }

        Ok(items)
    }
}
