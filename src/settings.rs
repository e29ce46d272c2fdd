use crate::types::{PipelineError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_CONFIG_PATH: &str = "NEWSREEL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "newsreel.toml";

/// Process-wide configuration, constructed once at startup and passed by
/// reference into every component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rss_feeds: Vec<String>,
    pub keywords: Vec<String>,
    pub max_age_days: u32,
    pub output_dir: PathBuf,
    pub reddit: RedditSettings,
    pub llm: LlmSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditSettings {
    pub channels: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub post_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: String,
    pub validator_models: Vec<String>,
    pub summarizer_model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub confidence_threshold: f64,
    pub timeout_seconds: u64,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rss_feeds: Vec::new(),
            keywords: Vec::new(),
            max_age_days: 10,
            output_dir: PathBuf::from("./data/output"),
            reddit: RedditSettings::default(),
            llm: LlmSettings::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "newsreel".to_string(),
            post_limit: 30,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
            validator_models: vec!["mistral:instruct".to_string()],
            summarizer_model: "mistral:instruct".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            confidence_threshold: 0.9,
            timeout_seconds: 60,
            concurrency: 4,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 2,
        }
    }
}

impl Settings {
    /// Load settings: built-in defaults, overridden by an optional TOML
    /// file ($NEWSREEL_CONFIG or ./newsreel.toml), overridden by
    /// environment variables for the Reddit credentials.
    pub fn load() -> Result<Self> {
        // Pick up a .env file if present
        dotenvy::dotenv().ok();

        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut settings = if path.exists() {
            Self::from_file(&path)?
        } else {
            debug!("No config file at {}; using defaults", path.display());
            Self::default()
        };

        if let Ok(client_id) = std::env::var("REDDIT_CLIENT_ID") {
            settings.reddit.client_id = client_id;
        }
        if let Ok(client_secret) = std::env::var("REDDIT_CLIENT_SECRET") {
            settings.reddit.client_secret = client_secret;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Invalid settings file: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_age_days == 0 {
            return Err(PipelineError::Config(
                "max_age_days must be greater than zero".to_string(),
            ));
        }
        if self.llm.validator_models.is_empty() {
            return Err(PipelineError::Config(
                "at least one validator model must be configured".to_string(),
            ));
        }
        if self.llm.concurrency == 0 {
            return Err(PipelineError::Config(
                "llm.concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_sources(&self) -> bool {
        !self.rss_feeds.is_empty() || !self.reddit.channels.is_empty()
    }
}
