use crate::fetcher::FetchConfig;
use crate::filter::{filter_items, FilterCriteria};
use crate::llm::{ChatCompletionsClient, LlmClientConfig};
use crate::report::{ReportEntry, ReportPaths, ReportWriter};
use crate::settings::Settings;
use crate::sources::{Collector, RedditCollector, RedditConfig, RssCollector};
use crate::summarize::{Summarizer, SummaryStatus};
use crate::types::{ContentItem, PipelineError, Result};
use crate::validation::Validator;
use chrono::Utc;
use futures::future;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Per-stage counts for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub collected: usize,
    pub filtered: usize,
    pub validated: usize,
    pub summarized: usize,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub stats: RunStats,
    pub report: Option<ReportPaths>,
}

/// One linear batch transform per run:
/// collect → filter → validate → summarize → report.
pub struct CollectionPipeline {
    collectors: Vec<Box<dyn Collector>>,
    criteria: FilterCriteria,
    validator: Validator,
    summarizer: Summarizer,
    report_writer: ReportWriter,
    llm_concurrency: usize,
}

impl CollectionPipeline {
    pub fn new(
        collectors: Vec<Box<dyn Collector>>,
        criteria: FilterCriteria,
        validator: Validator,
        summarizer: Summarizer,
        report_writer: ReportWriter,
        llm_concurrency: usize,
    ) -> Self {
        Self {
            collectors,
            criteria,
            validator,
            summarizer,
            report_writer,
            llm_concurrency: llm_concurrency.max(1),
        }
    }

    /// Wire the pipeline from settings. With `multi_llm` every configured
    /// validator model votes on each item; otherwise only the first one.
    pub fn from_settings(
        settings: &Settings,
        multi_llm: bool,
        output_override: Option<PathBuf>,
    ) -> Result<Self> {
        if !settings.has_sources() {
            return Err(PipelineError::Config(
                "No sources configured. Add rss_feeds or reddit.channels to the settings.".to_string(),
            ));
        }

        let fetch_config = FetchConfig {
            timeout_seconds: settings.fetch.timeout_seconds,
            max_retries: settings.fetch.max_retries,
            retry_delay_seconds: settings.fetch.retry_delay_seconds,
            ..FetchConfig::default()
        };

        let mut collectors: Vec<Box<dyn Collector>> = Vec::new();

        if !settings.rss_feeds.is_empty() {
            collectors.push(Box::new(RssCollector::new(
                settings.rss_feeds.clone(),
                fetch_config,
            )));
        }

        if !settings.reddit.channels.is_empty() {
            collectors.push(Box::new(RedditCollector::new(RedditConfig {
                channels: settings.reddit.channels.clone(),
                client_id: settings.reddit.client_id.clone(),
                client_secret: settings.reddit.client_secret.clone(),
                user_agent: settings.reddit.user_agent.clone(),
                post_limit: settings.reddit.post_limit,
                timeout_seconds: settings.fetch.timeout_seconds,
            })));
        }

        let llm = Arc::new(ChatCompletionsClient::new(LlmClientConfig {
            endpoint: settings.llm.endpoint.clone(),
            temperature: settings.llm.temperature,
            max_tokens: settings.llm.max_tokens,
            timeout_seconds: settings.llm.timeout_seconds,
        }));

        let validator_models = if multi_llm {
            settings.llm.validator_models.clone()
        } else {
            settings.llm.validator_models.iter().take(1).cloned().collect()
        };

        let validator = Validator::new(
            llm.clone(),
            validator_models,
            settings.keywords.clone(),
            settings.llm.confidence_threshold,
        );

        let summarizer = Summarizer::new(llm, settings.llm.summarizer_model.clone());

        let criteria = FilterCriteria {
            keywords: settings.keywords.clone(),
            max_age_days: settings.max_age_days,
        };

        let output_dir = output_override.unwrap_or_else(|| settings.output_dir.clone());

        Ok(Self::new(
            collectors,
            criteria,
            validator,
            summarizer,
            ReportWriter::new(output_dir),
            settings.llm.concurrency,
        ))
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        info!("Starting collection pipeline with {} collectors", self.collectors.len());

        let collected = self.collect().await;
        let mut stats = RunStats {
            collected: collected.len(),
            ..RunStats::default()
        };

        if collected.is_empty() {
            warn!("No content collected");
            return Ok(RunOutcome { stats, report: None });
        }

        let candidates = filter_items(collected, &self.criteria, Utc::now());
        stats.filtered = candidates.len();
        info!(
            "After filtering: {} candidates remain ({} filtered out)",
            stats.filtered,
            stats.collected - stats.filtered
        );

        // Relevance voting over a bounded worker pool; `buffered` keeps
        // the candidate order.
        let decisions: Vec<(ContentItem, bool)> = stream::iter(candidates)
            .map(|item| async move {
                let verdicts = self.validator.validate(&item).await;
                let keep = self.validator.decide(&verdicts);
                (item, keep)
            })
            .buffered(self.llm_concurrency)
            .collect()
            .await;

        let kept: Vec<ContentItem> = decisions
            .into_iter()
            .filter_map(|(item, keep)| keep.then_some(item))
            .collect();
        stats.validated = kept.len();
        info!("After validation: {} items kept", stats.validated);

        if kept.is_empty() {
            warn!("No relevant content found after validation");
            return Ok(RunOutcome { stats, report: None });
        }

        let entries: Vec<ReportEntry> = stream::iter(kept)
            .map(|item| async move {
                let summary = self.summarizer.summarize(&item).await;
                ReportEntry { item, summary }
            })
            .buffered(self.llm_concurrency)
            .collect()
            .await;

        stats.summarized = entries
            .iter()
            .filter(|e| e.summary.status == SummaryStatus::Success)
            .count();

        let report = self.report_writer.write(&entries, Utc::now())?;
        info!("Collection pipeline completed");

        Ok(RunOutcome {
            stats,
            report: Some(report),
        })
    }

    /// Run every collector concurrently; a failing source is logged and
    /// skipped, never aborting the run.
    async fn collect(&self) -> Vec<ContentItem> {
        let results = future::join_all(self.collectors.iter().map(|collector| async move {
            (collector.source_name(), collector.collect().await)
        }))
        .await;

        let mut all_items = Vec::new();

        for (source_name, result) in results {
            match result {
                Ok(items) => {
                    info!("Collected {} items from {}", items.len(), source_name);
                    all_items.extend(items);
                }
                Err(e) => {
                    error!("Error collecting from {}: {}", source_name, e);
                }
            }
        }

        all_items
    }
}
