pub mod cli;
pub mod fetcher;
pub mod filter;
pub mod llm;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod sources;
pub mod summarize;
pub mod types;
pub mod validation;

pub use fetcher::{FetchConfig, Fetcher};
pub use filter::{filter_items, FilterCriteria};
pub use llm::{ChatCompletionsClient, LlmClient, LlmClientConfig, MockLlmClient};
pub use parser::FeedParser;
pub use pipeline::{CollectionPipeline, RunOutcome, RunStats};
pub use report::{ReportEntry, ReportPaths, ReportWriter};
pub use settings::Settings;
pub use sources::{Collector, RedditCollector, RedditConfig, RssCollector};
pub use summarize::{ItemSummary, Summarizer, SummaryStatus};
pub use types::*;
pub use validation::{aggregate_verdicts, Validator, Verdict};
