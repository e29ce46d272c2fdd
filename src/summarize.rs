use crate::llm::{extract_json, LlmClient};
use crate::types::ContentItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const CONTENT_LEN: usize = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Success,
    Error,
}

/// Structured summary for one kept item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub title: String,
    pub summary: String,
    pub insight: Option<String>,
    pub model: String,
    pub status: SummaryStatus,
}

#[derive(Debug, Deserialize)]
struct SummaryJson {
    #[serde(default)]
    title: Option<String>,
    summary: String,
    #[serde(default)]
    insight: Option<String>,
}

/// Produces a short structured summary per kept item. Never fails the run:
/// a failed or unparsable model call yields a placeholder summary so the
/// item still reaches the report.
pub struct Summarizer {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: String) -> Self {
        Self { llm, model }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub async fn summarize(&self, item: &ContentItem) -> ItemSummary {
        let prompt = self.summary_prompt(item);

        match self.llm.generate(&self.model, &prompt).await {
            Ok(response) => match parse_summary(&response) {
                Some(parsed) => {
                    debug!("Generated summary for {}", item.url);
                    ItemSummary {
                        title: parsed.title.unwrap_or_else(|| item.title.clone()),
                        summary: parsed.summary,
                        insight: parsed.insight,
                        model: self.model.clone(),
                        status: SummaryStatus::Success,
                    }
                }
                None => {
                    warn!("Unparsable summary output for {}", item.url);
                    self.placeholder(item, "model returned unparsable output")
                }
            },
            Err(e) => {
                warn!("Summarization failed for {}: {}", item.url, e);
                self.placeholder(item, "model call failed")
            }
        }
    }

    fn placeholder(&self, item: &ContentItem, reason: &str) -> ItemSummary {
        ItemSummary {
            title: item.title.clone(),
            summary: format!("Summary unavailable ({})", reason),
            insight: None,
            model: self.model.clone(),
            status: SummaryStatus::Error,
        }
    }

    fn summary_prompt(&self, item: &ContentItem) -> String {
        let content: String = item.body.chars().take(CONTENT_LEN).collect();

        format!(
            r#"Analyze this content and provide a structured summary.

Title: {title}
Content: {content}

Return a JSON object with:
{{
    "title": "use the existing title or generate one if missing",
    "summary": "2-3 sentences focusing on the key points",
    "insight": "one key insight that is possibly contrarian or thought-provoking"
}}"#,
            title = item.title,
            content = content,
        )
    }
}

fn parse_summary(response: &str) -> Option<SummaryJson> {
    let json = extract_json(response)?;
    serde_json::from_str(&json).ok()
}
