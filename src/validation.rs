use crate::llm::{extract_json, LlmClient};
use crate::types::ContentItem;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const EXCERPT_LEN: usize = 1000;

/// One model's relevance verdict for one item.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub model: String,
    pub is_relevant: bool,
    pub confidence: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerdictJson {
    is_relevant: bool,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reason: Option<String>,
}

/// Runs the relevance-classification prompt against every configured
/// validator model and folds the verdicts into a keep/drop decision.
pub struct Validator {
    llm: Arc<dyn LlmClient>,
    models: Vec<String>,
    topics: Vec<String>,
    confidence_threshold: f64,
}

impl Validator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        models: Vec<String>,
        topics: Vec<String>,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            llm,
            models,
            topics,
            confidence_threshold,
        }
    }

    pub fn model_names(&self) -> &[String] {
        &self.models
    }

    /// Collect one verdict per configured model. A model call that errors
    /// or returns unparsable output becomes a fail-closed "not relevant"
    /// verdict for that model.
    pub async fn validate(&self, item: &ContentItem) -> Vec<Verdict> {
        let prompt = self.relevance_prompt(item);
        let mut verdicts = Vec::with_capacity(self.models.len());

        for model in &self.models {
            let verdict = match self.llm.generate(model, &prompt).await {
                Ok(response) => match parse_verdict(model, &response) {
                    Some(verdict) => verdict,
                    None => {
                        warn!(
                            "Unparsable verdict from {} for {}; treating as not relevant",
                            model, item.url
                        );
                        fail_closed(model, "unparsable model output")
                    }
                },
                Err(e) => {
                    warn!(
                        "Validation call to {} failed for {}: {}; treating as not relevant",
                        model, item.url, e
                    );
                    fail_closed(model, "model call failed")
                }
            };

            debug!(
                "Verdict from {} for '{}': relevant={} confidence={:.2}",
                model, item.title, verdict.is_relevant, verdict.confidence
            );
            verdicts.push(verdict);
        }

        verdicts
    }

    /// Fold verdicts into the final keep/drop decision.
    pub fn decide(&self, verdicts: &[Verdict]) -> bool {
        aggregate_verdicts(verdicts, self.confidence_threshold)
    }

    fn relevance_prompt(&self, item: &ContentItem) -> String {
        let excerpt: String = item.body.chars().take(EXCERPT_LEN).collect();
        let topics = if self.topics.is_empty() {
            "the configured subject area".to_string()
        } else {
            self.topics.join(", ")
        };

        format!(
            r#"You are a content relevance analyzer. Decide whether the content below substantively discusses any of these topics: {topics}.

Mark content as relevant only when it substantively covers one of the topics, not when it merely mentions one in passing.

Return a JSON object with:
{{
    "is_relevant": boolean,
    "confidence": float between 0 and 1,
    "reason": "brief explanation of the decision"
}}

Title: {title}

Content:
{excerpt}"#,
            topics = topics,
            title = item.title,
            excerpt = excerpt,
        )
    }
}

/// Strict-majority vote over the verdicts; ties reject. A verdict whose
/// confidence falls below the threshold counts as "not relevant".
/// Deterministic: the same verdict set always yields the same decision.
pub fn aggregate_verdicts(verdicts: &[Verdict], confidence_threshold: f64) -> bool {
    if verdicts.is_empty() {
        return false;
    }

    let relevant_votes = verdicts
        .iter()
        .filter(|v| v.is_relevant && v.confidence >= confidence_threshold)
        .count();

    relevant_votes * 2 > verdicts.len()
}

fn parse_verdict(model: &str, response: &str) -> Option<Verdict> {
    let json = extract_json(response)?;
    let parsed: VerdictJson = serde_json::from_str(&json).ok()?;

    Some(Verdict {
        model: model.to_string(),
        is_relevant: parsed.is_relevant,
        confidence: parsed.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
        reason: parsed.reason,
    })
}

fn fail_closed(model: &str, reason: &str) -> Verdict {
    Verdict {
        model: model.to_string(),
        is_relevant: false,
        confidence: 0.0,
        reason: Some(reason.to_string()),
    }
}
