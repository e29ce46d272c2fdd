use async_trait::async_trait;
use chrono::{Duration, Utc};
use newsreel::filter::FilterCriteria;
use newsreel::llm::MockLlmClient;
use newsreel::pipeline::CollectionPipeline;
use newsreel::report::ReportWriter;
use newsreel::sources::Collector;
use newsreel::summarize::Summarizer;
use newsreel::types::{ContentItem, PipelineError, Result, SourceKind};
use newsreel::validation::Validator;
use std::fs;
use std::sync::Arc;

struct StaticCollector {
    name: String,
    items: Vec<ContentItem>,
}

#[async_trait]
impl Collector for StaticCollector {
    fn source_id(&self) -> String {
        self.name.clone()
    }

    fn source_name(&self) -> String {
        self.name.clone()
    }

    async fn collect(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.clone())
    }
}

struct FailingCollector;

#[async_trait]
impl Collector for FailingCollector {
    fn source_id(&self) -> String {
        "reddit".to_string()
    }

    fn source_name(&self) -> String {
        "Reddit channels".to_string()
    }

    async fn collect(&self) -> Result<Vec<ContentItem>> {
        Err(PipelineError::General(
            "Reddit auth failed with 401 Unauthorized".to_string(),
        ))
    }
}

fn rss_item(title: &str, age_days: i64) -> ContentItem {
    ContentItem::new(
        SourceKind::Rss,
        "Example Feed",
        title,
        "body discussing the incident",
        format!("https://example.com/{}", title.replace(' ', "-")),
        Some(Utc::now() - Duration::days(age_days)),
    )
}

const RELEVANT: &str = r#"{"is_relevant": true, "confidence": 0.95, "reason": "on topic"}"#;
const NOT_RELEVANT: &str = r#"{"is_relevant": false, "confidence": 0.95, "reason": "off topic"}"#;
const SUMMARY: &str =
    r#"{"title": "Breach recap", "summary": "Attackers broke in.", "insight": "Patch faster."}"#;

fn pipeline_with(
    collectors: Vec<Box<dyn Collector>>,
    llm: Arc<MockLlmClient>,
    validator_models: Vec<&str>,
    output_dir: std::path::PathBuf,
) -> CollectionPipeline {
    let validator = Validator::new(
        llm.clone(),
        validator_models.iter().map(|m| m.to_string()).collect(),
        vec!["security".to_string()],
        0.9,
    );
    let summarizer = Summarizer::new(llm, "summarizer".to_string());
    let criteria = FilterCriteria {
        keywords: vec!["security".to_string()],
        max_age_days: 10,
    };

    CollectionPipeline::new(
        collectors,
        criteria,
        validator,
        summarizer,
        ReportWriter::new(output_dir),
        2,
    )
}

#[tokio::test]
async fn failed_source_does_not_abort_the_run() {
    // Scenario: Reddit auth fails, the RSS items still flow through
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(
        MockLlmClient::new()
            .with_response("validator-a", RELEVANT)
            .with_response("summarizer", SUMMARY),
    );

    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(StaticCollector {
            name: "RSS feeds".to_string(),
            items: vec![
                rss_item("New security breach disclosed", 2),
                rss_item("Security patch notes", 20),
            ],
        }),
        Box::new(FailingCollector),
    ];

    let pipeline = pipeline_with(collectors, llm, vec!["validator-a"], dir.path().to_path_buf());
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.stats.collected, 2);
    assert_eq!(outcome.stats.filtered, 1);
    assert_eq!(outcome.stats.validated, 1);
    assert_eq!(outcome.stats.summarized, 1);

    let paths = outcome.report.expect("report should be written");
    let markdown = fs::read_to_string(&paths.markdown).unwrap();
    assert!(markdown.contains("Breach recap"));
    assert!(!markdown.contains("Security patch notes"));
}

#[tokio::test]
async fn rejected_item_never_reaches_the_summarizer() {
    // Scenario: single validator says not relevant
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(
        MockLlmClient::new()
            .with_response("validator-a", NOT_RELEVANT)
            .with_response("summarizer", SUMMARY),
    );

    let collectors: Vec<Box<dyn Collector>> = vec![Box::new(StaticCollector {
        name: "RSS feeds".to_string(),
        items: vec![rss_item("New security breach disclosed", 2)],
    })];

    let pipeline = pipeline_with(
        collectors,
        llm.clone(),
        vec!["validator-a"],
        dir.path().to_path_buf(),
    );
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.stats.validated, 0);
    assert!(outcome.report.is_none());
    assert_eq!(llm.call_count("summarizer"), 0);
}

#[tokio::test]
async fn split_multi_model_vote_rejects_the_item() {
    // Scenario: two validators disagree, tie rejects
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(
        MockLlmClient::new()
            .with_response("validator-a", RELEVANT)
            .with_response("validator-b", NOT_RELEVANT)
            .with_response("summarizer", SUMMARY),
    );

    let collectors: Vec<Box<dyn Collector>> = vec![Box::new(StaticCollector {
        name: "RSS feeds".to_string(),
        items: vec![rss_item("New security breach disclosed", 2)],
    })];

    let pipeline = pipeline_with(
        collectors,
        llm.clone(),
        vec!["validator-a", "validator-b"],
        dir.path().to_path_buf(),
    );
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.stats.validated, 0);
    assert!(outcome.report.is_none());
    assert_eq!(llm.call_count("summarizer"), 0);
}

#[tokio::test]
async fn summarization_failure_keeps_the_item_with_a_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(
        MockLlmClient::new()
            .with_response("validator-a", RELEVANT)
            .with_failure("summarizer"),
    );

    let collectors: Vec<Box<dyn Collector>> = vec![Box::new(StaticCollector {
        name: "RSS feeds".to_string(),
        items: vec![rss_item("New security breach disclosed", 2)],
    })];

    let pipeline = pipeline_with(collectors, llm, vec!["validator-a"], dir.path().to_path_buf());
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.stats.validated, 1);
    assert_eq!(outcome.stats.summarized, 0);

    let paths = outcome.report.expect("item stays in the report");
    let markdown = fs::read_to_string(&paths.markdown).unwrap();
    assert!(markdown.contains("New security breach disclosed"));
    assert!(markdown.contains("Summary unavailable"));
}

#[tokio::test]
async fn report_preserves_collection_order_under_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(
        MockLlmClient::new()
            .with_response("validator-a", RELEVANT)
            .with_response(
                "summarizer",
                r#"{"summary": "A short recap of the story."}"#,
            ),
    );

    let items: Vec<ContentItem> = (0..6)
        .map(|i| rss_item(&format!("security story {}", i), 1))
        .collect();

    let collectors: Vec<Box<dyn Collector>> = vec![Box::new(StaticCollector {
        name: "RSS feeds".to_string(),
        items,
    })];

    let pipeline = pipeline_with(collectors, llm, vec!["validator-a"], dir.path().to_path_buf());
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.stats.validated, 6);

    let paths = outcome.report.unwrap();
    let markdown = fs::read_to_string(&paths.markdown).unwrap();

    let mut last_pos = 0;
    for i in 0..6 {
        let pos = markdown
            .find(&format!("security story {}", i))
            .expect("every story appears");
        assert!(pos > last_pos, "stories must appear in collection order");
        last_pos = pos;
    }
}

#[tokio::test]
async fn empty_collection_produces_no_report() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockLlmClient::new());

    let collectors: Vec<Box<dyn Collector>> = vec![Box::new(StaticCollector {
        name: "RSS feeds".to_string(),
        items: Vec::new(),
    })];

    let pipeline = pipeline_with(collectors, llm, vec!["validator-a"], dir.path().to_path_buf());
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.stats.collected, 0);
    assert!(outcome.report.is_none());
}
