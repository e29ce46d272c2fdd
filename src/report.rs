use crate::summarize::ItemSummary;
use crate::types::{ContentItem, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// One surviving item paired with its summary, in report order.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub item: ContentItem,
    pub summary: ItemSummary,
}

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// Renders the run's results into a Markdown report and a JSON artifact
/// under the output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn write(&self, entries: &[ReportEntry], generated_at: DateTime<Utc>) -> Result<ReportPaths> {
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = generated_at.format("%Y%m%d_%H%M%S");

        let json_path = self.output_dir.join(format!("collected_content_{}.json", timestamp));
        fs::write(&json_path, serde_json::to_string_pretty(entries)?)?;

        let markdown_path = self.output_dir.join(format!("report_{}.md", timestamp));
        fs::write(&markdown_path, render_markdown(entries, generated_at))?;

        info!(
            "Saved {} entries to {}",
            entries.len(),
            self.output_dir.display()
        );

        Ok(ReportPaths {
            markdown: markdown_path,
            json: json_path,
        })
    }
}

fn render_markdown(entries: &[ReportEntry], generated_at: DateTime<Utc>) -> String {
    let sources: BTreeSet<&str> = entries
        .iter()
        .map(|e| e.item.source_name.as_str())
        .collect();
    let sources: Vec<&str> = sources.into_iter().collect();

    let dates: Vec<DateTime<Utc>> = entries
        .iter()
        .filter_map(|e| e.item.published_at)
        .collect();

    let period = match (dates.iter().min(), dates.iter().max()) {
        (Some(first), Some(last)) => format!(
            "- Collection period: {} to {}\n",
            format_date(Some(*first)),
            format_date(Some(*last))
        ),
        _ => String::new(),
    };

    let mut report = format!(
        "# Content Collection Report\n\n\
         Generated: {}\n\n\
         ## Summary\n\
         - Total items: {}\n\
         - Sources: {}\n\
         {}\n\
         ## Contents\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        entries.len(),
        sources.join(", "),
        period,
    );

    for entry in entries {
        report.push_str(&format!(
            "### {}\n\n\
             **Source**: {}  \n\
             **URL**: {}  \n\
             **Date**: {}\n\n\
             **Summary**\n{}\n\n",
            entry.summary.title,
            entry.item.source_name,
            entry.item.url,
            format_date(entry.item.published_at),
            entry.summary.summary,
        ));

        if let Some(insight) = &entry.summary.insight {
            report.push_str(&format!("**Key Insight**\n{}\n\n", insight));
        }

        report.push_str("---\n\n");
    }

    report
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "N/A".to_string(),
    }
}
