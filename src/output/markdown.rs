//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a session,
//! including per-source results, metrics, and errors.

use crate::output::OutputResult;
use crate::session::ScrapingSession;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a session
///
/// # Arguments
///
/// * `session` - The finished session
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_markdown_summary(session: &ScrapingSession, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(session);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a session as markdown
pub fn format_markdown_summary(session: &ScrapingSession) -> String {
    let mut md = String::new();

    md.push_str("# Listing Harvest Summary\n\n");

    // Session metadata
    md.push_str("## Session\n\n");
    md.push_str(&format!("- **Session ID**: {}\n", session.id()));
    md.push_str(&format!("- **Started**: {}\n", session.start_time().to_rfc3339()));
    if let Some(end) = session.end_time() {
        md.push_str(&format!("- **Finished**: {}\n", end.to_rfc3339()));
        let seconds = (end - session.start_time()).num_seconds();
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            seconds,
            seconds as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", session.status().to_db_string()));
    if let Some(outcome) = session.outcome() {
        md.push_str(&format!("- **Outcome**: {}\n", outcome.to_db_string()));
    }
    md.push_str(&format!("- **Total Listings**: {}\n\n", session.total_listings()));

    // Per-source results
    md.push_str("## Sources\n\n");
    md.push_str("| Source | Success | Containers | Listings | Errors |\n");
    md.push_str("|--------|---------|------------|----------|--------|\n");
    for name in session.sources() {
        if let Some(result) = session.results().get(name) {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                name,
                if result.success() { "yes" } else { "no" },
                result.total_found(),
                result.total_scraped(),
                result.errors().len()
            ));
        }
    }
    md.push('\n');

    if !session.metrics().is_empty() {
        md.push_str("## Metrics\n\n");
        md.push_str("| Source | Requests | Failed | Discarded | Filtered | Clamped | Duration (ms) |\n");
        md.push_str("|--------|----------|--------|-----------|----------|---------|---------------|\n");
        for (name, metrics) in session.metrics() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                name,
                metrics.total_requests,
                metrics.failed_requests,
                metrics.listings_discarded,
                metrics.listings_filtered,
                metrics.amounts_clamped,
                metrics
                    .duration_ms
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string())
            ));
        }
        md.push('\n');
    }

    if let Some(report) = session.persisted() {
        md.push_str("## Persistence\n\n");
        md.push_str(&format!("- **Received**: {}\n", report.received));
        md.push_str(&format!("- **Duplicates Dropped**: {}\n", report.duplicates_dropped));
        md.push_str(&format!("- **Rows Written**: {}\n", report.written));
        md.push_str(&format!("- **Failed Batches**: {}\n\n", report.failed_batches));
    }

    // Errors, session level first
    let page_errors: Vec<(&String, &String)> = session
        .results()
        .iter()
        .filter(|(_, result)| result.success())
        .flat_map(|(name, result)| result.errors().iter().map(move |e| (name, e)))
        .collect();

    if !session.errors().is_empty() || !page_errors.is_empty() {
        md.push_str("## Errors\n\n");
        for error in session.errors() {
            md.push_str(&format!("- {}\n", error));
        }
        for (name, error) in page_errors {
            md.push_str(&format!("- {} (partial): {}\n", name, error));
        }
        md.push('\n');
    }

    md
}
