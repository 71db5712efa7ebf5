//! Output formatting helpers for CLI commands

use crate::reconciler::TickSummary;
use crate::store::PendingRecord;
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Format a tick summary as a table
pub fn format_summary_table(summary: &TickSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Outcome", "Records"]);

    table.add_row(vec![Cell::new("Fetched"), Cell::new(summary.fetched)]);
    table.add_row(vec![
        Cell::new("Updated"),
        Cell::new(highlight(summary.updated, |s| s.green().to_string())),
    ]);
    table.add_row(vec![
        Cell::new("Failed"),
        Cell::new(highlight(summary.failed, |s| s.yellow().to_string())),
    ]);
    table.add_row(vec![
        Cell::new("Abandoned"),
        Cell::new(highlight(summary.abandoned, |s| s.red().to_string())),
    ]);
    table.add_row(vec![
        Cell::new("Retry errors"),
        Cell::new(highlight(summary.retry_errors, |s| s.red().to_string())),
    ]);

    table.to_string()
}

/// Paint non-zero counts; zero stays plain.
fn highlight(count: usize, paint: fn(&str) -> String) -> String {
    if count > 0 {
        paint(&count.to_string())
    } else {
        count.to_string()
    }
}

/// Format a tick summary as JSON
pub fn format_summary_json(summary: &TickSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({ "summary": summary }))
}

/// Format pending records as a table
pub fn format_pending_table(records: &[PendingRecord], now: DateTime<Utc>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Generations", "Retries", "Age"]);

    for r in records {
        let retries = if r.retry_count > 0 {
            r.retry_count.to_string().yellow().to_string()
        } else {
            r.retry_count.to_string()
        };

        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(r.external_ids.join(", ")),
            Cell::new(retries),
            Cell::new(format_age(now - r.created_at)),
        ]);
    }

    table.to_string()
}

/// Format pending records as JSON
pub fn format_pending_json(records: &[PendingRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "count": records.len(),
        "pending": records
    }))
}

/// Compact age such as `45s`, `12m` or `3h`.
pub fn format_age(age: chrono::Duration) -> String {
    let seconds = age.num_seconds().max(0);
    match seconds {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s => format!("{}h", s / 3600),
    }
}
