pub mod labels;

pub use labels::{Level, LabelSpec, STANDARD_LABELS};

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use tracing::debug;

use crate::records::{BugEntry, BugRecord, MalformedRecordError};

/// Everything needed to open one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Turn a ticket into an issue draft.
///
/// Fails only when the ticket lacks a field the body needs or holds one
/// with the wrong type. The timestamp
/// is only used for the provenance line at the bottom of the body.
pub fn format_issue<Tz>(
    entry: &BugEntry,
    imported_at: &DateTime<Tz>,
) -> Result<IssueDraft, MalformedRecordError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let record = entry.validate()?;
    Ok(IssueDraft {
        title: issue_title(&record),
        body: render_body(&record, imported_at),
        labels: issue_labels(&record),
    })
}

pub fn issue_title(record: &BugRecord) -> String {
    format!("[{}] {}", record.id, record.title)
}

/// Severity label, then priority label, then the ticket's own labels in
/// order. Duplicates are kept.
pub fn issue_labels(record: &BugRecord) -> Vec<String> {
    let severity = Level::parse_or_medium(Some(&record.severity));
    let priority = Level::parse_or_medium(Some(&record.priority));
    debug!(id = %record.id, %severity, %priority, "mapped ticket levels");

    let mut labels = Vec::with_capacity(record.labels.len() + 2);
    labels.push(severity.severity_label().to_string());
    labels.push(priority.priority_label().to_string());
    labels.extend(record.labels.iter().cloned());
    labels
}

/// Render the markdown issue body.
pub fn render_body<Tz>(record: &BugRecord, imported_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let line = record
        .line_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let mut parts = vec![
        "## Bug Description".to_string(),
        record.description.clone(),
        String::new(),
        "## Details".to_string(),
        format!("- **Bug ID:** `{}`", record.id),
        format!("- **Severity:** {}", title_case(&record.severity)),
        format!("- **Priority:** {}", title_case(&record.priority)),
        format!("- **Type:** {}", title_case(&record.kind)),
        format!("- **File:** `{}`", record.file),
        format!("- **Line:** {}", line),
        String::new(),
        "## Steps to Reproduce".to_string(),
    ];

    for (i, step) in record.steps_to_reproduce.iter().enumerate() {
        parts.push(format!("{}. {}", i + 1, step));
    }

    parts.extend([
        String::new(),
        "## Expected Behavior".to_string(),
        record.expected_behavior.clone(),
        String::new(),
        "## Actual Behavior".to_string(),
        record.actual_behavior.clone(),
        String::new(),
        "---".to_string(),
        format!(
            "*Auto-imported from bug ticket system on {}*",
            imported_at.format("%Y-%m-%d %H:%M:%S")
        ),
    ]);

    parts.join("\n")
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest:
/// "memory leak" -> "Memory Leak", "CROSS-SITE" -> "Cross-Site".
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for c in value.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
