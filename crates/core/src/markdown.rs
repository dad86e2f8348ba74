//! Markdown rendering of stored reports.
//!
//! Produces a readable document from a [`Report`]:
//!
//! ```markdown
//! # <title>
//!
//! **Report ID:** <id>
//! **Timestamp:** <iso8601>
//!
//! ## Transcript
//!
//! > <transcript lines>
//!
//! ## SOAP note
//! ...
//!
//! ## Differential diagnosis
//! ...
//! ```
//!
//! The two clinical documents are rendered generically: object keys become headings whose level
//! follows nesting depth, arrays become bullet lists and scalars are printed as text. Nothing here
//! knows the SOAP or diagnosis layout, so extra keys a model adds are rendered too.

use crate::report::Report;
use crate::{ReportError, ReportResult, Stage};
use chrono::SecondsFormat;
use serde_json::Value;
use std::fmt::Write;

/// Placeholder for empty strings, empty lists and nulls.
const NONE_RECORDED: &str = "_none recorded_";

/// Heading level of the top-level keys inside each document section.
const DOCUMENT_BASE_LEVEL: usize = 3;

const MAX_HEADING_LEVEL: usize = 6;

/// Render `report` as a Markdown document.
///
/// # Errors
///
/// Returns [`ReportError::MalformedGeneration`] if a stored document is no longer valid JSON.
pub fn render_report(report: &Report) -> ReportResult<String> {
    let soap = report
        .soap_document()
        .map_err(|e| ReportError::MalformedGeneration {
            stage: Stage::SoapNote,
            reason: format!("stored SOAP note is not valid JSON: {e}"),
        })?;
    let diagnosis =
        report
            .diagnosis_document()
            .map_err(|e| ReportError::MalformedGeneration {
                stage: Stage::Diagnosis,
                reason: format!("stored diagnosis is not valid JSON: {e}"),
            })?;

    let mut out = String::new();
    let _ = writeln!(out, "# {}", report.title.trim());
    out.push('\n');
    let _ = writeln!(out, "**Report ID:** {}  ", report.id);
    let _ = writeln!(
        out,
        "**Timestamp:** {}",
        report.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    out.push('\n');

    out.push_str("## Transcript\n\n");
    for line in report.transcript.lines() {
        if line.trim().is_empty() {
            out.push_str(">\n");
        } else {
            let _ = writeln!(out, "> {}", line.trim_end());
        }
    }
    out.push('\n');

    out.push_str("## SOAP note\n\n");
    render_value(&mut out, &soap, DOCUMENT_BASE_LEVEL);

    out.push_str("## Differential diagnosis\n\n");
    render_value(&mut out, &diagnosis, DOCUMENT_BASE_LEVEL);

    Ok(out.trim_end().to_string() + "\n")
}

fn render_value(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let hashes = "#".repeat(level.min(MAX_HEADING_LEVEL));
                let _ = writeln!(out, "{hashes} {}", humanise_key(key));
                out.push('\n');
                render_value(out, child, level + 1);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                render_bullet(out, item);
            }
            out.push('\n');
        }
        other => {
            let _ = writeln!(out, "{}", inline_value(other));
            out.push('\n');
        }
    }
}

/// One list item. Objects render their first field on the bullet line and the rest as indented
/// `key: value` continuation lines.
fn render_bullet(out: &mut String, item: &Value) {
    match item {
        Value::Object(map) if !map.is_empty() => {
            let mut prefix = "- ";
            for (key, child) in map {
                let _ = writeln!(out, "{prefix}{}: {}", humanise_key(key), inline_value(child));
                prefix = "  ";
            }
        }
        other => {
            let _ = writeln!(out, "- {}", inline_value(other));
        }
    }
}

fn inline_value(value: &Value) -> String {
    match value {
        Value::Null => NONE_RECORDED.to_string(),
        Value::String(s) if s.trim().is_empty() => NONE_RECORDED.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) if items.is_empty() => NONE_RECORDED.to_string(),
        Value::Array(items) => items
            .iter()
            .map(inline_value)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(map) if map.is_empty() => NONE_RECORDED.to_string(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", humanise_key(k), inline_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// `History_of_Present_Illness` -> `History of Present Illness`, `soapNote` -> `soap Note`.
pub fn humanise_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
        } else {
            if c.is_uppercase()
                && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
            {
                out.push(' ');
            }
            out.push(c);
        }
        prev = Some(c);
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
