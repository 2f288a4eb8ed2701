//! Parse boundary: raw model reply → [`Report`].
//!
//! The model is asked for a bare JSON object, and usually complies. Two
//! harmless quirks are repaired before decoding, because they say nothing
//! about the content:
//!
//! 1. Invisible Unicode (BOM, zero-width spaces) is removed.
//! 2. A single outer Markdown fence (```` ```json … ``` ````) is stripped.
//!
//! Anything else that is not a JSON object matching the schema is a
//! [`SofError::MalformedModelResponse`] carrying the *original* reply, so the
//! user sees exactly what the model said. There is no retry and no
//! re-prompt.

use crate::error::SofError;
use crate::report::Report;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Decode a model reply into a Report.
pub fn parse_report(raw: &str) -> Result<Report, SofError> {
    let cleaned = clean_response(raw);

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| malformed(raw, e.to_string()))?;

    if !value.is_object() {
        return Err(malformed(
            raw,
            format!("expected a JSON object, got {}", json_kind(&value)),
        ));
    }

    let report: Report = serde_json::from_value(value).map_err(|e| malformed(raw, e.to_string()))?;
    debug!(
        "Parsed report: {} transactions, {} red flags",
        report.transactions.len(),
        report.red_flags.len()
    );
    Ok(report)
}

/// Apply the quirk repairs, in order.
pub fn clean_response(raw: &str) -> String {
    let s = remove_invisible_chars(raw);
    strip_outer_fence(&s)
}

fn malformed(raw: &str, detail: String) -> SofError {
    SofError::MalformedModelResponse {
        raw_text: raw.to_string(),
        detail,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Rule 1: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 2: Strip one outer code fence ───────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    let trimmed = input.trim();
    match RE_OUTER_FENCE.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}
