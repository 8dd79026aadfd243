//! Pulls a JSON object out of free text such as a chat completion.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::DomainModel;

static FENCED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").ok());

#[derive(Debug, Error)]
pub enum JsonExtractError {
    #[error("No JSON object found in text")]
    NotFound,
    #[error("JSON has no class list")]
    MissingClasses,
    #[error("Invalid JSON: {0}")]
    Invalid(#[source] serde_json::Error),
    #[error("JSON does not match the model schema: {0}")]
    Schema(#[source] serde_json::Error),
}

pub type JsonExtractResult<T> = Result<T, JsonExtractError>;

/// Plain JSON is taken as is. Otherwise a fenced code block is tried
/// first, then the first balanced `{...}` span that parses.
pub fn extract_json(text: &str) -> JsonExtractResult<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let mut last_error = None;

    if let Some(fenced) = FENCED.as_ref() {
        for captures in fenced.captures_iter(text) {
            let Some(body) = captures.get(1) else {
                continue;
            };
            match serde_json::from_str::<Value>(body.as_str().trim()) {
                Ok(value) => {
                    debug!("Extracted JSON from fenced block");
                    return Ok(value);
                }
                Err(e) => last_error = Some(e),
            }
        }
    }

    for span in balanced_objects(text) {
        match serde_json::from_str::<Value>(span) {
            Ok(value) => {
                warn!(length = span.len(), "Extracted JSON by brace matching");
                return Ok(value);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.map_or(JsonExtractError::NotFound, JsonExtractError::Invalid))
}

/// Extracts and decodes the canonical `{"classes": [...]}` document.
pub fn extract_model(text: &str) -> JsonExtractResult<DomainModel> {
    let value = extract_json(text)?;
    if !value.get("classes").is_some_and(Value::is_array) {
        return Err(JsonExtractError::MissingClasses);
    }
    serde_json::from_value(value).map_err(JsonExtractError::Schema)
}

/// Top-level `{...}` spans in order of appearance. Braces inside string
/// literals are ignored.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    spans
}
