//! Logging utilities
//!
//! Helpers that keep raw payloads readable and bounded in log output

use crate::models::upstream::{ResponsesInput, ResponsesRequest};
use serde_json::Value;

/// Maximum characters of a raw upstream payload written to the log
pub const MAX_LOGGED_PAYLOAD_CHARS: usize = 2000;

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let total = s.chars().count();
            format!("{}... ({} chars truncated)", &s[..byte_idx], total - max_chars)
        }
        None => s.to_string(),
    }
}

/// Render a decoded upstream body for diagnostics
pub fn payload_for_log(body: Option<&Value>) -> String {
    match body {
        Some(value) => truncate_content(&value.to_string(), MAX_LOGGED_PAYLOAD_CHARS),
        None => "<no body>".to_string(),
    }
}

/// Create a filtered summary of an upstream request for logging
pub fn create_request_log_summary(request: &ResponsesRequest) -> Value {
    let input = match &request.input {
        ResponsesInput::Text(text) => Value::String(truncate_content(text, 200)),
        ResponsesInput::Messages(messages) => {
            serde_json::json!(format!("[...{} messages]", messages.len()))
        }
    };

    serde_json::json!({
        "model": request.model,
        "input": input,
        "max_output_tokens": request.max_output_tokens,
        "temperature": request.temperature,
        "has_format": request.text.is_some(),
    })
}
