//! Upstream Responses API data models
//!
//! Defines the request body sent to `/responses`. The response body is kept
//! as untyped JSON and interpreted by the normalizer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Responses API request structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsesRequest {
    /// Model name
    pub model: String,
    /// Prompt text or message list
    pub input: ResponsesInput,
    /// Output token cap
    pub max_output_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Text output options (structured output format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextOptions>,
}

/// Request input: a bare string or an ordered message list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsesInput {
    Text(String),
    Messages(Vec<InputMessage>),
}

/// A single input message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Role (system/user/assistant/developer)
    pub role: String,
    /// Content: a string or a list of content parts
    pub content: Value,
}

/// Text output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    /// Response format descriptor, forwarded untouched
    pub format: Value,
}

impl ResponsesInput {
    /// Whether there is anything to send
    pub fn is_empty(&self) -> bool {
        match self {
            ResponsesInput::Text(text) => text.trim().is_empty(),
            ResponsesInput::Messages(messages) => messages.is_empty(),
        }
    }

    /// Plain text view of the input, used for token estimation
    pub fn flatten_text(&self) -> String {
        match self {
            ResponsesInput::Text(text) => text.clone(),
            ResponsesInput::Messages(messages) => messages
                .iter()
                .map(InputMessage::text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl InputMessage {
    /// Text carried by this message
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(text) => text.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

/// Reason the upstream stopped early, if the body reports an incomplete response
pub fn incomplete_reason(body: &Value) -> Option<&str> {
    if body.get("status").and_then(Value::as_str) != Some("incomplete") {
        return None;
    }

    Some(
        body.get("incomplete_details")
            .and_then(|details| details.get("reason"))
            .and_then(Value::as_str)
            .unwrap_or("unknown"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_deserializes_both_shapes() {
        let text: ResponsesInput = serde_json::from_value(json!("hi")).unwrap();
        assert_eq!(text, ResponsesInput::Text("hi".to_string()));

        let messages: ResponsesInput = serde_json::from_value(json!([
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "hi"}
        ]))
        .unwrap();
        assert!(matches!(messages, ResponsesInput::Messages(ref m) if m.len() == 2));
        assert_eq!(messages.flatten_text(), "Be brief.\nhi");
    }

    #[test]
    fn test_flatten_content_parts() {
        let input: ResponsesInput = serde_json::from_value(json!([
            {"role": "user", "content": [{"type": "input_text", "text": "a"}, {"type": "input_image"}]}
        ]))
        .unwrap();
        assert_eq!(input.flatten_text(), "a");
    }

    #[test]
    fn test_format_omitted_when_absent() {
        let request = ResponsesRequest {
            model: "gpt-4o".to_string(),
            input: ResponsesInput::Text("hi".to_string()),
            max_output_tokens: 100,
            temperature: 0.7,
            text: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_incomplete_reason() {
        let body = json!({"status": "incomplete", "incomplete_details": {"reason": "max_output_tokens"}});
        assert_eq!(incomplete_reason(&body), Some("max_output_tokens"));
        assert_eq!(incomplete_reason(&json!({"status": "completed"})), None);
        assert_eq!(incomplete_reason(&json!({"status": "incomplete"})), Some("unknown"));
    }
}
