//! End-user API data models
//!
//! Request and response bodies of the prompt endpoint

use crate::models::upstream::ResponsesInput;
use crate::services::usage::{LimitStatus, TokenUsage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prompt endpoint request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TalkRequest {
    /// Plain prompt (legacy field)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Prompt text or message list; preferred over `prompt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<ResponsesInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Response format descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

/// Prompt endpoint success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkResponse {
    /// Always "ok"
    pub status: String,
    /// Normalized answer text
    pub message: String,
    /// Model the prompt was sent to
    pub model: String,
    /// Approximate token usage
    pub tokens: TokenUsage,
    /// Position of `tokens.total` relative to the context limit
    pub limit_status: LimitStatus,
    /// Upstream stop reason when the answer was cut short
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<String>,
}

/// Simple status body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: String,
    pub message: String,
}

impl StatusMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}
